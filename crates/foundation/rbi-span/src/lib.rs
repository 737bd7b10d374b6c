//! Source locations attached to declaration nodes
//!
//! Locations are supplied by the builder and consumed by the printer and by
//! diagnostics. Lines are 1-based, columns are 0-based.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A line/column position in a source file
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[display("{line}:{column}")]
pub struct Pos {
    /// 1-based line
    pub line: u32,
    /// 0-based column
    pub column: u32,
}

impl Pos {
    /// Create a position
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A start/end location, optionally tied to a file
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Loc {
    /// File the location points into, when known
    pub file: Option<String>,
    /// Start position
    pub begin: Pos,
    /// End position (inclusive line, exclusive column)
    pub end: Pos,
}

impl Loc {
    /// Create a location without a file
    pub fn new(begin: Pos, end: Pos) -> Self {
        Self {
            file: None,
            begin,
            end,
        }
    }

    /// Attach a file name
    #[must_use]
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Range of 1-based line numbers covered by this location
    pub fn lines(&self) -> Range<u32> {
        self.begin.line..self.end.line + 1
    }

    /// Map this location onto a byte range of `source`.
    ///
    /// Columns past the end of a line are clamped to the line end. Returns
    /// `None` when the start line does not exist in `source`.
    pub fn byte_range(&self, source: &str) -> Option<Range<usize>> {
        let start = offset_of(source, self.begin)?;
        let end = offset_of(source, self.end).unwrap_or(source.len());
        Some(start..end.max(start))
    }
}

impl std::fmt::Display for Loc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{file}:")?;
        }
        write!(f, "{}-{}", self.begin, self.end)
    }
}

fn offset_of(source: &str, pos: Pos) -> Option<usize> {
    let mut offset = 0;
    for (index, line) in source.split_inclusive('\n').enumerate() {
        if index + 1 == pos.line as usize {
            let content = line.trim_end_matches('\n');
            return Some(offset + (pos.column as usize).min(content.len()));
        }
        offset += line.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_file() {
        let loc = Loc::new(Pos::new(1, 0), Pos::new(3, 5)).with_file("foo.rbi");
        assert_eq!(loc.to_string(), "foo.rbi:1:0-3:5");
    }

    #[test]
    fn test_display_without_file() {
        let loc = Loc::new(Pos::new(2, 2), Pos::new(2, 10));
        assert_eq!(loc.to_string(), "2:2-2:10");
    }

    #[test]
    fn test_byte_range() {
        let source = "module A\n  def foo; end\nend\n";
        let loc = Loc::new(Pos::new(2, 2), Pos::new(2, 14));
        let range = loc.byte_range(source).unwrap();
        assert_eq!(&source[range], "def foo; end");
    }

    #[test]
    fn test_byte_range_missing_line() {
        let loc = Loc::new(Pos::new(10, 0), Pos::new(10, 1));
        assert_eq!(loc.byte_range("a\nb\n"), None);
    }

    #[test]
    fn test_lines() {
        let loc = Loc::new(Pos::new(4, 0), Pos::new(6, 3));
        assert_eq!(loc.lines(), 4..7);
    }
}
