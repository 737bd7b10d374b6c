//! Non-fatal diagnostics shared by the rewriters and validators
//!
//! Passes collect an ordered `Vec<Diagnostic>` alongside their result. The
//! library only reports; callers decide whether anything fails a build.

use codespan_reporting::diagnostic::Label;
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use rbi_span::Loc;
use serde::{Deserialize, Serialize};

pub use codespan_reporting;

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// Informational message
    Info,
    /// Something was guessed or silently dropped
    Warning,
    /// A validation rule failed
    Error,
}

/// A reported diagnostic: message plus optional location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable code of the rule or pass that produced this diagnostic
    pub code: String,
    /// Severity level
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// Primary location
    pub loc: Option<Loc>,
    /// Further locations (e.g. the other definitions of a duplicate)
    pub related: Vec<Loc>,
}

impl Diagnostic {
    /// Create a warning
    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    /// Create an error
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    fn new(severity: Severity, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            severity,
            message: message.into(),
            loc: None,
            related: Vec::new(),
        }
    }

    /// Attach the primary location
    #[must_use]
    pub fn with_loc(mut self, loc: Option<Loc>) -> Self {
        self.loc = loc;
        self
    }

    /// Attach a secondary location
    #[must_use]
    pub fn with_related(mut self, loc: Loc) -> Self {
        self.related.push(loc);
        self
    }

    /// Convert to a codespan diagnostic for rustc-style output.
    ///
    /// `source` is the text of the file the locations point into; locations
    /// that do not map onto it are left out of the labels.
    pub fn to_codespan_diagnostic(
        &self,
        file_id: usize,
        source: &str,
    ) -> codespan_reporting::diagnostic::Diagnostic<usize> {
        let diagnostic = match self.severity {
            Severity::Info => codespan_reporting::diagnostic::Diagnostic::note(),
            Severity::Warning => codespan_reporting::diagnostic::Diagnostic::warning(),
            Severity::Error => codespan_reporting::diagnostic::Diagnostic::error(),
        };

        let mut labels = Vec::new();
        if let Some(range) = self.loc.as_ref().and_then(|loc| loc.byte_range(source)) {
            labels.push(Label::primary(file_id, range));
        }
        for related in &self.related {
            if let Some(range) = related.byte_range(source) {
                labels.push(Label::secondary(file_id, range).with_message("also defined here"));
            }
        }

        diagnostic
            .with_message(&self.message)
            .with_code(&self.code)
            .with_labels(labels)
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.loc {
            Some(loc) => write!(f, "{loc}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Whether any diagnostic in the list is an error
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.severity == Severity::Error)
}

/// Failure while rendering diagnostics
#[derive(Debug, thiserror::Error)]
#[error("failed to render diagnostics: {0}")]
pub struct RenderError(#[from] codespan_reporting::files::Error);

/// Render diagnostics against one source file with a bounded excerpt of
/// `context_lines` lines around each label.
///
/// # Errors
///
/// Returns `RenderError` when codespan cannot resolve a label range.
pub fn render_diagnostics(
    file_name: &str,
    source: &str,
    diagnostics: &[Diagnostic],
    context_lines: usize,
) -> Result<String, RenderError> {
    let mut files = SimpleFiles::new();
    let file_id = files.add(file_name, source);

    let mut config = term::Config::default();
    config.before_label_lines = context_lines;
    config.after_label_lines = context_lines;

    let mut buffer = Vec::new();
    for diagnostic in diagnostics {
        let diagnostic = diagnostic.to_codespan_diagnostic(file_id, source);
        #[allow(deprecated, reason = "codespan keeps the byte-buffer emitter behind a deprecation")]
        term::emit(&mut buffer, &config, &files, &diagnostic)?;
    }

    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rbi_span::Pos;

    #[test]
    fn test_display() {
        let diagnostic = Diagnostic::warning("inflate", "can't infer scope kind")
            .with_loc(Some(Loc::new(Pos::new(1, 0), Pos::new(1, 5)).with_file("a.rbi")));
        assert_eq!(diagnostic.to_string(), "a.rbi:1:0-1:5: can't infer scope kind");
    }

    #[test]
    fn test_has_errors() {
        let warning = Diagnostic::warning("w", "warn");
        let error = Diagnostic::error("e", "err");
        assert!(!has_errors(&[warning.clone()]));
        assert!(has_errors(&[warning, error]));
    }

    #[test]
    fn test_codespan_labels() {
        let source = "module A\nend\n";
        let diagnostic = Diagnostic::error("duplicate", "duplicate definition of `::A`")
            .with_loc(Some(Loc::new(Pos::new(1, 0), Pos::new(2, 3))))
            .with_related(Loc::new(Pos::new(7, 0), Pos::new(7, 3)));
        let converted = diagnostic.to_codespan_diagnostic(0, source);

        assert_eq!(converted.labels.len(), 1);
        assert_eq!(converted.labels[0].range, 0..12);
        assert_eq!(converted.code.as_deref(), Some("duplicate"));
    }

    #[test]
    fn test_render_contains_source() {
        let source = "module A\n  require \"foo\"\nend\n";
        let diagnostic = Diagnostic::error("disallowed", "`require` is not allowed")
            .with_loc(Some(Loc::new(Pos::new(2, 2), Pos::new(2, 15))));
        let output = render_diagnostics("a.rbi", source, &[diagnostic], 1).unwrap();

        assert!(output.contains("`require` is not allowed"));
        assert!(output.contains("require \"foo\""));
    }
}
