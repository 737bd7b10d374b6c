//! Tree rewriting passes
//!
//! Every pass follows the [`Visitor`](rbi_tree::Visitor) /
//! [`VisitorMut`](rbi_tree::VisitorMut) contract: one exhaustive match over
//! the node kind per pass. Merge, flatten and inflate build new trees and
//! only read their inputs; group, sort, signature collection and name
//! canonicalization restructure a tree in place.

mod flatten;
mod group;
mod inflate;
mod merge;
mod names;
mod sigs;
mod sort;

pub use flatten::flatten;
pub use group::{group, group_kind};
pub use inflate::{Inflated, inflate};
pub use merge::{MergeOptions, Merged, merge, merge_with};
pub use names::{canonical_name, canonicalize_names};
pub use sigs::collect_signatures;
pub use sort::{sort, sort_key};

use rbi_tree::{NodeId, StructuralError, Tree};

/// Destination scope stack used by passes that build a new tree
#[derive(Debug)]
pub(crate) struct ScopeStack {
    stack: Vec<NodeId>,
}

impl ScopeStack {
    /// Stack seeded with a root scope
    pub(crate) fn seeded(root: NodeId) -> Self {
        Self { stack: vec![root] }
    }

    /// Current destination scope
    pub(crate) fn top(&self) -> Result<NodeId, StructuralError> {
        self.stack.last().copied().ok_or(StructuralError::EmptyStack)
    }

    pub(crate) fn push(&mut self, scope: NodeId) {
        self.stack.push(scope);
    }

    /// Pop `expected`, failing if something else is on top
    pub(crate) fn pop(&mut self, expected: NodeId, tree: &Tree) -> Result<(), StructuralError> {
        let found = self.stack.pop().ok_or(StructuralError::EmptyStack)?;
        if found != expected {
            return Err(StructuralError::ScopeMismatch {
                expected: tree.describe(expected),
                found: tree.describe(found),
            });
        }
        Ok(())
    }
}
