//! Traversal contract shared by every rewriter and validator
//!
//! A pass implements `visit` with an exhaustive match over [`NodeKind`];
//! `visit_all` folds `visit` over a sequence. There is no per-pass walking
//! logic beyond that.
//!
//! [`NodeKind`]: crate::NodeKind

use crate::{NodeId, StructuralError, Tree};

/// Read-only traversal over a tree
pub trait Visitor {
    /// Visit one node
    ///
    /// # Errors
    ///
    /// Returns a `StructuralError` when a pass invariant is violated.
    fn visit(&mut self, tree: &Tree, node: NodeId) -> Result<(), StructuralError>;

    /// Visit each node in order
    ///
    /// # Errors
    ///
    /// Stops at the first `StructuralError`.
    fn visit_all(&mut self, tree: &Tree, nodes: &[NodeId]) -> Result<(), StructuralError> {
        nodes.iter().try_for_each(|&node| self.visit(tree, node))
    }
}

/// Traversal that may restructure the tree it walks.
///
/// `visit_all` receives a snapshot of handles, so bodies can be detached
/// from and appended to while the sequence is being walked.
pub trait VisitorMut {
    /// Visit one node
    ///
    /// # Errors
    ///
    /// Returns a `StructuralError` when a pass invariant is violated.
    fn visit(&mut self, tree: &mut Tree, node: NodeId) -> Result<(), StructuralError>;

    /// Visit each node of a snapshot in order
    ///
    /// # Errors
    ///
    /// Stops at the first `StructuralError`.
    fn visit_all(&mut self, tree: &mut Tree, nodes: &[NodeId]) -> Result<(), StructuralError> {
        nodes.iter().try_for_each(|&node| self.visit(tree, node))
    }
}

/// Snapshot of a scope's body, safe to iterate while mutating the tree
pub fn snapshot(tree: &Tree, scope: NodeId) -> Vec<NodeId> {
    tree.body(scope).to_vec()
}
