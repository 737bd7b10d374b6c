//! Fatal tree errors
//!
//! Note: fields are read by miette's `#[derive(Diagnostic)]` expansion.

use miette::Diagnostic;
use thiserror::Error;

/// A pass or builder invariant was violated.
///
/// Always fatal: the pass aborts with no partial result.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum StructuralError {
    /// The scope popped off a pass stack is not the one that was pushed
    #[error("scope stack mismatch: expected `{expected}`, found `{found}`")]
    #[diagnostic(code(rbi::scope_mismatch))]
    ScopeMismatch {
        /// Scope that was pushed
        expected: String,
        /// Scope that was popped
        found: String,
    },

    /// A pass stack was popped while empty
    #[error("scope stack is empty")]
    #[diagnostic(code(rbi::empty_stack))]
    EmptyStack,

    /// A child was appended to something that has no body
    #[error("`{node}` is not a scope and cannot own children")]
    #[diagnostic(code(rbi::not_a_scope))]
    NotAScope {
        /// Description of the would-be owner
        node: String,
    },

    /// A node that already has an owner was appended again
    #[error("`{node}` already has an owner; detach it first")]
    #[diagnostic(code(rbi::already_owned), help("ownership moves only through detach then append"))]
    AlreadyOwned {
        /// Description of the node
        node: String,
    },

    /// The root scope showed up somewhere other than the top of a tree
    #[error("a root scope cannot appear inside a body")]
    #[diagnostic(code(rbi::root_in_body))]
    RootInBody,

    /// A handle that does not belong to this tree
    #[error("node handle {index} does not belong to this tree")]
    #[diagnostic(
        code(rbi::unknown_node),
        help("handles are only valid in the tree that allocated them")
    )]
    UnknownNode {
        /// Raw arena index of the handle
        index: u32,
    },

    /// A body replacement was not a permutation of the existing body
    #[error("new body of `{scope}` is not a reordering of its children")]
    #[diagnostic(code(rbi::not_a_permutation))]
    NotAPermutation {
        /// Scope whose body was replaced
        scope: String,
    },
}
