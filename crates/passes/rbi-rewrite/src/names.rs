//! Scope name normalization

use rbi_tree::visitor::snapshot;
use rbi_tree::{NodeId, NodeKind, ScopeKind, StructuralError, Tree, VisitorMut};

/// Rename a namespace or type scope to its absolute qualified name.
///
/// Returns the new name, or `None` when `node` is not a namespace or type.
pub fn canonical_name(tree: &mut Tree, node: NodeId) -> Option<String> {
    if !matches!(
        tree.scope(node).map(|scope| &scope.kind),
        Some(ScopeKind::Namespace | ScopeKind::Type { .. })
    ) {
        return None;
    }
    let qualified = tree.qualified_name(node);
    if let NodeKind::Scope(scope) = &mut tree.node_mut(node).kind {
        scope.name.clone_from(&qualified);
    }
    Some(qualified)
}

/// Rename every namespace and type scope of `tree` to its qualified name
///
/// # Errors
///
/// Never fails today; the signature follows the visitor contract.
pub fn canonicalize_names(tree: &mut Tree) -> Result<(), StructuralError> {
    let root = tree.root();
    let mut canonicalizer = Canonicalizer { renamed: 0 };
    canonicalizer.visit(tree, root)?;
    tracing::debug!(renamed = canonicalizer.renamed, "canonicalized scope names");
    Ok(())
}

struct Canonicalizer {
    renamed: usize,
}

impl VisitorMut for Canonicalizer {
    fn visit(&mut self, tree: &mut Tree, node: NodeId) -> Result<(), StructuralError> {
        match &tree.node(node).kind {
            NodeKind::Scope(_) => {
                if canonical_name(tree, node).is_some() {
                    self.renamed += 1;
                }
                let children = snapshot(tree, node);
                self.visit_all(tree, &children)
            }
            NodeKind::Const(_)
            | NodeKind::Method(_)
            | NodeKind::Attr(_)
            | NodeKind::Directive(_)
            | NodeKind::Sig(_) => Ok(()),
        }
    }
}
