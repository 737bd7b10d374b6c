//! Partition scope bodies into semantic buckets
//!
//! Each non-empty bucket becomes a transparent group wrapper, printed as a
//! blank-line separated run. Wrappers from an earlier run are dissolved
//! first, so grouping twice gives the same tree.

use rbi_tree::visitor::snapshot;
use rbi_tree::{
    DirectiveKind, GroupKind, NodeId, NodeKind, Scope, ScopeKind, StructuralError, Tree,
    VisitorMut,
};

/// Group every scope of `tree`, recursively
///
/// # Errors
///
/// Returns a `StructuralError` when a body holds a node that cannot be
/// classified.
pub fn group(tree: &mut Tree) -> Result<(), StructuralError> {
    let root = tree.root();
    let mut grouper = Grouper { groups: 0 };
    grouper.visit(tree, root)?;
    tracing::debug!(groups = grouper.groups, "grouped tree");
    Ok(())
}

/// Bucket of a body node
///
/// # Errors
///
/// A root scope is never a valid child and cannot be classified.
pub fn group_kind(tree: &Tree, node: NodeId) -> Result<GroupKind, StructuralError> {
    let kind = match &tree.node(node).kind {
        NodeKind::Directive(directive) => match directive.kind() {
            DirectiveKind::Mixin => GroupKind::Mixins,
            DirectiveKind::Helper => GroupKind::Helpers,
            DirectiveKind::Visibility | DirectiveKind::Other => GroupKind::Other,
        },
        NodeKind::Scope(scope) => match scope.kind {
            ScopeKind::Root => return Err(StructuralError::RootInBody),
            ScopeKind::Group(kind) => kind,
            ScopeKind::Namespace | ScopeKind::Type { .. } | ScopeKind::Singleton => {
                GroupKind::Scopes
            }
        },
        NodeKind::Const(_) => GroupKind::Consts,
        NodeKind::Attr(_) => GroupKind::Attrs,
        NodeKind::Method(method) if method.is_singleton => GroupKind::SingletonMethods,
        NodeKind::Method(_) => GroupKind::Methods,
        NodeKind::Sig(_) => GroupKind::Other,
    };
    Ok(kind)
}

struct Grouper {
    groups: usize,
}

impl Grouper {
    /// Body of `scope` with existing group wrappers replaced by their children
    fn dissolve_groups(tree: &mut Tree, scope: NodeId) -> Vec<NodeId> {
        let mut children = Vec::new();
        for child in snapshot(tree, scope) {
            if matches!(
                tree.scope(child),
                Some(Scope {
                    kind: ScopeKind::Group(_),
                    ..
                })
            ) {
                children.extend(Self::dissolve_groups(tree, child));
                tree.detach(child);
            } else {
                children.push(child);
            }
        }
        children
    }

    fn group_scope(&mut self, tree: &mut Tree, scope: NodeId) -> Result<(), StructuralError> {
        let children = Self::dissolve_groups(tree, scope);
        self.visit_all(tree, &children)?;

        let mut buckets: Vec<(GroupKind, Vec<NodeId>)> =
            GroupKind::ALL.iter().map(|kind| (*kind, Vec::new())).collect();
        for &child in &children {
            let kind = group_kind(tree, child)?;
            if let Some((_, bucket)) = buckets
                .iter_mut()
                .find(|(bucket_kind, _)| *bucket_kind == kind)
            {
                bucket.push(child);
            }
        }

        for &child in &children {
            tree.detach(child);
        }
        for (kind, members) in buckets {
            if members.is_empty() {
                continue;
            }
            let wrapper = tree.push(scope, Scope::group(kind))?;
            self.groups += 1;
            for member in members {
                tree.append(wrapper, member)?;
            }
        }
        Ok(())
    }
}

impl VisitorMut for Grouper {
    fn visit(&mut self, tree: &mut Tree, node: NodeId) -> Result<(), StructuralError> {
        match &tree.node(node).kind {
            NodeKind::Scope(_) => self.group_scope(tree, node),
            NodeKind::Const(_)
            | NodeKind::Method(_)
            | NodeKind::Attr(_)
            | NodeKind::Directive(_)
            | NodeKind::Sig(_) => Ok(()),
        }
    }
}
