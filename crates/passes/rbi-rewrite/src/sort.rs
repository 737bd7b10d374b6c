//! Deterministic body ordering
//!
//! Bodies are sorted depth-first with a stable sort on [`sort_key`], so
//! nodes with equal keys keep their relative order and sorting a sorted
//! tree changes nothing. Namespace and type scopes are renamed to their
//! absolute form on the way back up.

use crate::names::canonical_name;
use rbi_tree::visitor::snapshot;
use rbi_tree::{DirectiveKind, NodeId, NodeKind, ScopeKind, StructuralError, Tree, VisitorMut};

/// Sort every body of `tree`
///
/// # Errors
///
/// Returns a `StructuralError` if a reordered body is not a permutation of
/// the original one.
pub fn sort(tree: &mut Tree) -> Result<(), StructuralError> {
    let root = tree.root();
    let mut sorter = Sorter { scopes: 0 };
    sorter.visit(tree, root)?;
    tracing::debug!(scopes = sorter.scopes, "sorted tree");
    Ok(())
}

/// Rank and display name of a body node.
///
/// Ranks: mixins 0, scopes and constants 1, attributes 2, methods 3,
/// anything else 4.
pub fn sort_key(tree: &Tree, node: NodeId) -> (u8, String) {
    match &tree.node(node).kind {
        NodeKind::Directive(directive) if directive.kind() == DirectiveKind::Mixin => {
            (0, directive.display_name())
        }
        NodeKind::Directive(directive) => (4, directive.display_name()),
        NodeKind::Scope(scope) => match scope.kind {
            ScopeKind::Namespace | ScopeKind::Type { .. } | ScopeKind::Singleton => {
                (1, scope.name.clone())
            }
            ScopeKind::Root | ScopeKind::Group(_) => (4, String::new()),
        },
        NodeKind::Const(constant) => (1, constant.name.clone()),
        NodeKind::Attr(attr) => (2, attr.names.join(", ")),
        NodeKind::Method(method) => (3, method.name.clone()),
        NodeKind::Sig(_) => (4, String::new()),
    }
}

struct Sorter {
    scopes: usize,
}

impl Sorter {
    fn sort_scope(&mut self, tree: &mut Tree, scope: NodeId) -> Result<(), StructuralError> {
        let children = snapshot(tree, scope);
        self.visit_all(tree, &children)?;

        let mut keyed: Vec<((u8, String), NodeId)> = children
            .into_iter()
            .map(|child| (sort_key(tree, child), child))
            .collect();
        keyed.sort_by(|(left, _), (right, _)| left.cmp(right));
        tree.reorder_body(scope, keyed.into_iter().map(|(_, child)| child).collect())?;

        canonical_name(tree, scope);
        self.scopes += 1;
        Ok(())
    }
}

impl VisitorMut for Sorter {
    fn visit(&mut self, tree: &mut Tree, node: NodeId) -> Result<(), StructuralError> {
        match &tree.node(node).kind {
            NodeKind::Scope(_) => self.sort_scope(tree, node),
            NodeKind::Const(_)
            | NodeKind::Method(_)
            | NodeKind::Attr(_)
            | NodeKind::Directive(_)
            | NodeKind::Sig(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;
    use rbi_printer::print;
    use rbi_tree::{Attr, AttrKind, Const, Directive, Method, Scope};

    #[test]
    fn test_sort_buckets_then_names() {
        let mut tree = Tree::new();
        let a = tree.push(tree.root(), Scope::namespace("A")).unwrap();
        tree.push(a, Method::new("foo")).unwrap();
        tree.push(a, Const::new("C", Some("1"))).unwrap();
        tree.push(a, Scope::namespace("B")).unwrap();
        tree.push(a, Directive::include("X")).unwrap();

        sort(&mut tree).unwrap();

        expect![[r#"
            module ::A
              include X
              module ::A::B; end
              C = 1
              def foo; end
            end
        "#]]
        .assert_eq(&print(&tree));
    }

    #[test]
    fn test_sort_is_alphabetical_within_rank() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.push(root, Method::new("zeta")).unwrap();
        tree.push(root, Attr::new(AttrKind::Reader, &["b"], None)).unwrap();
        tree.push(root, Method::new("alpha")).unwrap();
        tree.push(root, Directive::new("private", &[])).unwrap();
        tree.push(root, Attr::new(AttrKind::Writer, &["a"], None)).unwrap();
        tree.push(root, Directive::include("B")).unwrap();
        tree.push(root, Directive::include("A")).unwrap();

        sort(&mut tree).unwrap();

        expect![[r#"
            include A
            include B
            attr_writer :a
            attr_reader :b
            def alpha; end
            def zeta; end
            private
        "#]]
        .assert_eq(&print(&tree));
    }

    #[test]
    fn test_equal_keys_keep_order() {
        let mut tree = Tree::new();
        let root = tree.root();
        let first = tree.push(root, Method::new("foo")).unwrap();
        let second = tree.push(root, Method::singleton("foo")).unwrap();

        sort(&mut tree).unwrap();
        assert_eq!(tree.body(root), &[first, second]);
    }

    #[test]
    fn test_sort_is_idempotent() {
        let mut tree = Tree::new();
        let a = tree.push(tree.root(), Scope::class("A")).unwrap();
        let singleton = tree.push(a, Scope::singleton()).unwrap();
        tree.push(singleton, Method::new("b")).unwrap();
        tree.push(singleton, Method::new("a")).unwrap();
        tree.push(a, Const::new("Z", None)).unwrap();
        tree.push(a, Method::new("m")).unwrap();
        tree.push(tree.root(), Scope::namespace("B")).unwrap();

        sort(&mut tree).unwrap();
        let once = print(&tree);
        let bodies: Vec<Vec<NodeId>> = tree
            .descendants(tree.root())
            .into_iter()
            .map(|node| tree.body(node).to_vec())
            .collect();

        sort(&mut tree).unwrap();
        let again: Vec<Vec<NodeId>> = tree
            .descendants(tree.root())
            .into_iter()
            .map(|node| tree.body(node).to_vec())
            .collect();
        assert_eq!(again, bodies);
        assert_eq!(print(&tree), once);
    }
}
