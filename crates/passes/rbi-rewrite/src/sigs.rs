//! Attach bare signatures to the declaration that follows them
//!
//! A run of consecutive bare signatures attaches to the next method or
//! attribute in the same body. Any other node ends the run, and a run never
//! crosses into or out of a nested scope. Signatures that end up attached to
//! nothing stay in the tree as bare nodes.

use rbi_tree::visitor::snapshot;
use rbi_tree::{NodeId, NodeKind, Sig, StructuralError, Tree, VisitorMut};

/// Attach every run of bare signatures in `tree`
///
/// # Errors
///
/// Never fails today; the signature follows the visitor contract.
pub fn collect_signatures(tree: &mut Tree) -> Result<(), StructuralError> {
    let root = tree.root();
    let mut collector = SigCollector {
        pending: Vec::new(),
        attached: 0,
    };
    collector.visit(tree, root)?;
    tracing::debug!(attached = collector.attached, "collected signatures");
    Ok(())
}

struct SigCollector {
    pending: Vec<NodeId>,
    attached: usize,
}

impl SigCollector {
    /// Detach the pending run and return its payloads
    fn take_pending(&mut self, tree: &mut Tree) -> Vec<Sig> {
        let mut sigs = Vec::new();
        for node in std::mem::take(&mut self.pending) {
            tree.detach(node);
            if let NodeKind::Sig(sig) = &tree.node(node).kind {
                sigs.push(sig.clone());
            }
        }
        self.attached += sigs.len();
        sigs
    }

    fn collect_scope(&mut self, tree: &mut Tree, scope: NodeId) -> Result<(), StructuralError> {
        self.pending.clear();
        let children = snapshot(tree, scope);
        self.visit_all(tree, &children)?;
        self.pending.clear();
        Ok(())
    }
}

impl VisitorMut for SigCollector {
    fn visit(&mut self, tree: &mut Tree, node: NodeId) -> Result<(), StructuralError> {
        match &tree.node(node).kind {
            NodeKind::Scope(_) => self.collect_scope(tree, node),
            NodeKind::Sig(_) => {
                self.pending.push(node);
                Ok(())
            }
            NodeKind::Method(_) => {
                let sigs = self.take_pending(tree);
                if let NodeKind::Method(method) = &mut tree.node_mut(node).kind {
                    method.sigs.extend(sigs);
                }
                Ok(())
            }
            NodeKind::Attr(_) => {
                let sigs = self.take_pending(tree);
                if let NodeKind::Attr(attr) = &mut tree.node_mut(node).kind {
                    let only_derived =
                        attr.sigs.len() == 1 && attr.sigs.first() == attr.derived_sig().as_ref();
                    if !sigs.is_empty() && only_derived {
                        attr.sigs.clear();
                    }
                    attr.sigs.extend(sigs);
                }
                Ok(())
            }
            NodeKind::Const(_) | NodeKind::Directive(_) => {
                self.pending.clear();
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;
    use rbi_printer::print;
    use rbi_tree::{Attr, AttrKind, Const, Method, Scope};

    #[test]
    fn test_run_attaches_to_next_method() {
        let mut tree = Tree::new();
        let a = tree.push(tree.root(), Scope::class("A")).unwrap();
        tree.push(a, Sig::returns("Integer")).unwrap();
        tree.push(a, Sig::void().with_param("x", None)).unwrap();
        tree.push(a, Method::new("foo")).unwrap();
        tree.push(a, Method::new("bar")).unwrap();

        collect_signatures(&mut tree).unwrap();

        expect![[r#"
            class A
              sig { returns(Integer) }
              sig { params(x: T.untyped).void }
              def foo; end

              def bar; end
            end
        "#]]
        .assert_eq(&print(&tree));
        assert_eq!(tree.body(a).len(), 2);
    }

    #[test]
    fn test_explicit_sig_replaces_derived_one() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.push(root, Sig::returns("T.nilable(String)")).unwrap();
        tree.push(root, Attr::new(AttrKind::Reader, &["name"], Some("String")))
            .unwrap();
        tree.push(root, Attr::new(AttrKind::Reader, &["other"], Some("String")))
            .unwrap();

        collect_signatures(&mut tree).unwrap();

        expect![[r#"
            sig { returns(T.nilable(String)) }
            attr_reader :name

            sig { returns(String) }
            attr_reader :other
        "#]]
        .assert_eq(&print(&tree));
    }

    #[test]
    fn test_run_stops_at_scope_boundaries() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.push(root, Sig::void()).unwrap();
        let a = tree.push(root, Scope::namespace("A")).unwrap();
        tree.push(a, Method::new("inner")).unwrap();
        tree.push(a, Sig::void()).unwrap();
        tree.push(root, Method::new("outer")).unwrap();

        collect_signatures(&mut tree).unwrap();

        expect![[r#"
            sig { void }

            module A
              def inner; end
              sig { void }
            end

            def outer; end
        "#]]
        .assert_eq(&print(&tree));
    }

    #[test]
    fn test_run_stops_at_other_declarations() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.push(root, Sig::void()).unwrap();
        tree.push(root, Const::new("C", Some("1"))).unwrap();
        let method = tree.push(root, Method::new("foo")).unwrap();

        collect_signatures(&mut tree).unwrap();

        assert_eq!(tree.body(root).len(), 3);
        assert!(matches!(&tree.node(method).kind, NodeKind::Method(method) if method.sigs.is_empty()));
    }
}
