//! Declaration tree model
//!
//! An interface file is represented as an arena of [`Node`]s addressed by
//! [`NodeId`] handles. Scopes store their children as handle lists and every
//! node keeps a non-owning handle to its owner, so the tree stays strictly
//! single-owner top-down.

mod error;
mod node;
pub mod visitor;

pub use error::StructuralError;
pub use node::{
    Attr, AttrKind, Comment, Const, Directive, DirectiveKind, GroupKind, Method, Node, NodeKind,
    PATH_SEPARATOR, Param, ParamKind, SINGLETON_NAME, Scope, ScopeKind, Sig, SigParam, UNTYPED,
};
pub use visitor::{Visitor, VisitorMut};

use rbi_arena::{Arena, Idx};

/// Handle to a node inside one [`Tree`]
pub type NodeId = Idx<Node>;

/// A declaration tree rooted at a synthetic root scope
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Arena<Node>,
    root: NodeId,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Create an empty tree
    pub fn new() -> Self {
        let mut nodes = Arena::new();
        let root = nodes.alloc(Node::new(Scope::root()));
        Self { nodes, root }
    }

    /// The root scope
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Access a node
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Access a node mutably. The owner link stays private.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    /// Scope payload of `id`, if it is a scope
    pub fn scope(&self, id: NodeId) -> Option<&Scope> {
        self.nodes[id].as_scope()
    }

    /// Children of `id`; empty for leaves
    pub fn body(&self, id: NodeId) -> &[NodeId] {
        self.scope(id).map(Scope::body).unwrap_or_default()
    }

    /// Owner of `id`
    pub fn owner(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].owner
    }

    /// Whether `id` was allocated by this tree
    pub fn contains(&self, id: NodeId) -> bool {
        usize::try_from(u32::from(id.into_raw())).is_ok_and(|index| index < self.nodes.len())
    }

    fn check(&self, id: NodeId) -> Result<(), StructuralError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(StructuralError::UnknownNode {
                index: u32::from(id.into_raw()),
            })
        }
    }

    /// Allocate an unowned node
    pub fn alloc(&mut self, node: impl Into<Node>) -> NodeId {
        let mut node = node.into();
        node.owner = None;
        self.nodes.alloc(node)
    }

    /// Append `child` to the body of `parent` and make `parent` its owner.
    ///
    /// # Errors
    ///
    /// Fails when either handle belongs to another tree, when `parent` is not
    /// a scope, when `child` already has an owner or when `child` is a root
    /// scope.
    pub fn append(&mut self, parent: NodeId, child: NodeId) -> Result<(), StructuralError> {
        self.check(parent)?;
        self.check(child)?;
        if self.nodes[child].owner.is_some() {
            return Err(StructuralError::AlreadyOwned {
                node: self.describe(child),
            });
        }
        if matches!(self.scope(child), Some(Scope { kind: ScopeKind::Root, .. })) {
            return Err(StructuralError::RootInBody);
        }
        let description = self.describe(parent);
        match &mut self.nodes[parent].kind {
            NodeKind::Scope(scope) => scope.body.push(child),
            _ => return Err(StructuralError::NotAScope { node: description }),
        }
        self.nodes[child].owner = Some(parent);
        Ok(())
    }

    /// Allocate `node` and append it to `parent`
    ///
    /// # Errors
    ///
    /// Fails when `parent` is not a scope or `node` is a root scope.
    pub fn push(&mut self, parent: NodeId, node: impl Into<Node>) -> Result<NodeId, StructuralError> {
        let id = self.alloc(node);
        self.append(parent, id)?;
        Ok(id)
    }

    /// Remove `id` from its owner's body without destroying it.
    ///
    /// Detaching an unowned node or a foreign handle does nothing.
    pub fn detach(&mut self, id: NodeId) {
        if !self.contains(id) {
            return;
        }
        let Some(owner) = self.nodes[id].owner.take() else {
            return;
        };
        if let NodeKind::Scope(scope) = &mut self.nodes[owner].kind {
            scope.body.retain(|child| *child != id);
        }
    }

    /// Replace the body of `scope` with a reordering of the same children.
    ///
    /// # Errors
    ///
    /// Fails when `scope` belongs to another tree, is not a scope, or when
    /// `order` is not a permutation of its current body.
    pub fn reorder_body(&mut self, scope: NodeId, order: Vec<NodeId>) -> Result<(), StructuralError> {
        self.check(scope)?;
        let description = self.describe(scope);
        let NodeKind::Scope(data) = &mut self.nodes[scope].kind else {
            return Err(StructuralError::NotAScope { node: description });
        };
        let mut current = data.body.clone();
        let mut proposed = order.clone();
        current.sort_by_key(|id| u32::from(id.into_raw()));
        proposed.sort_by_key(|id| u32::from(id.into_raw()));
        if current != proposed {
            return Err(StructuralError::NotAPermutation { scope: description });
        }
        data.body = order;
        Ok(())
    }

    /// Qualified name of a scope.
    ///
    /// Walks the owner chain joining names with `::`, rooted at `""`. An
    /// absolute name short-circuits the walk. Groups are transparent and
    /// non-scope nodes resolve to their enclosing scope.
    pub fn qualified_name(&self, id: NodeId) -> String {
        let node = &self.nodes[id];
        let Some(scope) = node.as_scope() else {
            return self.enclosing_name(id);
        };
        match scope.kind {
            ScopeKind::Root => String::new(),
            ScopeKind::Group(_) => self.enclosing_name(id),
            _ if scope.is_absolute() => scope.name.clone(),
            _ => format!("{}{PATH_SEPARATOR}{}", self.enclosing_name(id), scope.name),
        }
    }

    /// Qualified name of the scope that owns `id`
    pub fn enclosing_name(&self, id: NodeId) -> String {
        self.nodes[id]
            .owner
            .map(|owner| self.qualified_name(owner))
            .unwrap_or_default()
    }

    /// Copy of `id` from `source` allocated in this tree, body included
    pub fn deep_copy_from(&mut self, source: &Tree, id: NodeId) -> NodeId {
        let copy = self.alloc(source.node(id).detached_copy());
        for &child in source.body(id) {
            let child_copy = self.deep_copy_from(source, child);
            if let NodeKind::Scope(scope) = &mut self.nodes[copy].kind {
                scope.body.push(child_copy);
            }
            self.nodes[child_copy].owner = Some(copy);
        }
        copy
    }

    /// Copy of `id` from `source` without its body
    pub fn structural_copy_from(&mut self, source: &Tree, id: NodeId) -> NodeId {
        self.alloc(source.node(id).detached_copy())
    }

    /// Nodes reachable from `id` in pre-order, `id` included
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.body(current).iter().rev().copied());
        }
        out
    }

    /// Short description of a node for error messages
    pub fn describe(&self, id: NodeId) -> String {
        match &self.nodes[id].kind {
            NodeKind::Scope(scope) => match &scope.kind {
                ScopeKind::Root => "<root>".to_owned(),
                ScopeKind::Namespace => format!("module {}", scope.name),
                ScopeKind::Type { .. } => format!("class {}", scope.name),
                ScopeKind::Singleton => "class << self".to_owned(),
                ScopeKind::Group(kind) => format!("<group {kind:?}>"),
            },
            NodeKind::Const(constant) => constant.name.clone(),
            NodeKind::Method(method) if method.is_singleton => format!("def self.{}", method.name),
            NodeKind::Method(method) => format!("def {}", method.name),
            NodeKind::Attr(attr) => format!("{} {}", attr.kind.keyword(), attr.names.join(", ")),
            NodeKind::Directive(directive) => directive.display_name(),
            NodeKind::Sig(_) => "sig".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_sets_owner() {
        let mut tree = Tree::new();
        let root = tree.root();
        let module = tree.push(root, Scope::namespace("A")).unwrap();
        let method = tree.push(module, Method::new("foo")).unwrap();

        assert_eq!(tree.owner(method), Some(module));
        assert_eq!(tree.owner(module), Some(root));
        assert_eq!(tree.body(module), &[method]);
    }

    #[test]
    fn test_append_to_leaf_fails() {
        let mut tree = Tree::new();
        let method = tree.push(tree.root(), Method::new("foo")).unwrap();
        let result = tree.push(method, Method::new("bar"));

        assert!(matches!(result, Err(StructuralError::NotAScope { .. })));
    }

    #[test]
    fn test_append_owned_node_fails() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = tree.push(root, Scope::namespace("A")).unwrap();
        let b = tree.push(root, Scope::namespace("B")).unwrap();
        let method = tree.push(a, Method::new("foo")).unwrap();

        assert!(matches!(tree.append(b, method), Err(StructuralError::AlreadyOwned { .. })));

        tree.detach(method);
        tree.append(b, method).unwrap();
        assert!(tree.body(a).is_empty());
        assert_eq!(tree.body(b), &[method]);
        assert_eq!(tree.owner(method), Some(b));
    }

    #[test]
    fn test_foreign_handles_are_rejected() {
        let mut big = Tree::new();
        let a = big.push(big.root(), Scope::namespace("A")).unwrap();
        let foreign = big.push(a, Method::new("foo")).unwrap();

        let mut small = Tree::new();
        let root = small.root();
        assert!(!small.contains(foreign));
        assert!(matches!(
            small.append(root, foreign),
            Err(StructuralError::UnknownNode { .. })
        ));
        assert!(matches!(
            small.append(foreign, root),
            Err(StructuralError::UnknownNode { .. })
        ));
        assert!(matches!(
            small.reorder_body(foreign, Vec::new()),
            Err(StructuralError::UnknownNode { .. })
        ));
        small.detach(foreign);
        assert!(small.body(root).is_empty());
        assert!(big.contains(foreign));
    }

    #[test]
    fn test_qualified_name() {
        let mut tree = Tree::new();
        let a = tree.push(tree.root(), Scope::namespace("A")).unwrap();
        let b = tree.push(a, Scope::class("B")).unwrap();
        let singleton = tree.push(b, Scope::singleton()).unwrap();
        let method = tree.push(b, Method::new("foo")).unwrap();

        assert_eq!(tree.qualified_name(tree.root()), "");
        assert_eq!(tree.qualified_name(a), "::A");
        assert_eq!(tree.qualified_name(b), "::A::B");
        assert_eq!(tree.qualified_name(singleton), "::A::B::<self>");
        assert_eq!(tree.qualified_name(method), "::A::B");
    }

    #[test]
    fn test_absolute_name_short_circuits() {
        let mut tree = Tree::new();
        let a = tree.push(tree.root(), Scope::namespace("A")).unwrap();
        let b = tree.push(a, Scope::namespace("::X::B")).unwrap();
        let c = tree.push(b, Scope::namespace("C")).unwrap();

        assert_eq!(tree.qualified_name(b), "::X::B");
        assert_eq!(tree.qualified_name(c), "::X::B::C");
    }

    #[test]
    fn test_group_is_transparent() {
        let mut tree = Tree::new();
        let a = tree.push(tree.root(), Scope::namespace("A")).unwrap();
        let group = tree.push(a, Scope::group(GroupKind::Scopes)).unwrap();
        let b = tree.push(group, Scope::namespace("B")).unwrap();

        assert_eq!(tree.qualified_name(group), "::A");
        assert_eq!(tree.qualified_name(b), "::A::B");
    }

    #[test]
    fn test_reorder_body_rejects_foreign_nodes() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = tree.push(root, Method::new("a")).unwrap();
        let b = tree.push(root, Method::new("b")).unwrap();

        tree.reorder_body(root, vec![b, a]).unwrap();
        assert_eq!(tree.body(root), &[b, a]);

        let stray = tree.alloc(Method::new("c"));
        assert!(matches!(
            tree.reorder_body(root, vec![a, stray]),
            Err(StructuralError::NotAPermutation { .. })
        ));
    }

    #[test]
    fn test_deep_copy_across_trees() {
        let mut source = Tree::new();
        let a = source.push(source.root(), Scope::namespace("A")).unwrap();
        source.push(a, Method::new("foo")).unwrap();

        let mut target = Tree::new();
        let copy = target.deep_copy_from(&source, a);
        target.append(target.root(), copy).unwrap();

        assert_eq!(target.body(copy).len(), 1);
        let method = target.body(copy)[0];
        assert_eq!(target.owner(method), Some(copy));
        assert_eq!(target.qualified_name(method), "::A");
    }

    #[test]
    fn test_descendants_pre_order() {
        let mut tree = Tree::new();
        let a = tree.push(tree.root(), Scope::namespace("A")).unwrap();
        let foo = tree.push(a, Method::new("foo")).unwrap();
        let b = tree.push(tree.root(), Scope::namespace("B")).unwrap();

        assert_eq!(tree.descendants(tree.root()), vec![tree.root(), a, foo, b]);
    }

    #[test]
    fn test_typed_attr_derives_sig() {
        let reader = Attr::new(AttrKind::Reader, &["foo"], Some("Integer"));
        assert_eq!(reader.sigs, vec![Sig::returns("Integer")]);

        let writer = Attr::new(AttrKind::Writer, &["foo"], Some("Integer"));
        assert_eq!(writer.sigs[0].params[0].name, "foo");

        let untyped = Attr::new(AttrKind::Reader, &["foo"], None);
        assert!(untyped.sigs.is_empty());
    }

    #[test]
    fn test_directive_kind() {
        assert_eq!(Directive::include("Foo").kind(), DirectiveKind::Mixin);
        assert_eq!(Directive::new("abstract!", &[]).kind(), DirectiveKind::Helper);
        assert_eq!(Directive::new("private", &[]).kind(), DirectiveKind::Visibility);
        assert_eq!(Directive::new("foo", &["1"]).kind(), DirectiveKind::Other);
        assert_eq!(Directive::new("foo", &["1", "2"]).display_name(), "foo(1, 2)");
    }
}
