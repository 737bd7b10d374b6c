//! Flatten nesting into top-level scopes named by qualified path
//!
//! Leaf declarations stay inside the scope that directly contained them.
//! Singleton scopes are never promoted: `<self>` cannot be told apart from
//! a regular scope once it is part of a flat path.

use crate::ScopeStack;
use rbi_tree::{NodeId, NodeKind, PATH_SEPARATOR, ScopeKind, StructuralError, Tree, Visitor};

/// Flatten `trees` into one tree of top-level qualified scopes and constants
///
/// # Errors
///
/// Returns a `StructuralError` if the destination stack gets out of sync.
pub fn flatten(trees: &[&Tree]) -> Result<Tree, StructuralError> {
    let output = Tree::new();
    let mut flattener = Flattener {
        stack: ScopeStack::seeded(output.root()),
        output,
    };
    for tree in trees {
        flattener.visit(tree, tree.root())?;
    }
    tracing::debug!(
        inputs = trees.len(),
        top_level = flattener.output.body(flattener.output.root()).len(),
        "flattened trees"
    );
    Ok(flattener.output)
}

struct Flattener {
    output: Tree,
    stack: ScopeStack,
}

impl Flattener {
    fn flatten_scope(
        &mut self,
        tree: &Tree,
        node: NodeId,
        singleton: bool,
    ) -> Result<(), StructuralError> {
        let copy = self.output.structural_copy_from(tree, node);
        let parent = if singleton {
            self.stack.top()?
        } else {
            let qualified = tree.qualified_name(node);
            if let NodeKind::Scope(scope) = &mut self.output.node_mut(copy).kind {
                scope.name = qualified;
            }
            self.output.root()
        };
        self.output.append(parent, copy)?;

        self.stack.push(copy);
        self.visit_all(tree, tree.body(node))?;
        self.stack.pop(copy, &self.output)
    }

    fn flatten_const(&mut self, tree: &Tree, node: NodeId) -> Result<(), StructuralError> {
        let copy = self.output.structural_copy_from(tree, node);
        if let NodeKind::Const(constant) = &mut self.output.node_mut(copy).kind {
            if !constant.name.starts_with(PATH_SEPARATOR) {
                constant.name = format!(
                    "{}{PATH_SEPARATOR}{}",
                    tree.enclosing_name(node),
                    constant.name
                );
            }
        }
        self.output.append(self.output.root(), copy)
    }
}

impl Visitor for Flattener {
    fn visit(&mut self, tree: &Tree, node: NodeId) -> Result<(), StructuralError> {
        match &tree.node(node).kind {
            NodeKind::Scope(scope) => match scope.kind {
                ScopeKind::Root | ScopeKind::Group(_) => self.visit_all(tree, tree.body(node)),
                ScopeKind::Singleton => self.flatten_scope(tree, node, true),
                ScopeKind::Namespace | ScopeKind::Type { .. } => {
                    self.flatten_scope(tree, node, false)
                }
            },
            NodeKind::Const(_) => self.flatten_const(tree, node),
            NodeKind::Method(_) | NodeKind::Attr(_) | NodeKind::Directive(_) | NodeKind::Sig(_) => {
                let copy = self.output.structural_copy_from(tree, node);
                self.output.append(self.stack.top()?, copy)
            }
        }
    }
}
