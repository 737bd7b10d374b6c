//! Re-nest qualified top-level declarations
//!
//! Approximate inverse of flatten. Each qualified scope or constant gets its
//! own freshly built chain of intermediate scopes; chains are not shared
//! between declarations, so pipe the result through merge to deduplicate.

use rbi_diagnostics::Diagnostic;
use rbi_index::Index;
use rbi_tree::{NodeId, NodeKind, PATH_SEPARATOR, Scope, ScopeKind, StructuralError, Tree, Visitor};

/// Result of inflating
#[derive(Debug)]
pub struct Inflated {
    /// Re-nested tree
    pub tree: Tree,
    /// One warning per intermediate scope whose kind had to be guessed
    pub diagnostics: Vec<Diagnostic>,
}

/// Inflate the qualified top-level scopes and constants of `trees`
///
/// # Errors
///
/// Returns a `StructuralError` if a copied node cannot be appended.
pub fn inflate(trees: &[&Tree]) -> Result<Inflated, StructuralError> {
    let mut inflater = Inflater {
        trees,
        index: Index::build(trees),
        output: Tree::new(),
        diagnostics: Vec::new(),
    };
    for tree in trees {
        inflater.visit(tree, tree.root())?;
    }
    tracing::debug!(
        inputs = trees.len(),
        guessed = inflater.diagnostics.len(),
        "inflated trees"
    );
    Ok(Inflated {
        tree: inflater.output,
        diagnostics: inflater.diagnostics,
    })
}

struct Inflater<'trees> {
    trees: &'trees [&'trees Tree],
    index: Index,
    output: Tree,
    diagnostics: Vec<Diagnostic>,
}

impl Inflater<'_> {
    /// Kind of the scope declared at `key` in any input tree
    fn known_kind(&self, key: &str) -> Option<ScopeKind> {
        self.index.get(key).iter().find_map(|entry| {
            self.trees[entry.tree]
                .scope(entry.node)
                .filter(|scope| scope.is_named())
                .map(|scope| scope.kind.clone())
        })
    }

    fn inflate_path(&mut self, tree: &Tree, node: NodeId, name: &str) -> Result<(), StructuralError> {
        let segments: Vec<&str> = name
            .trim_start_matches(PATH_SEPARATOR)
            .split(PATH_SEPARATOR)
            .collect();
        let Some((last, intermediates)) = segments.split_last() else {
            return Ok(());
        };

        let mut parent = self.output.root();
        let mut built = String::new();
        for segment in intermediates {
            built = format!("{built}{PATH_SEPARATOR}{segment}");
            let kind = if let Some(kind) = self.known_kind(&built) {
                kind
            } else {
                self.diagnostics.push(
                    Diagnostic::warning(
                        "inflate-unknown-scope",
                        format!("can't infer scope kind for `{segment}`, defaulted to namespace"),
                    )
                    .with_loc(tree.node(node).loc.clone()),
                );
                ScopeKind::Namespace
            };
            let mut stub = Scope::namespace(*segment);
            stub.kind = kind;
            parent = self.output.push(parent, stub)?;
        }

        let copy = self.output.deep_copy_from(tree, node);
        match &mut self.output.node_mut(copy).kind {
            NodeKind::Scope(scope) => scope.name = (*last).to_owned(),
            NodeKind::Const(constant) => constant.name = (*last).to_owned(),
            _ => {}
        }
        self.output.append(parent, copy)
    }
}

impl Visitor for Inflater<'_> {
    fn visit(&mut self, tree: &Tree, node: NodeId) -> Result<(), StructuralError> {
        match &tree.node(node).kind {
            NodeKind::Scope(scope) => match scope.kind {
                ScopeKind::Root | ScopeKind::Group(_) => self.visit_all(tree, tree.body(node)),
                ScopeKind::Namespace | ScopeKind::Type { .. } => {
                    self.inflate_path(tree, node, &scope.name)
                }
                ScopeKind::Singleton => {
                    let copy = self.output.deep_copy_from(tree, node);
                    self.output.append(self.output.root(), copy)
                }
            },
            NodeKind::Const(constant) => self.inflate_path(tree, node, &constant.name),
            NodeKind::Method(_) | NodeKind::Attr(_) | NodeKind::Directive(_) | NodeKind::Sig(_) => {
                let copy = self.output.deep_copy_from(tree, node);
                self.output.append(self.output.root(), copy)
            }
        }
    }
}
