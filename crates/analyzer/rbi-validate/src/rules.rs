//! Built-in validation rules

use crate::{ValidationContext, ValidationRule};
use rbi_diagnostics::Diagnostic;
use rbi_index::Index;
use rbi_rewrite::canonical_name;
use rbi_tree::visitor::snapshot;
use rbi_tree::{NodeId, NodeKind, ScopeKind, StructuralError, Tree, Visitor, VisitorMut};
use rustc_hash::FxHashSet;

/// Calls that have no place in an interface file
pub const DEFAULT_DENIED: [&str; 8] = [
    "require",
    "require_relative",
    "load",
    "define_method",
    "class_eval",
    "module_eval",
    "instance_eval",
    "instance_variable_set",
];

/// Pre-order walk collecting one optional finding per node
struct Walk<F> {
    check: F,
    found: Vec<Diagnostic>,
}

impl<F: FnMut(&Tree, NodeId) -> Option<Diagnostic>> Walk<F> {
    fn run(tree: &Tree, check: F) -> Result<Vec<Diagnostic>, StructuralError> {
        let mut walk = Self {
            check,
            found: Vec::new(),
        };
        walk.visit(tree, tree.root())?;
        Ok(walk.found)
    }
}

impl<F: FnMut(&Tree, NodeId) -> Option<Diagnostic>> Visitor for Walk<F> {
    fn visit(&mut self, tree: &Tree, node: NodeId) -> Result<(), StructuralError> {
        if let Some(diagnostic) = (self.check)(tree, node) {
            self.found.push(diagnostic);
        }
        self.visit_all(tree, tree.body(node))
    }
}

/// Rule: a key declared by more than one node.
///
/// Scope names are canonicalized while the index is built.
pub struct DuplicatesRule;

struct DuplicateIndexer {
    index: Index,
}

impl VisitorMut for DuplicateIndexer {
    fn visit(&mut self, tree: &mut Tree, node: NodeId) -> Result<(), StructuralError> {
        match &tree.node(node).kind {
            NodeKind::Scope(_) => {
                canonical_name(tree, node);
                self.index.insert_node(tree, 0, node);
                let children = snapshot(tree, node);
                self.visit_all(tree, &children)
            }
            NodeKind::Const(_)
            | NodeKind::Method(_)
            | NodeKind::Attr(_)
            | NodeKind::Directive(_)
            | NodeKind::Sig(_) => {
                self.index.insert_node(tree, 0, node);
                Ok(())
            }
        }
    }
}

impl ValidationRule for DuplicatesRule {
    fn name(&self) -> &str {
        "duplicate"
    }

    fn check(&self, ctx: &mut ValidationContext<'_>) -> Result<(), StructuralError> {
        let mut indexer = DuplicateIndexer {
            index: Index::new(),
        };
        let root = ctx.tree().root();
        indexer.visit(ctx.tree_mut(), root)?;

        let mut found = Vec::new();
        for (key, entries) in indexer.index.iter() {
            if entries.len() < 2 {
                continue;
            }
            let tree = ctx.tree();
            let mut diagnostic = Diagnostic::error(
                self.name(),
                format!("`{key}` is defined {} times", entries.len()),
            )
            .with_loc(tree.node(entries[1].node).loc.clone());
            for (position, entry) in entries.iter().enumerate() {
                if position == 1 {
                    continue;
                }
                if let Some(loc) = tree.node(entry.node).loc.clone() {
                    diagnostic = diagnostic.with_related(loc);
                }
            }
            found.push(diagnostic);
        }
        for diagnostic in found {
            ctx.report(diagnostic);
        }
        Ok(())
    }
}

/// Rule: every method and attribute carries a signature
pub struct SignatureCoverageRule;

impl ValidationRule for SignatureCoverageRule {
    fn name(&self) -> &str {
        "missing-sig"
    }

    fn check(&self, ctx: &mut ValidationContext<'_>) -> Result<(), StructuralError> {
        let found = Walk::run(ctx.tree(), |tree: &Tree, node: NodeId| {
            let unsigned = match &tree.node(node).kind {
                NodeKind::Method(method) => method.sigs.is_empty(),
                NodeKind::Attr(attr) => attr.sigs.is_empty(),
                NodeKind::Scope(_) | NodeKind::Const(_) | NodeKind::Directive(_) | NodeKind::Sig(_) => {
                    false
                }
            };
            unsigned.then(|| {
                Diagnostic::warning(self.name(), format!("`{}` has no signature", tree.describe(node)))
                    .with_loc(tree.node(node).loc.clone())
            })
        })?;
        for diagnostic in found {
            ctx.report(diagnostic);
        }
        Ok(())
    }
}

/// Rule: every named scope and declaration carries a comment
pub struct DocumentationCoverageRule;

impl ValidationRule for DocumentationCoverageRule {
    fn name(&self) -> &str {
        "missing-doc"
    }

    fn check(&self, ctx: &mut ValidationContext<'_>) -> Result<(), StructuralError> {
        let found = Walk::run(ctx.tree(), |tree: &Tree, node: NodeId| {
            let data = tree.node(node);
            let documentable = match &data.kind {
                NodeKind::Scope(scope) => {
                    matches!(scope.kind, ScopeKind::Namespace | ScopeKind::Type { .. })
                }
                NodeKind::Const(_) | NodeKind::Method(_) | NodeKind::Attr(_) => true,
                NodeKind::Directive(_) | NodeKind::Sig(_) => false,
            };
            (documentable && data.comments.is_empty()).then(|| {
                Diagnostic::warning(self.name(), format!("`{}` is not documented", tree.describe(node)))
                    .with_loc(data.loc.clone())
            })
        })?;
        for diagnostic in found {
            ctx.report(diagnostic);
        }
        Ok(())
    }
}

/// Rule: denied calls and signatures attached to nothing
#[derive(Debug, Clone)]
pub struct DisallowedConstructsRule {
    denied: FxHashSet<String>,
}

impl Default for DisallowedConstructsRule {
    fn default() -> Self {
        Self::from_names(DEFAULT_DENIED)
    }
}

impl DisallowedConstructsRule {
    /// Rule denying exactly `names`
    pub fn from_names<'name>(names: impl IntoIterator<Item = &'name str>) -> Self {
        Self {
            denied: names.into_iter().map(str::to_owned).collect(),
        }
    }

    /// Deny one more call
    #[must_use]
    pub fn with_denied(mut self, name: impl Into<String>) -> Self {
        self.denied.insert(name.into());
        self
    }

    /// Whether calls to `name` are denied
    pub fn is_denied(&self, name: &str) -> bool {
        self.denied.contains(name)
    }
}

impl ValidationRule for DisallowedConstructsRule {
    fn name(&self) -> &str {
        "disallowed-construct"
    }

    fn check(&self, ctx: &mut ValidationContext<'_>) -> Result<(), StructuralError> {
        let found = Walk::run(ctx.tree(), |tree: &Tree, node: NodeId| {
            let data = tree.node(node);
            let message = match &data.kind {
                NodeKind::Directive(directive) if self.is_denied(&directive.method) => {
                    format!("`{}` is not allowed in an interface file", directive.method)
                }
                NodeKind::Sig(_) => {
                    return Some(
                        Diagnostic::error(
                            "unattached-sig",
                            "signature is not attached to a method or attribute",
                        )
                        .with_loc(data.loc.clone()),
                    );
                }
                NodeKind::Directive(_)
                | NodeKind::Scope(_)
                | NodeKind::Const(_)
                | NodeKind::Method(_)
                | NodeKind::Attr(_) => return None,
            };
            Some(Diagnostic::error(self.name(), message).with_loc(data.loc.clone()))
        })?;
        for diagnostic in found {
            ctx.report(diagnostic);
        }
        Ok(())
    }
}
