//! Merge several trees into one
//!
//! Scopes declaring the same key are reused rather than duplicated; leaf
//! declarations are kept on first occurrence and later duplicates dropped.
//! An attribute whose keys are only partly taken is narrowed to the free
//! ones. A run of bare signatures shares the fate of the leaf it precedes.

use crate::ScopeStack;
use rbi_diagnostics::Diagnostic;
use rbi_index::{Index, index_keys};
use rbi_printer::print_node;
use rbi_tree::{
    Attr, AttrKind, Node, NodeId, NodeKind, ScopeKind, StructuralError, Tree, Visitor,
};
use serde::{Deserialize, Serialize};

/// Merge behaviour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    /// Warn when a dropped duplicate differs from the kept definition
    pub strict: bool,
}

/// Result of a merge
#[derive(Debug)]
pub struct Merged {
    /// Merged tree
    pub tree: Tree,
    /// Conflicts reported in strict mode
    pub diagnostics: Vec<Diagnostic>,
}

/// Merge `trees` left to right with default options
///
/// # Errors
///
/// Returns a `StructuralError` if the destination stack gets out of sync.
pub fn merge(trees: &[&Tree]) -> Result<Tree, StructuralError> {
    merge_with(trees, MergeOptions::default()).map(|merged| merged.tree)
}

/// Merge `trees` left to right
///
/// # Errors
///
/// Returns a `StructuralError` if the destination stack gets out of sync.
pub fn merge_with(trees: &[&Tree], options: MergeOptions) -> Result<Merged, StructuralError> {
    let output = Tree::new();
    let mut merger = Merger {
        stack: ScopeStack::seeded(output.root()),
        output,
        index: Index::new(),
        options,
        diagnostics: Vec::new(),
        pending: Vec::new(),
        dropped: 0,
    };

    for tree in trees {
        merger.visit(tree, tree.root())?;
    }

    tracing::debug!(
        inputs = trees.len(),
        dropped = merger.dropped,
        conflicts = merger.diagnostics.len(),
        "merged trees"
    );

    Ok(Merged {
        tree: merger.output,
        diagnostics: merger.diagnostics,
    })
}

struct Merger {
    output: Tree,
    index: Index,
    stack: ScopeStack,
    options: MergeOptions,
    diagnostics: Vec<Diagnostic>,
    /// Bare signatures of the current input waiting for their leaf
    pending: Vec<NodeId>,
    dropped: usize,
}

impl Merger {
    /// Existing destination scope declared under `key`
    fn existing_scope(&self, key: &str) -> Option<NodeId> {
        self.index
            .get(key)
            .iter()
            .map(|entry| entry.node)
            .find(|&node| {
                self.output
                    .scope(node)
                    .is_some_and(|scope| scope.is_named())
            })
    }

    /// Emit the pending bare signatures at the current destination
    fn flush_pending(&mut self, tree: &Tree) -> Result<(), StructuralError> {
        for sig in std::mem::take(&mut self.pending) {
            let copy = self.output.structural_copy_from(tree, sig);
            self.output.append(self.stack.top()?, copy)?;
        }
        Ok(())
    }

    /// Append `node` at the current destination and index it
    fn emit(&mut self, node: Node) -> Result<(), StructuralError> {
        let copy = self.output.alloc(node);
        self.output.append(self.stack.top()?, copy)?;
        self.index.insert_node(&self.output, 0, copy);
        Ok(())
    }

    fn merge_scope(&mut self, tree: &Tree, node: NodeId) -> Result<(), StructuralError> {
        self.flush_pending(tree)?;
        let key = tree.qualified_name(node);
        let destination = if let Some(existing) = self.existing_scope(&key) {
            let incoming = &tree.node(node).comments;
            let comments = &mut self.output.node_mut(existing).comments;
            for comment in incoming {
                if !comments.contains(comment) {
                    comments.push(comment.clone());
                }
            }
            existing
        } else {
            let copy = self.output.structural_copy_from(tree, node);
            self.output.append(self.stack.top()?, copy)?;
            self.index.insert_node(&self.output, 0, copy);
            copy
        };

        self.stack.push(destination);
        self.visit_all(tree, tree.body(node))?;
        self.flush_pending(tree)?;
        self.stack.pop(destination, &self.output)
    }

    fn merge_leaf(&mut self, tree: &Tree, node: NodeId) -> Result<(), StructuralError> {
        let keys = index_keys(tree, node);
        let taken = keys.iter().filter(|key| self.index.contains(key)).count();

        if taken == 0 {
            self.flush_pending(tree)?;
            return self.emit(tree.node(node).detached_copy());
        }

        if taken < keys.len() {
            if let NodeKind::Attr(attr) = &tree.node(node).kind {
                let parts = narrow_attr(attr, &tree.enclosing_name(node), &self.index);
                self.flush_pending(tree)?;
                for (position, part) in parts.into_iter().enumerate() {
                    let mut narrowed = tree.node(node).detached_copy();
                    narrowed.kind = NodeKind::Attr(part);
                    if position > 0 {
                        narrowed.comments.clear();
                    }
                    self.emit(narrowed)?;
                }
                return Ok(());
            }
        }

        self.pending.clear();
        self.dropped += 1;
        if self.options.strict {
            if let Some(kept) = keys
                .iter()
                .find_map(|key| self.index.get(key).first().map(|entry| (key, entry.node)))
            {
                self.report_conflict(tree, node, kept);
            }
        }
        Ok(())
    }

    fn report_conflict(&mut self, tree: &Tree, dropped: NodeId, (key, kept): (&String, NodeId)) {
        if print_node(tree, dropped) == print_node(&self.output, kept) {
            return;
        }
        let mut diagnostic = Diagnostic::warning(
            "merge-conflict",
            format!("conflicting definitions for `{key}`, keeping the first one"),
        )
        .with_loc(tree.node(dropped).loc.clone());
        if let Some(loc) = self.output.node(kept).loc.clone() {
            diagnostic = diagnostic.with_related(loc);
        }
        self.diagnostics.push(diagnostic);
    }
}

impl Visitor for Merger {
    fn visit(&mut self, tree: &Tree, node: NodeId) -> Result<(), StructuralError> {
        match &tree.node(node).kind {
            NodeKind::Scope(scope) => match scope.kind {
                ScopeKind::Root => {
                    self.visit_all(tree, tree.body(node))?;
                    self.flush_pending(tree)
                }
                ScopeKind::Group(_) => self.visit_all(tree, tree.body(node)),
                ScopeKind::Namespace | ScopeKind::Type { .. } | ScopeKind::Singleton => {
                    self.merge_scope(tree, node)
                }
            },
            NodeKind::Const(_) | NodeKind::Method(_) | NodeKind::Attr(_) | NodeKind::Directive(_) => {
                self.merge_leaf(tree, node)
            }
            NodeKind::Sig(_) => {
                self.pending.push(node);
                Ok(())
            }
        }
    }
}

/// Split `attr` into attributes declaring only the keys not yet in `index`.
///
/// An accessor whose reader is taken becomes a writer and the other way
/// around. Consecutive names left with the same kind stay together. A
/// signature derived from the declared type is rederived for the new kind.
fn narrow_attr(attr: &Attr, enclosing: &str, index: &Index) -> Vec<Attr> {
    let only_derived = attr.sigs.len() == 1 && attr.sigs.first() == attr.derived_sig().as_ref();
    let reads = matches!(attr.kind, AttrKind::Reader | AttrKind::Accessor);
    let writes = matches!(attr.kind, AttrKind::Writer | AttrKind::Accessor);

    let mut parts: Vec<Attr> = Vec::new();
    for name in &attr.names {
        let reader = reads && !index.contains(&format!("{enclosing}#{name}"));
        let writer = writes && !index.contains(&format!("{enclosing}#{name}="));
        let kind = match (reader, writer) {
            (true, true) => AttrKind::Accessor,
            (true, false) => AttrKind::Reader,
            (false, true) => AttrKind::Writer,
            (false, false) => continue,
        };
        match parts.last_mut() {
            Some(last) if last.kind == kind => last.names.push(name.clone()),
            _ => parts.push(Attr {
                kind,
                names: vec![name.clone()],
                ty: attr.ty.clone(),
                sigs: Vec::new(),
            }),
        }
    }

    for part in &mut parts {
        part.sigs = if only_derived {
            part.derived_sig().into_iter().collect()
        } else {
            attr.sigs.clone()
        };
    }
    parts
}
