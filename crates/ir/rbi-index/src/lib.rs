//! Qualified-name index over declaration trees
//!
//! Maps an index key (what a node declares) to every node that declares it,
//! in traversal order. Several entries per key are expected: a namespace
//! reopened in two files contributes twice.

use indexmap::IndexMap;
use rbi_tree::{
    AttrKind, NodeId, NodeKind, PATH_SEPARATOR, ScopeKind, StructuralError, Tree, Visitor,
};

/// Position of a tree among the trees an index was built from
pub type TreeIdx = usize;

/// A node contributing to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entry {
    /// Which input tree
    pub tree: TreeIdx,
    /// Node inside that tree
    pub node: NodeId,
}

/// Key → ordered definitions
#[derive(Debug, Clone, Default)]
pub struct Index {
    entries: IndexMap<String, Vec<Entry>>,
}

impl Index {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index over several trees; entry `tree` fields are positions
    /// in `trees`.
    pub fn build(trees: &[&Tree]) -> Self {
        let mut index = Self::new();
        for (position, tree) in trees.iter().enumerate() {
            index.index_tree(position, tree);
        }
        tracing::debug!(trees = trees.len(), keys = index.len(), "built index");
        index
    }

    /// Index every node of `tree` under the given position
    pub fn index_tree(&mut self, position: TreeIdx, tree: &Tree) {
        let mut visitor = IndexVisitor {
            index: self,
            position,
        };
        if let Err(error) = visitor.visit(tree, tree.root()) {
            tracing::error!(%error, "indexing stopped early");
        }
    }

    /// Record one definition; usable mid-traversal by passes that grow a tree
    pub fn insert(&mut self, key: String, entry: Entry) {
        self.entries.entry(key).or_default().push(entry);
    }

    /// Record a node under all of its keys
    pub fn insert_node(&mut self, tree: &Tree, position: TreeIdx, node: NodeId) {
        for key in index_keys(tree, node) {
            self.insert(key, Entry { tree: position, node });
        }
    }

    /// Definitions of `key`
    pub fn get(&self, key: &str) -> &[Entry] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether `key` has at least one definition
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Keys in first-insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Keys and their definitions in first-insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Entry])> {
        self.entries
            .iter()
            .map(|(key, entries)| (key.as_str(), entries.as_slice()))
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no key was indexed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Keys under which `node` is indexed.
///
/// The root, group wrappers and bare signatures have none.
pub fn index_keys(tree: &Tree, node: NodeId) -> Vec<String> {
    let enclosing = || tree.enclosing_name(node);
    match &tree.node(node).kind {
        NodeKind::Scope(scope) => match scope.kind {
            ScopeKind::Root | ScopeKind::Group(_) => Vec::new(),
            _ => vec![tree.qualified_name(node)],
        },
        NodeKind::Const(constant) => vec![const_key(&enclosing(), &constant.name)],
        NodeKind::Method(method) => {
            let separator = if method.is_singleton { PATH_SEPARATOR } else { "#" };
            vec![format!("{}{separator}{}", enclosing(), method.name)]
        }
        NodeKind::Attr(attr) => {
            let enclosing = enclosing();
            attr.names
                .iter()
                .flat_map(|name| {
                    let reader = format!("{enclosing}#{name}");
                    let writer = format!("{enclosing}#{name}=");
                    match attr.kind {
                        AttrKind::Reader => vec![reader],
                        AttrKind::Writer => vec![writer],
                        AttrKind::Accessor => vec![reader, writer],
                    }
                })
                .collect()
        }
        NodeKind::Directive(directive) => {
            vec![format!("{}.{}", enclosing(), directive.display_name())]
        }
        NodeKind::Sig(_) => Vec::new(),
    }
}

/// Key of a constant named `name` inside `enclosing`.
///
/// An absolute name `::A::C` keys as `::A.C`, the same key the nested
/// form produces.
pub fn const_key(enclosing: &str, name: &str) -> String {
    if name.starts_with(PATH_SEPARATOR) {
        let (qualifier, bare) = name
            .rsplit_once(PATH_SEPARATOR)
            .unwrap_or(("", name));
        return format!("{qualifier}.{bare}");
    }
    format!("{enclosing}.{name}")
}

struct IndexVisitor<'index> {
    index: &'index mut Index,
    position: TreeIdx,
}

impl Visitor for IndexVisitor<'_> {
    fn visit(&mut self, tree: &Tree, node: NodeId) -> Result<(), StructuralError> {
        match &tree.node(node).kind {
            NodeKind::Scope(_) => {
                self.index.insert_node(tree, self.position, node);
                self.visit_all(tree, tree.body(node))
            }
            NodeKind::Const(_)
            | NodeKind::Method(_)
            | NodeKind::Attr(_)
            | NodeKind::Directive(_)
            | NodeKind::Sig(_) => {
                self.index.insert_node(tree, self.position, node);
                Ok(())
            }
        }
    }
}
