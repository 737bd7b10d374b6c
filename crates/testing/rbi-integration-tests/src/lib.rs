//! Shared fixtures for the cross-crate tests in `tests/`

use rbi_index::Index;
use rbi_tree::{
    Attr, AttrKind, Const, Directive, Method, Node, NodeId, Param, Scope, Sig, StructuralError,
    Tree,
};
use std::collections::BTreeSet;

/// Every index key of `tree`
pub fn key_set(tree: &Tree) -> BTreeSet<String> {
    Index::build(&[tree]).keys().map(str::to_owned).collect()
}

/// Body order of every node, in pre-order
pub fn body_orders(tree: &Tree) -> Vec<Vec<NodeId>> {
    tree.descendants(tree.root())
        .into_iter()
        .map(|node| tree.body(node).to_vec())
        .collect()
}

/// A small library: nested scopes, a singleton, typed attributes and a
/// handful of directives.
///
/// # Errors
///
/// Only fails if the tree builder API itself is broken.
pub fn library() -> Result<Tree, StructuralError> {
    let mut tree = Tree::new();
    let shop = tree.push(
        tree.root(),
        Node::new(Scope::namespace("Shop")).with_comment("Storefront domain"),
    )?;
    tree.push(shop, Const::new("VERSION", Some("\"1.0\"")))?;

    let item = tree.push(shop, Scope::class_with_superclass("Item", "Base"))?;
    tree.push(item, Directive::include("Comparable"))?;
    tree.push(item, Attr::new(AttrKind::Reader, &["name"], Some("String")))?;
    tree.push(
        item,
        Method::new("price")
            .with_param(Param::required("currency").with_type("Symbol"))
            .with_sig(Sig::returns("Integer").with_param("currency", Some("Symbol".into()))),
    )?;
    tree.push(item, Const::new("TAX", Some("0.2")))?;
    let singleton = tree.push(item, Scope::singleton())?;
    tree.push(singleton, Method::new("build").with_sig(Sig::returns("Item")))?;

    let util = tree.push(shop, Scope::namespace("Util"))?;
    tree.push(util, Directive::new("abstract!", &[]))?;
    tree.push(util, Method::singleton("helper").with_sig(Sig::void()))?;
    Ok(tree)
}
