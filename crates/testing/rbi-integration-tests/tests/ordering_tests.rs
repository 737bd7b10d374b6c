//! Group and sort over realistic trees

use anyhow::Result;
use expect_test::expect;
use rbi_integration_tests::{body_orders, key_set, library};
use rbi_printer::print;
use rbi_rewrite::{group, group_kind, sort};
use rbi_tree::{Const, Directive, GroupKind, Method, NodeId, Scope, Tree};

#[test]
fn test_sort_example_bucket_order() -> Result<()> {
    let mut tree = Tree::new();
    let a = tree.push(tree.root(), Scope::class("A"))?;
    tree.push(a, Method::new("run"))?;
    tree.push(a, Const::new("LIMIT", Some("3")))?;
    tree.push(a, Scope::namespace("Inner"))?;
    tree.push(a, Directive::include("Mixin"))?;

    sort(&mut tree)?;
    expect![[r#"
        class ::A
          include Mixin
          module ::A::Inner; end
          LIMIT = 3
          def run; end
        end
    "#]]
    .assert_eq(&print(&tree));
    Ok(())
}

#[test]
fn test_sort_is_idempotent() -> Result<()> {
    let mut tree = library()?;
    sort(&mut tree)?;
    let orders = body_orders(&tree);
    let text = print(&tree);

    sort(&mut tree)?;
    assert_eq!(body_orders(&tree), orders);
    assert_eq!(print(&tree), text);
    Ok(())
}

#[test]
fn test_sort_keeps_keys() -> Result<()> {
    let original = library()?;
    let mut sorted = original.clone();
    sort(&mut sorted)?;
    assert_eq!(key_set(&sorted), key_set(&original));
    Ok(())
}

#[test]
fn test_group_partition_preserves_every_body() -> Result<()> {
    let original = library()?;
    let mut grouped = original.clone();
    group(&mut grouped)?;

    for node in original.descendants(original.root()) {
        let before = original.body(node);
        if before.is_empty() {
            continue;
        }
        let mut expected: Vec<NodeId> = Vec::new();
        for kind in GroupKind::ALL {
            for &child in before {
                if group_kind(&original, child)? == kind {
                    expected.push(child);
                }
            }
        }
        let after: Vec<NodeId> = grouped
            .body(node)
            .iter()
            .flat_map(|&wrapper| grouped.body(wrapper).iter().copied())
            .collect();
        assert_eq!(after, expected);
    }
    assert_eq!(key_set(&grouped), key_set(&original));
    Ok(())
}

#[test]
fn test_grouped_library() -> Result<()> {
    let mut tree = library()?;
    group(&mut tree)?;
    expect![[r#"
        # Storefront domain
        module Shop
          class Item < Base
            include Comparable

            class << self
              sig { returns(Item) }
              def build; end
            end

            TAX = 0.2

            sig { returns(String) }
            attr_reader :name

            sig { params(currency: Symbol).returns(Integer) }
            def price(currency); end
          end

          module Util
            abstract!

            sig { void }
            def self.helper; end
          end

          VERSION = "1.0"
        end
    "#]]
    .assert_eq(&print(&tree));
    Ok(())
}
