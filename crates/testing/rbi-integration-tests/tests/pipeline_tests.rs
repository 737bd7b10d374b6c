//! Driver runs over several inputs

use anyhow::Result;
use expect_test::expect;
use rbi_diagnostics::{Severity, render_diagnostics};
use rbi_driver::{Config, Pipeline};
use rbi_integration_tests::library;
use rbi_span::{Loc, Pos};
use rbi_tree::{Directive, Method, Node, Scope, Sig, Tree};

fn extension() -> Result<Tree> {
    let mut tree = Tree::new();
    let shop = tree.push(tree.root(), Scope::namespace("Shop"))?;
    let item = tree.push(shop, Scope::class_with_superclass("Item", "Base"))?;
    tree.push(item, Sig::returns("T::Boolean"))?;
    tree.push(item, Method::new("available?"))?;
    tree.push(item, Method::new("price"))?;
    let loc = Loc::new(Pos::new(5, 4), Pos::new(5, 20)).with_file("extension.rbi");
    tree.push(item, Node::new(Directive::new("define_method", &[":dynamic"])).with_loc(loc))?;
    Ok(tree)
}

#[test]
fn test_default_pipeline() -> Result<()> {
    let output = Pipeline::new(Config::default()).run(vec![library()?, extension()?])?;

    let messages: Vec<_> = output
        .diagnostics
        .iter()
        .map(|diagnostic| (diagnostic.severity, diagnostic.message.as_str()))
        .collect();
    assert_eq!(
        messages,
        vec![(
            Severity::Error,
            "`define_method` is not allowed in an interface file"
        )]
    );
    assert!(output.text.contains("sig { returns(T::Boolean) }\n    def available?; end"));
    assert_eq!(output.text.matches("def price").count(), 1);
    Ok(())
}

#[test]
fn test_configured_pipeline() -> Result<()> {
    let config = Config::from_toml_str(
        r#"
        [merge]
        strict = true

        [pipeline]
        group = true
        sort = true

        [validate]
        disallowed = false
        "#,
    )?;
    let output = Pipeline::new(config).run(vec![library()?, extension()?])?;

    let codes: Vec<_> = output
        .diagnostics
        .iter()
        .map(|diagnostic| diagnostic.code.as_str())
        .collect();
    assert_eq!(codes, vec!["merge-conflict"]);

    expect![[r#"
        # Storefront domain
        module ::Shop
          class ::Shop::Item < Base
            include Comparable

            class << self
              sig { returns(Item) }
              def build; end
            end

            TAX = 0.2

            sig { returns(String) }
            attr_reader :name

            sig { returns(T::Boolean) }
            def available?; end

            sig { params(currency: Symbol).returns(Integer) }
            def price(currency); end

            define_method :dynamic
          end

          module ::Shop::Util
            abstract!

            sig { void }
            def self.helper; end
          end

          VERSION = "1.0"
        end
    "#]]
    .assert_eq(&output.text);
    Ok(())
}

#[test]
fn test_rendered_report() -> Result<()> {
    let source = "module Shop\n  class Item < Base\n    sig { returns(T::Boolean) }\n    def available?; end\n    define_method :dynamic\n  end\nend\n";
    let output = Pipeline::new(Config::default()).run(vec![extension()?])?;

    let rendered = render_diagnostics("extension.rbi", source, &output.diagnostics, 1)?;
    assert!(rendered.contains("error[disallowed-construct]"));
    assert!(rendered.contains("define_method :dynamic"));
    assert!(output.has_errors());
    Ok(())
}
