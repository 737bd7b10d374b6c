//! Canonical printer for declaration trees
//!
//! Output is deterministic for a given tree and never reorders anything:
//! ordering belongs to the tree. Two spaces of indentation per nesting
//! level, one statement per line, and a trailing newline after the last
//! statement.

use rbi_tree::{
    Attr, Const, Directive, Method, Node, NodeId, NodeKind, Param, ParamKind, Scope, ScopeKind,
    Sig, Tree, UNTYPED,
};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Write};

/// Value printed for a constant without a value expression
pub const UNKNOWN_CONST_VALUE: &str = "T.let(T.unsafe(nil), T.untyped)";

/// Printer settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterConfig {
    /// Starting indentation level
    pub indent: usize,
    /// Print a `# loc: file:line:col-line:col` comment before located nodes
    pub print_locs: bool,
}

/// Print a whole tree with default settings
pub fn print(tree: &Tree) -> String {
    Printed::new(tree, &PrinterConfig::default()).to_string()
}

/// Print a whole tree
pub fn print_with(tree: &Tree, config: &PrinterConfig) -> String {
    Printed::new(tree, config).to_string()
}

/// Print a single node (and its body) at indentation zero
pub fn print_node(tree: &Tree, node: NodeId) -> String {
    let config = PrinterConfig::default();
    Printed {
        tree,
        node,
        config: &config,
    }
    .to_string()
}

/// Render a signature on one line, e.g. `sig { params(a: Integer).void }`
pub fn format_sig(sig: &Sig) -> String {
    let mut clauses = Vec::new();
    if sig.is_abstract {
        clauses.push("abstract".to_owned());
    }
    if sig.is_override {
        clauses.push("override".to_owned());
    }
    if sig.is_overridable {
        clauses.push("overridable".to_owned());
    }
    if !sig.params.is_empty() {
        let params: Vec<String> = sig
            .params
            .iter()
            .map(|param| format!("{}: {}", param.name, param.ty.as_deref().unwrap_or(UNTYPED)))
            .collect();
        clauses.push(format!("params({})", params.join(", ")));
    }
    clauses.push(match &sig.returns {
        Some(ty) => format!("returns({ty})"),
        None => "void".to_owned(),
    });
    format!("sig {{ {} }}", clauses.join("."))
}

/// Render a parameter as it appears in a `def` header
pub fn format_param(param: &Param) -> String {
    match &param.kind {
        ParamKind::Required => param.name.clone(),
        ParamKind::Optional { default } => format!("{} = {default}", param.name),
        ParamKind::Rest => format!("*{}", param.name),
        ParamKind::KeyRequired => format!("{}:", param.name),
        ParamKind::KeyOptional { default } => format!("{}: {default}", param.name),
        ParamKind::KeyRest => format!("**{}", param.name),
        ParamKind::Block => format!("&{}", param.name),
    }
}

/// Display adapter printing a tree (or subtree)
pub struct Printed<'tree> {
    tree: &'tree Tree,
    node: NodeId,
    config: &'tree PrinterConfig,
}

impl<'tree> Printed<'tree> {
    /// Print `tree` from its root
    pub fn new(tree: &'tree Tree, config: &'tree PrinterConfig) -> Self {
        Self {
            tree,
            node: tree.root(),
            config,
        }
    }
}

impl Display for Printed<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut printer = Printer {
            tree: self.tree,
            config: self.config,
            out: NestedWriter {
                writer: f,
                depth: self.config.indent,
            },
        };
        printer.print_node(self.node)
    }
}

/// Whether a node prints as a single line.
///
/// Anything with a non-empty body, an attached signature or attached
/// comments is a block and gets separated by blank lines.
pub fn is_oneline(tree: &Tree, node: NodeId) -> bool {
    let data = tree.node(node);
    if !data.comments.is_empty() {
        return false;
    }
    match &data.kind {
        NodeKind::Scope(scope) => scope.body().is_empty(),
        NodeKind::Method(method) => method.sigs.is_empty(),
        NodeKind::Attr(attr) => attr.sigs.is_empty(),
        NodeKind::Const(_) | NodeKind::Directive(_) | NodeKind::Sig(_) => true,
    }
}

struct Printer<'tree, W> {
    tree: &'tree Tree,
    config: &'tree PrinterConfig,
    out: NestedWriter<W>,
}

impl<W: Write> Printer<'_, W> {
    fn print_body(&mut self, nodes: &[NodeId]) -> fmt::Result {
        let mut previous_block = false;
        for (position, &node) in nodes.iter().enumerate() {
            let block = !is_oneline(self.tree, node);
            if position > 0 && (block || previous_block) {
                self.out.blank()?;
            }
            self.print_node(node)?;
            previous_block = block;
        }
        Ok(())
    }

    fn print_node(&mut self, id: NodeId) -> fmt::Result {
        let node = self.tree.node(id);
        self.print_header_comments(node)?;
        match &node.kind {
            NodeKind::Scope(scope) => self.print_scope(scope),
            NodeKind::Const(constant) => self.print_const(constant),
            NodeKind::Method(method) => self.print_method(method),
            NodeKind::Attr(attr) => self.print_attr(attr),
            NodeKind::Directive(directive) => self.print_directive(directive),
            NodeKind::Sig(sig) => self.out.line(&format_sig(sig)),
        }
    }

    fn print_header_comments(&mut self, node: &Node) -> fmt::Result {
        if self.config.print_locs {
            if let Some(loc) = &node.loc {
                self.out.line(&format!("# loc: {loc}"))?;
            }
        }
        for comment in &node.comments {
            if comment.text.is_empty() {
                self.out.line("#")?;
            } else {
                self.out.line(&format!("# {}", comment.text))?;
            }
        }
        Ok(())
    }

    fn print_scope(&mut self, scope: &Scope) -> fmt::Result {
        let header = match &scope.kind {
            ScopeKind::Root | ScopeKind::Group(_) => return self.print_body(scope.body()),
            ScopeKind::Namespace => format!("module {}", scope.name),
            ScopeKind::Type {
                superclass: Some(superclass),
            } => format!("class {} < {superclass}", scope.name),
            ScopeKind::Type { superclass: None } => format!("class {}", scope.name),
            ScopeKind::Singleton => "class << self".to_owned(),
        };

        if scope.body().is_empty() {
            return self.out.line(&format!("{header}; end"));
        }

        self.out.line(&header)?;
        self.out.depth += 1;
        self.print_body(scope.body())?;
        self.out.depth -= 1;
        self.out.line("end")
    }

    fn print_const(&mut self, constant: &Const) -> fmt::Result {
        let value = constant.value.as_deref().unwrap_or(UNKNOWN_CONST_VALUE);
        self.out.line(&format!("{} = {value}", constant.name))
    }

    fn print_method(&mut self, method: &Method) -> fmt::Result {
        for sig in &method.sigs {
            self.out.line(&format_sig(sig))?;
        }
        let receiver = if method.is_singleton { "self." } else { "" };
        let mut header = format!("def {receiver}{}", method.name);
        if !method.params.is_empty() {
            let params: Vec<String> = method.params.iter().map(format_param).collect();
            write!(header, "({})", params.join(", "))?;
        }
        self.out.line(&format!("{header}; end"))
    }

    fn print_attr(&mut self, attr: &Attr) -> fmt::Result {
        for sig in &attr.sigs {
            self.out.line(&format_sig(sig))?;
        }
        let names: Vec<String> = attr.names.iter().map(|name| format!(":{name}")).collect();
        self.out
            .line(&format!("{} {}", attr.kind.keyword(), names.join(", ")))
    }

    fn print_directive(&mut self, directive: &Directive) -> fmt::Result {
        if directive.args.is_empty() {
            self.out.line(&directive.method)
        } else {
            self.out
                .line(&format!("{} {}", directive.method, directive.args.join(", ")))
        }
    }
}

/// Writer tracking the current nesting depth
struct NestedWriter<W> {
    writer: W,
    depth: usize,
}

impl<W: Write> NestedWriter<W> {
    fn line(&mut self, text: &str) -> fmt::Result {
        for _ in 0..self.depth {
            self.writer.write_str("  ")?;
        }
        self.writer.write_str(text)?;
        self.writer.write_char('\n')
    }

    fn blank(&mut self) -> fmt::Result {
        self.writer.write_char('\n')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;
    use rbi_span::{Loc, Pos};
    use rbi_tree::{AttrKind, Scope};

    #[test]
    fn test_empty_tree() {
        assert_eq!(print(&Tree::new()), "");
    }

    #[test]
    fn test_scopes() {
        let mut tree = Tree::new();
        let a = tree.push(tree.root(), Scope::namespace("A")).unwrap();
        tree.push(a, Scope::class_with_superclass("B", "Base")).unwrap();
        let c = tree.push(a, Scope::class("C")).unwrap();
        tree.push(c, Directive::new("abstract!", &[])).unwrap();
        let singleton = tree.push(c, Scope::singleton()).unwrap();
        tree.push(singleton, Method::new("foo")).unwrap();

        expect![[r#"
            module A
              class B < Base; end

              class C
                abstract!

                class << self
                  def foo; end
                end
              end
            end
        "#]]
        .assert_eq(&print(&tree));
    }

    #[test]
    fn test_oneline_runs_have_no_blank_lines() {
        let mut tree = Tree::new();
        let root = tree.root();
        tree.push(root, Directive::include("Foo")).unwrap();
        tree.push(root, Const::new("A", Some("1"))).unwrap();
        tree.push(root, Const::new("B", None)).unwrap();
        tree.push(root, Attr::new(AttrKind::Reader, &["a", "b"], None)).unwrap();
        tree.push(root, Method::singleton("bar")).unwrap();

        expect![[r#"
            include Foo
            A = 1
            B = T.let(T.unsafe(nil), T.untyped)
            attr_reader :a, :b
            def self.bar; end
        "#]]
        .assert_eq(&print(&tree));
    }

    #[test]
    fn test_method_params_and_sigs() {
        let mut tree = Tree::new();
        let method = Method::new("foo")
            .with_param(Param::required("a").with_type("Integer"))
            .with_param(Param::new(ParamKind::Optional { default: "1".into() }, "b"))
            .with_param(Param::new(ParamKind::Rest, "c"))
            .with_param(Param::new(ParamKind::KeyRequired, "d"))
            .with_param(Param::new(ParamKind::KeyOptional { default: "nil".into() }, "e"))
            .with_param(Param::new(ParamKind::KeyRest, "f"))
            .with_param(Param::new(ParamKind::Block, "g"))
            .with_sig(
                Sig::returns("String")
                    .with_param("a", Some("Integer".into()))
                    .with_param("b", None),
            )
            .with_sig(Sig::void().abstract_());
        tree.push(tree.root(), method).unwrap();
        tree.push(tree.root(), Method::new("bar")).unwrap();

        expect![[r#"
            sig { params(a: Integer, b: T.untyped).returns(String) }
            sig { abstract.void }
            def foo(a, b = 1, *c, d:, e: nil, **f, &g); end

            def bar; end
        "#]]
        .assert_eq(&print(&tree));
    }

    #[test]
    fn test_typed_attr_prints_derived_sig() {
        let mut tree = Tree::new();
        tree.push(tree.root(), Attr::new(AttrKind::Writer, &["name"], Some("String")))
            .unwrap();

        expect![[r#"
            sig { params(name: String).returns(String) }
            attr_writer :name
        "#]]
        .assert_eq(&print(&tree));
    }

    #[test]
    fn test_comments_and_locs() {
        let mut tree = Tree::new();
        let node = Node::new(Scope::namespace("A"))
            .with_comment("Documented")
            .with_comment("")
            .with_loc(Loc::new(Pos::new(1, 0), Pos::new(2, 3)).with_file("a.rbi"));
        tree.push(tree.root(), node).unwrap();

        let config = PrinterConfig {
            indent: 1,
            print_locs: true,
        };
        assert_eq!(
            print_with(&tree, &config),
            "  # loc: a.rbi:1:0-2:3\n  # Documented\n  #\n  module A; end\n"
        );
    }

    #[test]
    fn test_group_prints_blank_line_separated_runs() {
        let mut tree = Tree::new();
        let a = tree.push(tree.root(), Scope::class("A")).unwrap();
        let mixins = tree.push(a, Scope::group(rbi_tree::GroupKind::Mixins)).unwrap();
        tree.push(mixins, Directive::include("X")).unwrap();
        tree.push(mixins, Directive::include("Y")).unwrap();
        let methods = tree.push(a, Scope::group(rbi_tree::GroupKind::Methods)).unwrap();
        tree.push(methods, Method::new("a")).unwrap();
        tree.push(methods, Method::new("b")).unwrap();

        expect![[r#"
            class A
              include X
              include Y

              def a; end
              def b; end
            end
        "#]]
        .assert_eq(&print(&tree));
    }

    #[test]
    fn test_print_is_idempotent() {
        let mut tree = Tree::new();
        let a = tree.push(tree.root(), Scope::namespace("A")).unwrap();
        tree.push(a, Method::new("foo").with_sig(Sig::void())).unwrap();

        assert_eq!(print(&tree), print(&tree));
    }

    #[test]
    fn test_format_sig_modifiers() {
        let sig = Sig {
            is_override: true,
            is_overridable: true,
            ..Sig::returns("Integer")
        };
        assert_eq!(format_sig(&sig), "sig { override.overridable.returns(Integer) }");
    }

    #[test]
    fn test_print_node() {
        let mut tree = Tree::new();
        let a = tree.push(tree.root(), Scope::namespace("A")).unwrap();
        tree.push(a, Directive::new("interface!", &[])).unwrap();

        assert_eq!(print_node(&tree, a), "module A\n  interface!\nend\n");
    }
}
