//! Node kinds of the declaration tree

use crate::NodeId;
use rbi_span::Loc;
use serde::{Deserialize, Serialize};

/// Path separator and root marker for qualified names
pub const PATH_SEPARATOR: &str = "::";

/// Local name used for `class << self` when building qualified names
pub const SINGLETON_NAME: &str = "<self>";

/// Rendering of a missing declared type
pub const UNTYPED: &str = "T.untyped";

/// A node placed in a tree: its kind plus provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// What the node declares
    pub kind: NodeKind,
    /// Source location, when the builder supplied one
    pub loc: Option<Loc>,
    /// Comments attached to this node, in source order
    pub comments: Vec<Comment>,
    pub(crate) owner: Option<NodeId>,
}

impl Node {
    /// Create an unowned node
    pub fn new(kind: impl Into<NodeKind>) -> Self {
        Self {
            kind: kind.into(),
            loc: None,
            comments: Vec::new(),
            owner: None,
        }
    }

    /// Attach a location
    #[must_use]
    pub fn with_loc(mut self, loc: Loc) -> Self {
        self.loc = Some(loc);
        self
    }

    /// Attach a comment line
    #[must_use]
    pub fn with_comment(mut self, text: impl Into<String>) -> Self {
        self.comments.push(Comment::new(text));
        self
    }

    /// Owning scope, `None` for the root and for detached nodes
    pub fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    /// Copy of this node without owner and, for scopes, without body.
    ///
    /// Body handles only make sense inside the tree that allocated them, so
    /// a copy headed for another tree must start empty.
    pub fn detached_copy(&self) -> Self {
        let kind = match &self.kind {
            NodeKind::Scope(scope) => NodeKind::Scope(Scope {
                kind: scope.kind.clone(),
                name: scope.name.clone(),
                body: Vec::new(),
            }),
            other => other.clone(),
        };
        Self {
            kind,
            loc: self.loc.clone(),
            comments: self.comments.clone(),
            owner: None,
        }
    }

    /// The scope payload, if this node is a scope
    pub fn as_scope(&self) -> Option<&Scope> {
        match &self.kind {
            NodeKind::Scope(scope) => Some(scope),
            _ => None,
        }
    }

    /// Whether this node is a scope
    pub fn is_scope(&self) -> bool {
        matches!(self.kind, NodeKind::Scope(_))
    }
}

/// Closed set of node kinds
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Namespace, type, singleton, root or group
    Scope(Scope),
    /// Constant declaration
    Const(Const),
    /// Method declaration
    Method(Method),
    /// Attribute reader/writer/accessor
    Attr(Attr),
    /// Generic bare call statement
    Directive(Directive),
    /// Signature not yet attached to a method or attribute
    Sig(Sig),
}

macro_rules! impl_into_node {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for NodeKind {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }

            impl From<$ty> for Node {
                fn from(value: $ty) -> Self {
                    Self::new(value)
                }
            }
        )*
    };
}

impl_into_node!(
    Scope(Scope),
    Const(Const),
    Method(Method),
    Attr(Attr),
    Directive(Directive),
    Sig(Sig),
);

impl From<NodeKind> for Node {
    fn from(value: NodeKind) -> Self {
        Self::new(value)
    }
}

/// A comment attached to the node that follows it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Comment text without the leading `#`
    pub text: String,
    /// Source location
    pub loc: Option<Loc>,
}

impl Comment {
    /// Create a comment without location
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            loc: None,
        }
    }
}

/// Kind of scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeKind {
    /// Top of a tree
    Root,
    /// Non-instantiable grouping scope (`module`)
    Namespace,
    /// Instantiable scope (`class`)
    Type {
        /// Superclass name
        superclass: Option<String>,
    },
    /// The class-level scope (`class << self`)
    Singleton,
    /// Transparent wrapper made by the group pass
    Group(GroupKind),
}

/// Buckets used when grouping a scope's body, in print order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKind {
    /// `include` / `extend` / `prepend`
    Mixins,
    /// Nested scopes
    Scopes,
    /// Structural-typing markers (`interface!`, `abstract!`, ...)
    Helpers,
    /// Constants
    Consts,
    /// Attributes
    Attrs,
    /// `def self.foo`
    SingletonMethods,
    /// `def foo`
    Methods,
    /// Everything else
    Other,
}

impl GroupKind {
    /// All buckets in print order
    pub const ALL: [Self; 8] = [
        Self::Mixins,
        Self::Scopes,
        Self::Helpers,
        Self::Consts,
        Self::Attrs,
        Self::SingletonMethods,
        Self::Methods,
        Self::Other,
    ];
}

/// A node owning an ordered body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    /// Scope flavour
    pub kind: ScopeKind,
    /// Local name or absolute path (`::A::B`); empty for root and groups
    pub name: String,
    pub(crate) body: Vec<NodeId>,
}

impl Scope {
    fn with_kind(kind: ScopeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            body: Vec::new(),
        }
    }

    /// `module name`
    pub fn namespace(name: impl Into<String>) -> Self {
        Self::with_kind(ScopeKind::Namespace, name)
    }

    /// `class name`
    pub fn class(name: impl Into<String>) -> Self {
        Self::with_kind(ScopeKind::Type { superclass: None }, name)
    }

    /// `class name < superclass`
    pub fn class_with_superclass(name: impl Into<String>, superclass: impl Into<String>) -> Self {
        Self::with_kind(
            ScopeKind::Type {
                superclass: Some(superclass.into()),
            },
            name,
        )
    }

    /// `class << self`
    pub fn singleton() -> Self {
        Self::with_kind(ScopeKind::Singleton, SINGLETON_NAME)
    }

    /// Transparent wrapper for one group bucket
    pub fn group(kind: GroupKind) -> Self {
        Self::with_kind(ScopeKind::Group(kind), "")
    }

    pub(crate) fn root() -> Self {
        Self::with_kind(ScopeKind::Root, "")
    }

    /// Children in order
    pub fn body(&self) -> &[NodeId] {
        &self.body
    }

    /// Whether the name is already an absolute path
    pub fn is_absolute(&self) -> bool {
        self.name.starts_with(PATH_SEPARATOR)
    }

    /// Whether this scope contributes a level to qualified names
    pub fn is_named(&self) -> bool {
        matches!(
            self.kind,
            ScopeKind::Namespace | ScopeKind::Type { .. } | ScopeKind::Singleton
        )
    }
}

/// A constant declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Const {
    /// Local name or absolute path
    pub name: String,
    /// Opaque value expression
    pub value: Option<String>,
}

impl Const {
    /// Create a constant
    pub fn new(name: impl Into<String>, value: Option<&str>) -> Self {
        Self {
            name: name.into(),
            value: value.map(str::to_owned),
        }
    }
}

/// Flavour of a method parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKind {
    /// `a`
    Required,
    /// `a = default`
    Optional {
        /// Default value expression
        default: String,
    },
    /// `*a`
    Rest,
    /// `a:`
    KeyRequired,
    /// `a: default`
    KeyOptional {
        /// Default value expression
        default: String,
    },
    /// `**a`
    KeyRest,
    /// `&a`
    Block,
}

/// A method parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Flavour
    pub kind: ParamKind,
    /// Parameter name
    pub name: String,
    /// Declared type
    pub ty: Option<String>,
}

impl Param {
    /// Create an untyped parameter
    pub fn new(kind: ParamKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            ty: None,
        }
    }

    /// Required positional parameter
    pub fn required(name: impl Into<String>) -> Self {
        Self::new(ParamKind::Required, name)
    }

    /// Attach a declared type
    #[must_use]
    pub fn with_type(mut self, ty: impl Into<String>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    /// Whether this is a keyword parameter
    pub fn is_keyword(&self) -> bool {
        matches!(
            self.kind,
            ParamKind::KeyRequired | ParamKind::KeyOptional { .. }
        )
    }
}

/// A method declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    /// Method name
    pub name: String,
    /// `def self.name`
    pub is_singleton: bool,
    /// Parameters in order
    pub params: Vec<Param>,
    /// Attached signatures
    pub sigs: Vec<Sig>,
}

impl Method {
    /// Instance method without parameters
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_singleton: false,
            params: Vec::new(),
            sigs: Vec::new(),
        }
    }

    /// Singleton method without parameters
    pub fn singleton(name: impl Into<String>) -> Self {
        Self {
            is_singleton: true,
            ..Self::new(name)
        }
    }

    /// Add a parameter
    #[must_use]
    pub fn with_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Attach a signature
    #[must_use]
    pub fn with_sig(mut self, sig: Sig) -> Self {
        self.sigs.push(sig);
        self
    }
}

/// Flavour of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    /// `attr_reader`
    Reader,
    /// `attr_writer`
    Writer,
    /// `attr_accessor`
    Accessor,
}

impl AttrKind {
    /// Directive keyword
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Reader => "attr_reader",
            Self::Writer => "attr_writer",
            Self::Accessor => "attr_accessor",
        }
    }
}

/// An attribute declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    /// Flavour
    pub kind: AttrKind,
    /// Symbol names, at least one
    pub names: Vec<String>,
    /// Declared type
    pub ty: Option<String>,
    /// Attached signatures
    pub sigs: Vec<Sig>,
}

impl Attr {
    /// Create an attribute.
    ///
    /// A typed attribute gets a derived default signature.
    pub fn new(kind: AttrKind, names: &[&str], ty: Option<&str>) -> Self {
        let mut attr = Self {
            kind,
            names: names.iter().map(|name| (*name).to_owned()).collect(),
            ty: ty.map(str::to_owned),
            sigs: Vec::new(),
        };
        if let Some(sig) = attr.derived_sig() {
            attr.sigs.push(sig);
        }
        attr
    }

    /// Signature implied by the declared type, if any
    pub fn derived_sig(&self) -> Option<Sig> {
        let ty = self.ty.clone()?;
        let sig = match self.kind {
            AttrKind::Reader | AttrKind::Accessor => Sig::returns(ty),
            AttrKind::Writer => {
                let name = self.names.first().cloned().unwrap_or_default();
                Sig::returns(ty.clone()).with_param(name, Some(ty))
            }
        };
        Some(sig)
    }
}

/// Classification of a directive by its method name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// `include`, `extend`, `prepend`
    Mixin,
    /// `interface!`, `abstract!`, `sealed!`, `final!`,
    /// `mixes_in_class_methods`, `requires_ancestor`
    Helper,
    /// `public`, `private`, `protected`
    Visibility,
    /// Anything else
    Other,
}

/// A generic bare call statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Called method
    pub method: String,
    /// Arguments, order significant
    pub args: Vec<String>,
}

impl Directive {
    /// Create a directive
    pub fn new(method: impl Into<String>, args: &[&str]) -> Self {
        Self {
            method: method.into(),
            args: args.iter().map(|arg| (*arg).to_owned()).collect(),
        }
    }

    /// `include name`
    pub fn include(name: &str) -> Self {
        Self::new("include", &[name])
    }

    /// Classify by method name
    pub fn kind(&self) -> DirectiveKind {
        match self.method.as_str() {
            "include" | "extend" | "prepend" => DirectiveKind::Mixin,
            "interface!" | "abstract!" | "sealed!" | "final!" | "mixes_in_class_methods"
            | "requires_ancestor" => DirectiveKind::Helper,
            "public" | "private" | "protected" => DirectiveKind::Visibility,
            _ => DirectiveKind::Other,
        }
    }

    /// `method(arg1, arg2)`, used for sorting and index keys
    pub fn display_name(&self) -> String {
        format!("{}({})", self.method, self.args.join(", "))
    }
}

/// A typed parameter inside a signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigParam {
    /// Parameter name
    pub name: String,
    /// Declared type; rendered as `T.untyped` when missing
    pub ty: Option<String>,
}

/// A structural type annotation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sig {
    /// `abstract` marker
    pub is_abstract: bool,
    /// `override` marker
    pub is_override: bool,
    /// `overridable` marker
    pub is_overridable: bool,
    /// Typed parameters
    pub params: Vec<SigParam>,
    /// Return type; `None` means `void`
    pub returns: Option<String>,
}

impl Sig {
    /// `sig { void }`
    pub fn void() -> Self {
        Self::default()
    }

    /// `sig { returns(ty) }`
    pub fn returns(ty: impl Into<String>) -> Self {
        Self {
            returns: Some(ty.into()),
            ..Self::default()
        }
    }

    /// Add a typed parameter
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, ty: Option<String>) -> Self {
        self.params.push(SigParam {
            name: name.into(),
            ty,
        });
        self
    }

    /// Mark abstract
    #[must_use]
    pub fn abstract_(mut self) -> Self {
        self.is_abstract = true;
        self
    }
}
