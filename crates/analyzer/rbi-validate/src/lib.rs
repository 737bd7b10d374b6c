//! Validation rules for declaration trees
//!
//! Rules walk a tree with the same visitor contract as the rewriters and
//! report [`Diagnostic`]s instead of restructuring. The one exception is
//! [`DuplicatesRule`], which canonicalizes scope names while it indexes.

mod rules;

pub use rules::{
    DEFAULT_DENIED, DisallowedConstructsRule, DocumentationCoverageRule, DuplicatesRule,
    SignatureCoverageRule,
};

use rbi_diagnostics::Diagnostic;
use rbi_tree::{StructuralError, Tree};
use serde::{Deserialize, Serialize};

/// Which rules a [`Validator`] runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidateConfig {
    /// Report keys declared more than once
    pub duplicates: bool,
    /// Report methods and attributes without a signature
    pub signatures: bool,
    /// Report declarations without a comment
    pub documentation: bool,
    /// Report denied calls and unattached signatures
    pub disallowed: bool,
    /// Denied call names, replacing the built-in list when set
    pub deny: Option<Vec<String>>,
}

impl Default for ValidateConfig {
    fn default() -> Self {
        Self {
            duplicates: true,
            signatures: true,
            documentation: false,
            disallowed: true,
            deny: None,
        }
    }
}

/// State shared by the rules of one validation run
pub struct ValidationContext<'tree> {
    tree: &'tree mut Tree,
    diagnostics: Vec<Diagnostic>,
}

impl<'tree> ValidationContext<'tree> {
    /// Create a context over `tree`
    pub fn new(tree: &'tree mut Tree) -> Self {
        Self {
            tree,
            diagnostics: Vec::new(),
        }
    }

    /// Tree being validated
    pub fn tree(&self) -> &Tree {
        self.tree
    }

    /// Tree being validated, for rules allowed to normalize it
    pub fn tree_mut(&mut self) -> &mut Tree {
        self.tree
    }

    /// Report a diagnostic
    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Diagnostics reported so far
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Take all diagnostics
    pub fn take_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// A validation rule
pub trait ValidationRule {
    /// Stable rule name
    fn name(&self) -> &str;

    /// Check the context's tree, reporting findings into it
    ///
    /// # Errors
    ///
    /// Returns a `StructuralError` when the tree is malformed.
    fn check(&self, ctx: &mut ValidationContext<'_>) -> Result<(), StructuralError>;
}

/// Runs a list of rules over a tree
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    /// Validator with the default rule set
    pub fn new() -> Self {
        Self::from_config(&ValidateConfig::default())
    }

    /// Validator with the rules enabled in `config`
    pub fn from_config(config: &ValidateConfig) -> Self {
        let mut rules: Vec<Box<dyn ValidationRule>> = Vec::new();
        if config.duplicates {
            rules.push(Box::new(DuplicatesRule));
        }
        if config.signatures {
            rules.push(Box::new(SignatureCoverageRule));
        }
        if config.documentation {
            rules.push(Box::new(DocumentationCoverageRule));
        }
        if config.disallowed {
            let rule = match &config.deny {
                Some(names) => DisallowedConstructsRule::from_names(names.iter().map(String::as_str)),
                None => DisallowedConstructsRule::default(),
            };
            rules.push(Box::new(rule));
        }
        Self::with_rules(rules)
    }

    /// Validator with specific rules
    pub fn with_rules(rules: Vec<Box<dyn ValidationRule>>) -> Self {
        Self { rules }
    }

    /// Add a rule
    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    /// Run every rule in order and return their findings in order
    ///
    /// # Errors
    ///
    /// Stops at the first `StructuralError`.
    pub fn validate(&self, tree: &mut Tree) -> Result<Vec<Diagnostic>, StructuralError> {
        let mut ctx = ValidationContext::new(tree);
        for rule in &self.rules {
            let before = ctx.diagnostics().len();
            rule.check(&mut ctx)?;
            tracing::debug!(
                rule = rule.name(),
                findings = ctx.diagnostics().len() - before,
                "validation rule finished"
            );
        }
        Ok(ctx.take_diagnostics())
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
