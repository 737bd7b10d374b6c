//! Pipeline driver
//!
//! Runs the configured rewriting stages over a set of input trees, validates
//! the result and prints it. Validation works on a copy of the final tree,
//! so its name canonicalization never shows up in the printed text.
//! Logging goes through `tracing`; no subscriber is installed here.

mod config;

pub use config::{CONFIG_FILE_NAME, Config, PipelineConfig};

use rbi_diagnostics::{Diagnostic, has_errors};
use rbi_printer::print_with;
use rbi_rewrite::{collect_signatures, flatten, group, inflate, merge_with, sort};
use rbi_tree::{StructuralError, Tree};
use rbi_validate::Validator;

/// Result of a pipeline run
#[derive(Debug)]
pub struct PipelineOutput {
    /// Final tree
    pub tree: Tree,
    /// Canonical text of `tree`
    pub text: String,
    /// Diagnostics of every stage, in stage order
    pub diagnostics: Vec<Diagnostic>,
}

impl PipelineOutput {
    /// Whether any stage reported an error
    pub fn has_errors(&self) -> bool {
        has_errors(&self.diagnostics)
    }
}

/// Configured sequence of passes
pub struct Pipeline {
    config: Config,
    validator: Validator,
}

impl Pipeline {
    /// Create a pipeline
    pub fn new(config: Config) -> Self {
        let validator = Validator::from_config(&config.validate);
        Self { config, validator }
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run every configured stage over `trees`
    ///
    /// # Errors
    ///
    /// Returns the first `StructuralError` raised by a pass; nothing is
    /// printed in that case.
    pub fn run(&self, mut trees: Vec<Tree>) -> Result<PipelineOutput, StructuralError> {
        let stages = &self.config.pipeline;
        let mut diagnostics = Vec::new();

        if stages.collect_signatures {
            for tree in &mut trees {
                collect_signatures(tree)?;
            }
        }

        let mut tree = if trees.len() == 1 && !stages.merge {
            trees.swap_remove(0)
        } else {
            tracing::info!(inputs = trees.len(), "merging");
            let inputs: Vec<&Tree> = trees.iter().collect();
            let merged = merge_with(&inputs, self.config.merge)?;
            diagnostics.extend(merged.diagnostics);
            merged.tree
        };

        if stages.flatten {
            tracing::info!("flattening");
            tree = flatten(&[&tree])?;
        }

        if stages.inflate {
            tracing::info!("inflating");
            let inflated = inflate(&[&tree])?;
            diagnostics.extend(inflated.diagnostics);
            let merged = merge_with(&[&inflated.tree], self.config.merge)?;
            diagnostics.extend(merged.diagnostics);
            tree = merged.tree;
        }

        if stages.group {
            tracing::info!("grouping");
            group(&mut tree)?;
        }

        if stages.sort {
            tracing::info!("sorting");
            sort(&mut tree)?;
        }

        if stages.validate {
            tracing::info!("validating");
            let mut scratch = tree.clone();
            diagnostics.extend(self.validator.validate(&mut scratch)?);
        }

        let text = print_with(&tree, &self.config.printer);
        tracing::info!(
            bytes = text.len(),
            diagnostics = diagnostics.len(),
            "pipeline finished"
        );

        Ok(PipelineOutput {
            tree,
            text,
            diagnostics,
        })
    }
}
