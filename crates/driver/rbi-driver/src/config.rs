//! Pipeline configuration files

use anyhow::{Context, Result};
use rbi_printer::PrinterConfig;
use rbi_rewrite::MergeOptions;
use rbi_validate::ValidateConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name looked up by [`Config::find_in_dir`]
pub const CONFIG_FILE_NAME: &str = "rbi.toml";

/// Full pipeline configuration; every section is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Printer settings
    pub printer: PrinterConfig,
    /// Merge settings
    pub merge: MergeOptions,
    /// Which stages run
    pub pipeline: PipelineConfig,
    /// Which validation rules run
    pub validate: ValidateConfig,
}

/// Optional pipeline stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Attach bare signatures before anything else
    pub collect_signatures: bool,
    /// Merge even when there is a single input
    pub merge: bool,
    /// Flatten the merged tree
    pub flatten: bool,
    /// Inflate the merged tree and merge the result
    pub inflate: bool,
    /// Group scope bodies
    pub group: bool,
    /// Sort scope bodies
    pub sort: bool,
    /// Run the configured validators
    pub validate: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            collect_signatures: true,
            merge: false,
            flatten: false,
            inflate: false,
            group: false,
            sort: false,
            validate: true,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load `rbi.toml` from a directory
    pub fn find_in_dir(dir: &Path) -> Result<Self> {
        Self::from_file(&dir.join(CONFIG_FILE_NAME))
    }
}
