//! Per-module configuration for tfdocsync

use crate::error::SyncError;
use crate::extract::Interpretation;
use crate::sync::DeclarationStyle;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file inside a module folder
pub const CONFIG_FILE: &str = ".tfdocsync.toml";

/// Configuration for a module folder being synced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// README file name, relative to the module folder
    #[serde(default = "default_readme")]
    pub readme: String,

    /// Variable-definition file name, relative to the module folder
    #[serde(default = "default_variables")]
    pub variables: String,

    /// Characters per README indentation level
    #[serde(default = "default_indent_width")]
    pub indent_width: usize,

    /// Declaration style to rewrite
    #[serde(default)]
    pub style: DeclarationStyle,

    /// How README indentation is interpreted
    #[serde(default)]
    pub mode: Interpretation,

    /// Warn about README bullets that almost match the doc-block shape
    #[serde(default)]
    pub warn_malformed: bool,

    /// Heredoc marker used for block-style descriptions
    #[serde(default = "default_heredoc_marker")]
    pub heredoc_marker: String,

    /// Doc-comment prefix used for assignment style
    #[serde(default = "default_comment_prefix")]
    pub comment_prefix: String,
}

fn default_readme() -> String {
    "README.md".to_string()
}

fn default_variables() -> String {
    "variables.tf".to_string()
}

fn default_indent_width() -> usize {
    2
}

fn default_heredoc_marker() -> String {
    "EOT".to_string()
}

fn default_comment_prefix() -> String {
    "///".to_string()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            readme: default_readme(),
            variables: default_variables(),
            indent_width: default_indent_width(),
            style: DeclarationStyle::default(),
            mode: Interpretation::default(),
            warn_malformed: false,
            heredoc_marker: default_heredoc_marker(),
            comment_prefix: default_comment_prefix(),
        }
    }
}

impl SyncConfig {
    /// Load configuration from the module folder or return defaults
    pub fn load_or_default(module_root: &Path) -> Result<Self> {
        let config_path = module_root.join(CONFIG_FILE);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
            let config: SyncConfig =
                toml::from_str(&content).map_err(|source| SyncError::Config {
                    path: config_path.clone(),
                    source,
                })?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the module folder
    pub fn save(&self, module_root: &Path) -> Result<()> {
        let config_path = module_root.join(CONFIG_FILE);
        let content =
            toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }

    /// Whether `dir` holds both input files
    pub fn is_module_dir(&self, dir: &Path) -> bool {
        dir.join(&self.readme).is_file() && dir.join(&self.variables).is_file()
    }
}
