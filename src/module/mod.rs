//! Module folder access
//!
//! This module handles the on-disk side of a sync:
//! - Opening a module folder and loading its configuration
//! - Reading the README and the variables file in full
//! - Discovering module folders below a root directory

mod config;

pub use config::{SyncConfig, CONFIG_FILE};

use crate::error::SyncError;
use std::path::{Path, PathBuf};

/// The two input texts of a module, fully read
#[derive(Debug, Clone)]
pub struct ModuleInputs {
    pub readme: String,
    pub variables: String,
}

/// A folder holding a README and a variables file
pub struct ModuleDir {
    /// Path to the module folder
    root: PathBuf,
    /// Module configuration
    config: SyncConfig,
}

impl ModuleDir {
    /// Open the module folder at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let root = path.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(SyncError::NotADirectory(root).into());
        }
        let config = SyncConfig::load_or_default(&root)?;
        Ok(Self { root, config })
    }

    /// Get the module folder path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the module configuration
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Mutable access to the configuration, for command-line overrides
    pub fn config_mut(&mut self) -> &mut SyncConfig {
        &mut self.config
    }

    pub fn readme_path(&self) -> PathBuf {
        self.root.join(&self.config.readme)
    }

    pub fn variables_path(&self) -> PathBuf {
        self.root.join(&self.config.variables)
    }

    /// Read both input files; fails before anything is processed if either
    /// one cannot be read
    pub fn read_inputs(&self) -> Result<ModuleInputs, SyncError> {
        let variables = read_input(&self.variables_path())?;
        let readme = read_input(&self.readme_path())?;
        tracing::debug!(
            module = %self.root.display(),
            readme_bytes = readme.len(),
            variables_bytes = variables.len(),
            "read module inputs"
        );
        Ok(ModuleInputs { readme, variables })
    }

    /// Replace the variables file with `content`
    pub fn write_variables(&self, content: &str) -> Result<(), SyncError> {
        let path = self.variables_path();
        std::fs::write(&path, content).map_err(|source| SyncError::Write { path, source })
    }
}

fn read_input(path: &Path) -> Result<String, SyncError> {
    if !path.exists() {
        return Err(SyncError::MissingInput(path.to_path_buf()));
    }
    std::fs::read_to_string(path).map_err(|source| SyncError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Find every module folder at or below `root`, in sorted order
///
/// Hidden directories and `.terraform` caches are skipped.
pub fn discover_modules(root: &Path, config: &SyncConfig) -> anyhow::Result<Vec<PathBuf>> {
    let mut modules = Vec::new();

    for entry in walkdir::WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_str().unwrap_or("");
            e.depth() == 0 || (!name.starts_with('.') && name != "node_modules")
        })
    {
        let entry = entry?;
        if entry.file_type().is_dir() && config.is_module_dir(entry.path()) {
            modules.push(entry.path().to_path_buf());
        }
    }

    Ok(modules)
}
