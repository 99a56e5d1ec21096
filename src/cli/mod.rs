//! CLI interface using clap
//!
//! Provides the command-line interface for tfdocsync

mod commands;

pub use commands::*;

use crate::extract::Interpretation;
use crate::module::SyncConfig;
use crate::sync::DeclarationStyle;
use clap::{Args, Parser, Subcommand};

/// tfdocsync - keep Terraform variable descriptions in step with the README
#[derive(Parser, Debug)]
#[command(name = "tfdocsync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the module folder (defaults to current directory)
    #[arg(short, long, global = true, default_value = ".")]
    pub path: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json)
    #[arg(short = 'o', long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rewrite variable descriptions from the README and print the result
    Sync(SyncArgs),

    /// Fail if any variables file is out of date with its README
    Check(CheckArgs),

    /// List the doc blocks found in the README
    List(ListArgs),

    /// Write a default configuration file
    Init(InitArgs),

    /// Show the effective configuration
    Config(ConfigArgs),
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Settings that override the module configuration
#[derive(Args, Debug, Clone, Default)]
pub struct OverrideArgs {
    /// Declaration style to rewrite
    #[arg(short, long)]
    pub style: Option<DeclarationStyle>,

    /// How README indentation is interpreted
    #[arg(short, long)]
    pub mode: Option<Interpretation>,

    /// Warn about README bullets that almost match the doc-block shape
    #[arg(long)]
    pub strict: bool,
}

impl OverrideArgs {
    /// Apply the overrides on top of a loaded configuration
    pub fn apply(&self, config: &mut SyncConfig) {
        if let Some(style) = self.style {
            config.style = style;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if self.strict {
            config.warn_malformed = true;
        }
    }
}

/// Arguments for sync command
#[derive(Parser, Debug)]
pub struct SyncArgs {
    /// Write the result back to the variables file instead of stdout
    #[arg(short, long)]
    pub write: bool,

    /// Print a unified diff instead of the full text
    #[arg(short, long, conflicts_with = "write")]
    pub diff: bool,

    /// Process every module folder below the path
    #[arg(short, long)]
    pub recursive: bool,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

/// Arguments for check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Check every module folder below the path
    #[arg(short, long)]
    pub recursive: bool,

    #[command(flatten)]
    pub overrides: OverrideArgs,
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub overrides: OverrideArgs,
}

/// Arguments for init command
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Get a single configuration value
    #[arg(long)]
    pub get: Option<String>,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
