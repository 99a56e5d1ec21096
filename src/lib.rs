//! tfdocsync - Keep Terraform variable descriptions in step with the README
//!
//! This library reads variable doc blocks out of a module README and
//! rewrites the matching `description` fields of the module's variables file.

pub mod cli;
pub mod error;
pub mod extract;
pub mod module;
pub mod sync;

/// Re-export commonly used types
pub use error::SyncError;
pub use extract::{DocExtractor, Interpretation, LinkReferenceTable, VariableDoc};
pub use module::{ModuleDir, SyncConfig};
pub use sync::{DeclarationStyle, Diagnostic, DiagnosticKind, SyncReport, Synchronizer};

/// Application-wide error type
pub use anyhow::Result;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "tfdocsync";
