//! Description synchronization engine
//!
//! This module rewrites variable documentation in a definition file:
//! - Locating each documented variable's declaration
//! - Rendering the README description and `@since` tag in its place
//! - Reporting variables that could not be rewritten

mod locate;
mod style;
mod synchronizer;

pub use locate::{Declaration, DefinitionIndex};
pub use style::{
    strategy_for, AssignmentStrategy, BlockStrategy, DeclarationStrategy, DeclarationStyle,
    FieldSite, Located,
};
pub use synchronizer::{RecordOutcome, SyncOptions, Synchronizer};

use crate::extract::{LinkReferenceTable, VariableDoc};
use serde::{Deserialize, Serialize};

/// Kind of a non-fatal sync problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// Top-level variable has no declaration in the definition text
    MissingDeclaration,
    /// Declaration exists but carries no description field
    MissingDescription,
    /// Variable is declared more than once; the first declaration was used
    DuplicateDeclaration,
    /// README bullet looks like a doc block but does not parse
    MalformedDocBlock,
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticKind::MissingDeclaration => write!(f, "missing-declaration"),
            DiagnosticKind::MissingDescription => write!(f, "missing-description"),
            DiagnosticKind::DuplicateDeclaration => write!(f, "duplicate-declaration"),
            DiagnosticKind::MalformedDocBlock => write!(f, "malformed-doc-block"),
        }
    }
}

/// A non-fatal problem found while syncing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Variable name the problem refers to
    pub name: String,
    /// README line of the doc block
    pub line: usize,
    /// Human-readable message
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic with the standard message for `kind`
    pub fn new(kind: DiagnosticKind, name: &str, line: usize) -> Self {
        let message = match kind {
            DiagnosticKind::MissingDeclaration => {
                format!("Variable definition not found for top-level variable: {}", name)
            }
            DiagnosticKind::MissingDescription => {
                format!("Variable definition has no description field: {}", name)
            }
            DiagnosticKind::DuplicateDeclaration => {
                format!("Variable declared more than once, rewrote the first: {}", name)
            }
            DiagnosticKind::MalformedDocBlock => {
                format!("Doc block does not match the expected shape: {}", name)
            }
        };

        Self {
            kind,
            name: name.to_string(),
            line,
            message,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Result of one sync run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    /// Rewritten definition text
    pub output: String,
    /// Records extracted from the README, in document order
    pub records: Vec<VariableDoc>,
    /// Link-reference definitions from the README
    pub links: LinkReferenceTable,
    /// Non-fatal problems, in the order they were found
    pub diagnostics: Vec<Diagnostic>,
    /// Number of records whose field was rewritten
    pub rewritten: usize,
    /// Whether `output` differs from the input text
    pub changed: bool,
}

impl SyncReport {
    /// Diagnostics of one kind
    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_declaration_message() {
        let diagnostic = Diagnostic::new(DiagnosticKind::MissingDeclaration, "foo", 3);
        assert_eq!(
            diagnostic.to_string(),
            "Variable definition not found for top-level variable: foo"
        );
        assert_eq!(diagnostic.line, 3);
    }
}
