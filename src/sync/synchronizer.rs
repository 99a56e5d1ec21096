//! Pipeline driver
//!
//! Extracts records from the README and folds them over the definition text.
//! Every step re-locates its target in the text produced by the previous
//! step, so earlier edits never leave stale offsets behind.

use super::{
    strategy_for, DeclarationStrategy, DeclarationStyle, Diagnostic, DiagnosticKind, Located,
    SyncReport,
};
use crate::extract::{DocExtractor, Interpretation, VariableDoc};
use crate::module::SyncConfig;

/// Options for a sync run
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// How bullet indentation is read
    pub interpretation: Interpretation,
    /// Which declarations get rewritten
    pub style: DeclarationStyle,
    /// Characters per indentation level in the README
    pub indent_width: usize,
    /// Report near-miss doc blocks instead of dropping them silently
    pub warn_malformed: bool,
    /// Heredoc marker for block style
    pub heredoc_marker: String,
    /// Doc-comment prefix for assignment style
    pub comment_prefix: String,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            interpretation: Interpretation::Hierarchical,
            style: DeclarationStyle::Block,
            indent_width: 2,
            warn_malformed: false,
            heredoc_marker: "EOT".to_string(),
            comment_prefix: "///".to_string(),
        }
    }
}

impl From<&SyncConfig> for SyncOptions {
    fn from(config: &SyncConfig) -> Self {
        Self {
            interpretation: config.mode,
            style: config.style,
            indent_width: config.indent_width,
            warn_malformed: config.warn_malformed,
            heredoc_marker: config.heredoc_marker.clone(),
            comment_prefix: config.comment_prefix.clone(),
        }
    }
}

/// What happened to a single record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Field rewritten; `declarations` > 1 means the first of several was used
    Rewritten { declarations: usize },
    /// Nested record, left alone
    Nested,
    /// Nothing to rewrite
    Missing(DiagnosticKind),
}

/// Rewrites definition text from README records
pub struct Synchronizer {
    options: SyncOptions,
    strategy: Box<dyn DeclarationStrategy>,
}

impl Synchronizer {
    /// Create a synchronizer with default options
    pub fn new() -> Self {
        Self::with_options(SyncOptions::default())
    }

    /// Create with custom options
    pub fn with_options(options: SyncOptions) -> Self {
        let strategy = strategy_for(
            options.style,
            &options.heredoc_marker,
            &options.comment_prefix,
        );
        Self { options, strategy }
    }

    /// Run the whole pipeline over a README and a definition text
    pub fn run(&self, readme: &str, definitions: &str) -> SyncReport {
        let extracted = DocExtractor::new()
            .with_indent_width(self.options.indent_width)
            .with_interpretation(self.options.interpretation)
            .extract(readme);

        let mut diagnostics = Vec::new();
        if self.options.warn_malformed {
            for block in &extracted.malformed {
                let diagnostic =
                    Diagnostic::new(DiagnosticKind::MalformedDocBlock, &block.name, block.line);
                tracing::warn!(line = block.line, "{}", diagnostic);
                diagnostics.push(diagnostic);
            }
        }

        let mut rewritten = 0;
        let output = extracted
            .records
            .iter()
            .fold(definitions.to_string(), |text, doc| {
                let (text, outcome) = self.apply(text, doc);
                match outcome {
                    RecordOutcome::Rewritten { declarations } => {
                        rewritten += 1;
                        if declarations > 1 {
                            let diagnostic = Diagnostic::new(
                                DiagnosticKind::DuplicateDeclaration,
                                &doc.name,
                                doc.line,
                            );
                            tracing::warn!(declarations, "{}", diagnostic);
                            diagnostics.push(diagnostic);
                        }
                    }
                    RecordOutcome::Nested => {}
                    RecordOutcome::Missing(kind) => {
                        let diagnostic = Diagnostic::new(kind, &doc.name, doc.line);
                        tracing::warn!(line = doc.line, "{}", diagnostic);
                        diagnostics.push(diagnostic);
                    }
                }
                text
            });

        let changed = output != definitions;
        tracing::info!(
            records = extracted.records.len(),
            rewritten,
            problems = diagnostics.len(),
            changed,
            "sync finished"
        );

        SyncReport {
            output,
            records: extracted.records,
            links: extracted.links,
            diagnostics,
            rewritten,
            changed,
        }
    }

    /// Apply one record to `text`, returning the new text
    pub fn apply(&self, text: String, doc: &VariableDoc) -> (String, RecordOutcome) {
        if !doc.is_top_level() {
            tracing::debug!(
                path = %doc.full_path(),
                level = doc.indent_level,
                "skipping nested variable"
            );
            return (text, RecordOutcome::Nested);
        }

        if !doc.link_refs.is_empty() {
            tracing::debug!(
                variable = %doc.name,
                labels = ?doc.link_refs,
                "link references left unresolved"
            );
        }

        let site = match self.strategy.locate(&text, &doc.name) {
            Located::Found(site) => site,
            Located::MissingDeclaration => {
                return (text, RecordOutcome::Missing(DiagnosticKind::MissingDeclaration))
            }
            Located::MissingField => {
                return (text, RecordOutcome::Missing(DiagnosticKind::MissingDescription))
            }
        };

        let replacement = self.strategy.render(doc, &site);
        tracing::debug!(
            variable = %doc.name,
            style = self.strategy.name(),
            since = %doc.since_version,
            "rewriting description"
        );

        let mut updated = String::with_capacity(text.len() + replacement.len());
        updated.push_str(&text[..site.span.start]);
        updated.push_str(&replacement);
        updated.push_str(&text[site.span.end..]);

        (
            updated,
            RecordOutcome::Rewritten {
                declarations: site.declarations,
            },
        )
    }
}

impl Default for Synchronizer {
    fn default() -> Self {
        Self::new()
    }
}
