//! README extraction module
//!
//! This module handles pulling structured records out of a module README:
//! - Variable doc blocks (bullet + `since` annotation + description line)
//! - Markdown link-reference definitions

pub mod doc;
pub mod links;

pub use doc::{DocExtractor, ExtractedDoc, Interpretation, MalformedBlock, VariableDoc};
pub use links::{find_link_refs, LinkReferenceTable};

/// 1-based line number of a byte offset within `text`
pub(crate) fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].bytes().filter(|b| *b == b'\n').count() + 1
}
