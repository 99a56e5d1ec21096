//! Variable doc-block extraction from Markdown
//!
//! A doc block is a list item of the form
//!
//! ```text
//! - (optional) **`region = "us-east-1"`** _[since v1.2.0]_
//!
//!   AWS region to deploy into.
//! ```
//!
//! Each match becomes a [`VariableDoc`]. Indentation of the bullet gives the
//! nesting depth, and nested records carry the names of their parents.

use super::{find_link_refs, line_of, LinkReferenceTable};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;

static DOC_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^( *)- \(([\w()]+)\) \*\*`([^`\s]+)(?:\s=(.+?))?`\*\*\s_\[since\sv([\w.]+)\]_[\r\n]+(\s*)(.*)",
    )
    .unwrap()
});

/// Looser shape used to spot bullets that look like doc blocks but do not parse
static NEAR_MISS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^( *)- \(([\w()]+)\) \*\*`([^`\s]+)[^`\n]*`\*\*").unwrap()
});

/// How bullet indentation is interpreted
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Interpretation {
    /// Every bullet is a top-level variable, indentation is ignored
    Flat,
    /// Indentation gives nesting depth; only depth 0 is rewritten
    #[default]
    Hierarchical,
}

impl std::fmt::Display for Interpretation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Interpretation::Flat => write!(f, "flat"),
            Interpretation::Hierarchical => write!(f, "hierarchical"),
        }
    }
}

/// A documented variable extracted from the README
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDoc {
    /// Nesting depth (0 = top-level)
    pub indent_level: usize,
    /// Variable identifier
    pub name: String,
    /// Version from the `since` annotation, without the leading `v`
    pub since_version: String,
    /// Description line, verbatim apart from trailing whitespace
    pub description: String,
    /// Parenthesized tag, e.g. `optional` or `required`
    pub annotation: String,
    /// Default value shown in the bullet, if any
    pub default: Option<String>,
    /// Names of enclosing records followed by this record's name
    pub path: Vec<String>,
    /// Labels of `[text][label]` references found in the description
    pub link_refs: Vec<String>,
    /// Line of the bullet in the README (1-based)
    pub line: usize,
}

impl VariableDoc {
    /// Whether this record is a top-level variable
    pub fn is_top_level(&self) -> bool {
        self.indent_level == 0
    }

    /// Dotted form of [`VariableDoc::path`]
    pub fn full_path(&self) -> String {
        self.path.join(".")
    }
}

/// A bullet that looks like a doc block but does not match the full shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MalformedBlock {
    pub name: String,
    pub line: usize,
}

/// Everything pulled out of one README
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedDoc {
    /// Records in document order
    pub records: Vec<VariableDoc>,
    /// Link-reference definitions
    pub links: LinkReferenceTable,
    /// Near-miss bullets, excluded from `records`
    pub malformed: Vec<MalformedBlock>,
}

/// Extracts variable doc blocks from Markdown text
pub struct DocExtractor {
    /// Characters per indentation level
    indent_width: usize,
    interpretation: Interpretation,
}

impl DocExtractor {
    /// Create a new extractor (2-space indentation, hierarchical)
    pub fn new() -> Self {
        Self {
            indent_width: 2,
            interpretation: Interpretation::default(),
        }
    }

    /// Set the number of characters per indentation level
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width.max(1);
        self
    }

    /// Set how indentation is interpreted
    pub fn with_interpretation(mut self, interpretation: Interpretation) -> Self {
        self.interpretation = interpretation;
        self
    }

    /// Extract records, link references and near misses from Markdown
    pub fn extract(&self, content: &str) -> ExtractedDoc {
        let (records, starts) = self.parse_records(content);
        let links = LinkReferenceTable::from_markdown(content);
        let malformed = find_malformed(content, &starts);

        tracing::debug!(
            records = records.len(),
            links = links.len(),
            malformed = malformed.len(),
            "extracted README"
        );

        ExtractedDoc {
            records,
            links,
            malformed,
        }
    }

    /// Parse doc blocks; also returns the byte offsets where each match starts
    fn parse_records(&self, content: &str) -> (Vec<VariableDoc>, HashSet<usize>) {
        let mut records = Vec::new();
        let mut starts = HashSet::new();
        let mut stack: Vec<(usize, String)> = Vec::new();

        for caps in DOC_BLOCK.captures_iter(content) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            starts.insert(whole.start());

            let indent = caps.get(1).map_or("", |m| m.as_str());
            let indent_level = match self.interpretation {
                Interpretation::Flat => 0,
                Interpretation::Hierarchical => indent.len() / self.indent_width,
            };
            let name = caps[3].to_string();
            let description = caps
                .get(7)
                .map_or("", |m| m.as_str())
                .trim_end()
                .to_string();

            while let Some((level, _)) = stack.last() {
                if *level >= indent_level {
                    stack.pop();
                } else {
                    break;
                }
            }
            stack.push((indent_level, name.clone()));

            records.push(VariableDoc {
                indent_level,
                since_version: caps[5].to_string(),
                annotation: caps[2].to_string(),
                default: caps.get(4).map(|m| m.as_str().trim().to_string()),
                path: stack.iter().map(|(_, n)| n.clone()).collect(),
                link_refs: find_link_refs(&description),
                line: line_of(content, whole.start()),
                description,
                name,
            });
        }

        (records, starts)
    }
}

impl Default for DocExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn find_malformed(content: &str, starts: &HashSet<usize>) -> Vec<MalformedBlock> {
    NEAR_MISS
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            if starts.contains(&whole.start()) {
                return None;
            }
            Some(MalformedBlock {
                name: caps[3].to_string(),
                line: line_of(content, whole.start()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const README: &str = r#"# ELB module

## Variables

- (required) **`name`** _[since v1.0.0]_

  Name of the load balancer.

- (optional) **`region = "us-east-1"`** _[since v1.2.0]_

  AWS region to deploy into.

- (optional) **`listeners`** _[since v1.1.0]_

  Listener definitions, see [the docs][listener-docs].

  - (required) **`port`** _[since v1.1.0]_

    Port to listen on.

    - (optional) **`ssl_policy`** _[since v1.3.0]_

      Policy name.

  - (optional) **`protocol`** _[since v1.1.0]_

    Protocol to use.

- (optional) **`broken`**

  Missing the since tag.

[listener-docs]: https://example.com/listeners
"#;

    #[test]
    fn test_extract_in_document_order() {
        let doc = DocExtractor::new().extract(README);
        let names: Vec<&str> = doc.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["name", "region", "listeners", "port", "ssl_policy", "protocol"]
        );
    }

    #[test]
    fn test_extract_fields() {
        let doc = DocExtractor::new().extract(README);
        let region = &doc.records[1];
        assert_eq!(region.annotation, "optional");
        assert_eq!(region.since_version, "1.2.0");
        assert_eq!(region.description, "AWS region to deploy into.");
        assert_eq!(region.default.as_deref(), Some("\"us-east-1\""));
        assert_eq!(region.line, 9);
        assert!(region.is_top_level());
    }

    #[test]
    fn test_indentation_and_path() {
        let doc = DocExtractor::new().extract(README);
        let levels: Vec<usize> = doc.records.iter().map(|r| r.indent_level).collect();
        assert_eq!(levels, vec![0, 0, 0, 1, 2, 1]);

        assert_eq!(doc.records[4].full_path(), "listeners.port.ssl_policy");
        assert_eq!(doc.records[5].full_path(), "listeners.protocol");
    }

    #[test]
    fn test_flat_interpretation_ignores_indentation() {
        let doc = DocExtractor::new()
            .with_interpretation(Interpretation::Flat)
            .extract(README);
        assert!(doc.records.iter().all(|r| r.indent_level == 0));
        assert_eq!(doc.records[3].path, vec!["port"]);
    }

    #[test]
    fn test_link_refs_detected_but_description_untouched() {
        let doc = DocExtractor::new().extract(README);
        let listeners = &doc.records[2];
        assert_eq!(listeners.link_refs, vec!["listener-docs"]);
        assert_eq!(
            listeners.description,
            "Listener definitions, see [the docs][listener-docs]."
        );
        assert_eq!(
            doc.links.get("listener-docs"),
            Some("https://example.com/listeners")
        );
    }

    #[test]
    fn test_malformed_bullet_excluded() {
        let doc = DocExtractor::new().extract(README);
        assert!(doc.records.iter().all(|r| r.name != "broken"));
        assert_eq!(doc.malformed.len(), 1);
        assert_eq!(doc.malformed[0].name, "broken");
    }

    #[test]
    fn test_no_bullets() {
        let doc = DocExtractor::new().extract("# Nothing here\n\nJust prose.\n");
        assert!(doc.records.is_empty());
        assert!(doc.malformed.is_empty());
    }

    #[test]
    fn test_crlf_line_endings() {
        let content = "- (optional) **`region`** _[since v1.2.0]_\r\n\r\n  AWS region.\r\n";
        let doc = DocExtractor::new().extract(content);
        assert_eq!(doc.records.len(), 1);
        assert_eq!(doc.records[0].description, "AWS region.");
    }
}
