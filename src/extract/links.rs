//! Markdown link references
//!
//! Definitions (`[label]: target`) are collected into a table and
//! references (`[text][label]`) are detected in descriptions. Neither is
//! resolved; descriptions always pass through untouched.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static LINK_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\[([^\]]+)\]").unwrap());
static LINK_DEF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^ {0,3}\[([^\]]+)\]:[ \t]*(.*)$").unwrap());

/// Label → target mapping built from link-reference definitions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkReferenceTable {
    entries: BTreeMap<String, String>,
}

impl LinkReferenceTable {
    /// Collect every definition line in `content`; a later definition of the
    /// same label replaces an earlier one
    pub fn from_markdown(content: &str) -> Self {
        let entries = LINK_DEF
            .captures_iter(content)
            .map(|caps| (caps[1].to_string(), caps[2].trim().to_string()))
            .collect();
        Self { entries }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries.get(label).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Labels of all `[text][label]` references in `text`, in order
pub fn find_link_refs(text: &str) -> Vec<String> {
    LINK_REF
        .captures_iter(text)
        .map(|caps| caps[2].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_table() {
        let content = "Some text.\n\n[docs]: https://example.com/docs\n[api]:   https://example.com/api  \n";
        let table = LinkReferenceTable::from_markdown(content);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("docs"), Some("https://example.com/docs"));
        assert_eq!(table.get("api"), Some("https://example.com/api"));
        assert_eq!(table.get("missing"), None);
    }

    #[test]
    fn test_later_definition_wins() {
        let content = "[docs]: https://old\n[docs]: https://new\n";
        let table = LinkReferenceTable::from_markdown(content);
        assert_eq!(table.get("docs"), Some("https://new"));
    }

    #[test]
    fn test_find_link_refs() {
        let refs = find_link_refs("See [the guide][guide] and [API][api-ref].");
        assert_eq!(refs, vec!["guide", "api-ref"]);
        assert!(find_link_refs("No [inline](links) here").is_empty());
    }
}
