//! Lightweight block model of a variables file
//!
//! Only enough structure is recovered to rewrite descriptions: every
//! `variable "<name>" { ... }` header, the extent of its body, and the value
//! span of its block-level `description` attribute. Strings, comments and
//! heredocs are skipped while matching braces so their contents never
//! close a block early.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static VARIABLE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*variable[ \t]+"([^"]+)"[ \t]*\{"#).unwrap()
});
static HEREDOC_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A<<-?([A-Za-z_][A-Za-z0-9_]*)[ \t]*\r?\n").unwrap());

/// One `variable` block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Variable name from the header
    pub name: String,
    /// Byte span from the start of the header line to the closing brace
    pub span: Range<usize>,
    /// Value span of the block-level `description` attribute
    pub description: Option<Range<usize>>,
    /// Leading whitespace of the `description` line
    pub description_indent: String,
}

/// All `variable` blocks of a file, in source order
#[derive(Debug, Clone, Default)]
pub struct DefinitionIndex {
    declarations: Vec<Declaration>,
}

impl DefinitionIndex {
    /// Scan `text` for variable blocks
    pub fn parse(text: &str) -> Self {
        let mut declarations: Vec<Declaration> = Vec::new();

        for caps in VARIABLE_HEADER.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            // Header text inside a previous block (e.g. a heredoc) is not a declaration
            if declarations
                .last()
                .is_some_and(|prev| whole.start() < prev.span.end)
            {
                continue;
            }

            let open = whole.end() - 1;
            let scan = scan_block(text, open);
            let description_indent = scan
                .description
                .as_ref()
                .map(|range| line_indent(text, range.start).to_string())
                .unwrap_or_default();

            declarations.push(Declaration {
                name: name.as_str().to_string(),
                span: whole.start()..scan.end,
                description: scan.description,
                description_indent,
            });
        }

        Self { declarations }
    }

    /// First declaration named `name`
    pub fn first(&self, name: &str) -> Option<&Declaration> {
        self.declarations.iter().find(|d| d.name == name)
    }

    /// Number of declarations named `name`
    pub fn count(&self, name: &str) -> usize {
        self.declarations.iter().filter(|d| d.name == name).count()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter()
    }
}

struct BlockScan {
    end: usize,
    description: Option<Range<usize>>,
}

/// Walk a block from its opening brace to the matching closing brace
fn scan_block(text: &str, open: usize) -> BlockScan {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut description = None;
    let mut i = open;

    while i < bytes.len() {
        match bytes[i] {
            b'{' => {
                depth += 1;
                i += 1;
                if depth == 1 && description.is_none() {
                    if let Some(range) = description_at(text, i) {
                        i = range.end;
                        description = Some(range);
                    }
                }
            }
            b'}' => {
                depth = depth.saturating_sub(1);
                i += 1;
                if depth == 0 {
                    return BlockScan { end: i, description };
                }
            }
            b'"' => i = skip_string(bytes, i),
            b'#' => i = skip_line(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'/') => i = skip_line(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = text[i + 2..]
                    .find("*/")
                    .map_or(bytes.len(), |pos| i + 2 + pos + 2);
            }
            b'<' if bytes.get(i + 1) == Some(&b'<') => {
                i = heredoc_end(text, i).unwrap_or(i + 2);
            }
            b'\n' => {
                i += 1;
                if depth == 1 && description.is_none() {
                    if let Some(range) = description_at(text, i) {
                        i = range.end;
                        description = Some(range);
                    }
                }
            }
            _ => i += 1,
        }
    }

    BlockScan {
        end: bytes.len(),
        description,
    }
}

/// If a `description = ...` attribute starts at `pos` (after optional
/// whitespace), return the span of its value
fn description_at(text: &str, pos: usize) -> Option<Range<usize>> {
    let rest = &text[pos..];
    let rest_trimmed = rest.trim_start_matches([' ', '\t']);
    let after_key = rest_trimmed.strip_prefix("description")?;
    let after_ws = after_key.trim_start_matches([' ', '\t']);
    let after_eq = after_ws.strip_prefix('=')?;
    if after_eq.starts_with('=') {
        return None;
    }
    let value = after_eq.trim_start_matches([' ', '\t']);
    let start = text.len() - value.len();
    Some(start..value_end(text, start))
}

/// End of an attribute value starting at `start`: the closing marker of a
/// heredoc, the closing quote of a string, or the end of the line
fn value_end(text: &str, start: usize) -> usize {
    if let Some(end) = heredoc_end(text, start) {
        return end;
    }
    if text[start..].starts_with('"') {
        return skip_string(text.as_bytes(), start);
    }
    let line_end = text[start..].find('\n').map_or(text.len(), |p| start + p);
    if line_end > start && text.as_bytes()[line_end - 1] == b'\r' {
        line_end - 1
    } else {
        line_end
    }
}

/// If a terminated heredoc opens at `start`, return the offset just past its
/// closing marker
fn heredoc_end(text: &str, start: usize) -> Option<usize> {
    let caps = HEREDOC_HEADER.captures(&text[start..])?;
    let marker = caps.get(1)?.as_str();
    let mut line_start = start + caps.get(0)?.end();

    while line_start < text.len() {
        let line_end = text[line_start..]
            .find('\n')
            .map_or(text.len(), |p| line_start + p);
        let line = &text[line_start..line_end];
        if line.trim() == marker {
            let offset = line.find(marker).unwrap_or(0);
            return Some(line_start + offset + marker.len());
        }
        line_start = line_end + 1;
    }

    None
}

fn skip_string(bytes: &[u8], start: usize) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return i + 1,
            b'\n' => return i,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn skip_line(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|b| *b == b'\n')
        .map_or(bytes.len(), |p| start + p)
}

/// Leading whitespace of the line containing `pos`
pub(crate) fn line_indent(text: &str, pos: usize) -> &str {
    let line_start = text[..pos].rfind('\n').map_or(0, |p| p + 1);
    let line = &text[line_start..];
    let trimmed = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - trimmed.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARIABLES: &str = r#"variable "region" {
  description = "old"
  type        = string
}

variable "region_alias" {
  type        = string
  description = "Alias # not a comment"
}

variable "listeners" {
  description = <<EOT
    Listener definitions.

    @since 1.1.0
  EOT
  type = list(object({
    port        = number
    description = string
  }))
  default = []
}

variable "no_desc" {
  type = object({
    description = string
  })
}
"#;

    fn value<'a>(text: &'a str, decl: &Declaration) -> &'a str {
        let range = decl.description.clone().unwrap();
        &text[range]
    }

    #[test]
    fn test_parse_declarations() {
        let index = DefinitionIndex::parse(VARIABLES);
        let names: Vec<&str> = index.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["region", "region_alias", "listeners", "no_desc"]);
    }

    #[test]
    fn test_exact_name_match() {
        let index = DefinitionIndex::parse(VARIABLES);
        let region = index.first("region").unwrap();
        assert_eq!(value(VARIABLES, region), "\"old\"");
        assert_eq!(region.description_indent, "  ");

        let alias = index.first("region_alias").unwrap();
        assert_eq!(value(VARIABLES, alias), "\"Alias # not a comment\"");
        assert!(index.first("regio").is_none());
    }

    #[test]
    fn test_heredoc_value_span() {
        let index = DefinitionIndex::parse(VARIABLES);
        let listeners = index.first("listeners").unwrap();
        let text = value(VARIABLES, listeners);
        assert!(text.starts_with("<<EOT\n"));
        assert!(text.ends_with("  EOT"));
        assert!(text.contains("@since 1.1.0"));
    }

    #[test]
    fn test_nested_description_is_not_block_level() {
        let index = DefinitionIndex::parse(VARIABLES);
        assert!(index.first("no_desc").unwrap().description.is_none());
    }

    #[test]
    fn test_block_span_covers_braces() {
        let index = DefinitionIndex::parse(VARIABLES);
        let region = index.first("region").unwrap();
        let block = &VARIABLES[region.span.clone()];
        assert!(block.starts_with("variable \"region\" {"));
        assert!(block.ends_with('}'));
    }

    #[test]
    fn test_duplicate_declarations_counted() {
        let text = "variable \"a\" {\n  description = \"one\"\n}\nvariable \"a\" {\n  description = \"two\"\n}\n";
        let index = DefinitionIndex::parse(text);
        assert_eq!(index.count("a"), 2);
        assert_eq!(value(text, index.first("a").unwrap()), "\"one\"");
    }

    #[test]
    fn test_single_line_block() {
        let text = "variable \"a\" { description = \"inline\" }\n";
        let index = DefinitionIndex::parse(text);
        let decl = index.first("a").unwrap();
        assert_eq!(value(text, decl), "\"inline\"");
        assert_eq!(decl.span.end, text.len() - 1);
    }

    #[test]
    fn test_unterminated_heredoc_ends_at_line_end() {
        let text = "variable \"a\" { description = <<EOT\n  Desc.\nEOT }\n\nvariable \"b\" {\n  description = \"y\"\n}\n";
        let index = DefinitionIndex::parse(text);
        assert_eq!(value(text, index.first("a").unwrap()), "<<EOT");

        let b = index.first("b").unwrap();
        assert_eq!(value(text, b), "\"y\"");
    }
}
