//! Declaration styles
//!
//! A style knows where a variable's documentation lives in the definition
//! text and how to render a replacement for it.

use super::locate::{line_indent, DefinitionIndex};
use crate::extract::VariableDoc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Which kind of declaration to rewrite
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationStyle {
    /// `variable "<name>" { description = ... }` blocks
    #[default]
    Block,
    /// `<name> = ...` assignments preceded by `///` doc comments
    Assignment,
}

impl std::fmt::Display for DeclarationStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeclarationStyle::Block => write!(f, "block"),
            DeclarationStyle::Assignment => write!(f, "assignment"),
        }
    }
}

/// The span to replace for one variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSite {
    /// Byte span of the documentation to replace
    pub span: Range<usize>,
    /// Indentation of the line holding the field
    pub indent: String,
    /// How many declarations share this name (1 when unique)
    pub declarations: usize,
    /// Other text follows the span on the same line and must move to the next one
    pub break_after: bool,
}

/// Result of looking a variable up in the definition text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    Found(FieldSite),
    /// No declaration with this name
    MissingDeclaration,
    /// Declaration exists but has no documentation field
    MissingField,
}

/// Trait for declaration styles
pub trait DeclarationStrategy: Send + Sync {
    /// Style name
    fn name(&self) -> &str;

    /// Find the documentation site of `var_name` in `text`
    fn locate(&self, text: &str, var_name: &str) -> Located;

    /// Render the replacement for `site`
    fn render(&self, doc: &VariableDoc, site: &FieldSite) -> String;
}

/// Lines of a rendered doc block before any prefix is applied
fn doc_lines(doc: &VariableDoc) -> [String; 3] {
    [
        doc.description.clone(),
        String::new(),
        format!("@since {}", doc.since_version),
    ]
}

/// Rewrites the `description` attribute of `variable` blocks as a heredoc
pub struct BlockStrategy {
    marker: String,
}

impl BlockStrategy {
    pub fn new(marker: &str) -> Self {
        Self {
            marker: marker.to_string(),
        }
    }
}

impl Default for BlockStrategy {
    fn default() -> Self {
        Self::new("EOT")
    }
}

impl DeclarationStrategy for BlockStrategy {
    fn name(&self) -> &str {
        "block"
    }

    fn locate(&self, text: &str, var_name: &str) -> Located {
        let index = DefinitionIndex::parse(text);
        let Some(decl) = index.first(var_name) else {
            return Located::MissingDeclaration;
        };
        let Some(mut span) = decl.description.clone() else {
            return Located::MissingField;
        };

        // A heredoc terminator must stand alone, so swallow the gap before any
        // trailing text (`description = "x" }`) and let render end the line
        let line_end = text[span.end..]
            .find('\n')
            .map_or(text.len(), |p| span.end + p);
        let rest = &text[span.end..line_end];
        let break_after = !rest.trim().is_empty();
        if break_after {
            span.end += rest.len() - rest.trim_start().len();
        }

        Located::Found(FieldSite {
            span,
            indent: decl.description_indent.clone(),
            declarations: index.count(var_name),
            break_after,
        })
    }

    fn render(&self, doc: &VariableDoc, site: &FieldSite) -> String {
        let lines = doc_lines(doc);
        let mut marker = self.marker.clone();
        while lines.iter().any(|line| line.trim() == marker) {
            marker.push('_');
        }

        let prefix = format!("{}  ", site.indent);
        let mut out = format!("<<{}\n", marker);
        for line in lines {
            let rendered = format!("{}{}", prefix, line);
            out.push_str(rendered.trim_end());
            out.push('\n');
        }
        out.push_str(&site.indent);
        out.push_str(&marker);
        if site.break_after {
            out.push('\n');
            out.push_str(&site.indent);
        }
        out
    }
}

/// Rewrites the doc-comment run above a bare `<name> = ...` assignment
pub struct AssignmentStrategy {
    comment_prefix: String,
}

impl AssignmentStrategy {
    pub fn new(comment_prefix: &str) -> Self {
        Self {
            comment_prefix: comment_prefix.to_string(),
        }
    }
}

impl Default for AssignmentStrategy {
    fn default() -> Self {
        Self::new("///")
    }
}

impl DeclarationStrategy for AssignmentStrategy {
    fn name(&self) -> &str {
        "assignment"
    }

    fn locate(&self, text: &str, var_name: &str) -> Located {
        let pattern = format!(r"(?m)^[ \t]*{}[ \t]*=(?:[^=]|$)", regex::escape(var_name));
        let Ok(re) = Regex::new(&pattern) else {
            return Located::MissingDeclaration;
        };

        let mut matches = re.find_iter(text);
        let Some(first) = matches.next() else {
            return Located::MissingDeclaration;
        };
        let declarations = 1 + matches.count();

        let assignment_start = first.start();
        let mut comment_start = assignment_start;
        while comment_start > 0 {
            let prev_end = comment_start - 1;
            let prev_start = text[..prev_end].rfind('\n').map_or(0, |p| p + 1);
            if !text[prev_start..prev_end]
                .trim_start()
                .starts_with(&self.comment_prefix)
            {
                break;
            }
            comment_start = prev_start;
        }

        Located::Found(FieldSite {
            span: comment_start..assignment_start,
            indent: line_indent(text, assignment_start).to_string(),
            declarations,
            break_after: false,
        })
    }

    fn render(&self, doc: &VariableDoc, site: &FieldSite) -> String {
        doc_lines(doc)
            .iter()
            .map(|line| {
                let rendered = format!("{}{} {}", site.indent, self.comment_prefix, line);
                format!("{}\n", rendered.trim_end())
            })
            .collect()
    }
}

/// Build the strategy for `style`
pub fn strategy_for(
    style: DeclarationStyle,
    heredoc_marker: &str,
    comment_prefix: &str,
) -> Box<dyn DeclarationStrategy> {
    match style {
        DeclarationStyle::Block => Box::new(BlockStrategy::new(heredoc_marker)),
        DeclarationStyle::Assignment => Box::new(AssignmentStrategy::new(comment_prefix)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str, description: &str, since: &str) -> VariableDoc {
        VariableDoc {
            indent_level: 0,
            name: name.to_string(),
            since_version: since.to_string(),
            description: description.to_string(),
            annotation: "optional".to_string(),
            default: None,
            path: vec![name.to_string()],
            link_refs: Vec::new(),
            line: 1,
        }
    }

    #[test]
    fn test_block_render() {
        let strategy = BlockStrategy::default();
        let site = FieldSite {
            span: 0..0,
            indent: "  ".to_string(),
            declarations: 1,
            break_after: false,
        };
        let rendered = strategy.render(&doc("region", "AWS region.", "1.2.0"), &site);
        assert_eq!(rendered, "<<EOT\n    AWS region.\n\n    @since 1.2.0\n  EOT");
    }

    #[test]
    fn test_block_render_avoids_marker_in_body() {
        let strategy = BlockStrategy::default();
        let site = FieldSite {
            span: 0..0,
            indent: String::new(),
            declarations: 1,
            break_after: false,
        };
        let rendered = strategy.render(&doc("a", "EOT", "1.0.0"), &site);
        assert_eq!(rendered, "<<EOT_\n  EOT\n\n  @since 1.0.0\nEOT_");

        let strategy = BlockStrategy::new("DOC");
        let rendered = strategy.render(&doc("a", "DOC", "1.0.0"), &site);
        assert!(rendered.starts_with("<<DOC_\n"));
        assert!(rendered.ends_with("\nDOC_"));
    }

    #[test]
    fn test_block_locate_single_line_block() {
        let strategy = BlockStrategy::default();
        let text = "variable \"a\" { description = \"x\" }\n";
        match strategy.locate(text, "a") {
            Located::Found(site) => {
                assert_eq!(&text[site.span.clone()], "\"x\" ");
                assert!(site.break_after);
                assert_eq!(site.indent, "");

                let rendered = strategy.render(&doc("a", "Desc A.", "1.0.0"), &site);
                assert_eq!(rendered, "<<EOT\n  Desc A.\n\n  @since 1.0.0\nEOT\n");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_block_locate_missing() {
        let strategy = BlockStrategy::default();
        let text = "variable \"a\" {\n  type = string\n}\n";
        assert_eq!(strategy.locate(text, "b"), Located::MissingDeclaration);
        assert_eq!(strategy.locate(text, "a"), Located::MissingField);
    }

    #[test]
    fn test_assignment_locate_without_comments() {
        let strategy = AssignmentStrategy::default();
        let text = "region = \"us-east-1\"\nregion_alias = \"x\"\n";
        match strategy.locate(text, "region") {
            Located::Found(site) => {
                assert_eq!(site.span, 0..0);
                assert_eq!(site.declarations, 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_assignment_locate_covers_existing_comments() {
        let strategy = AssignmentStrategy::default();
        let text = "# header\n  /// old\n  ///\n  region = 1\n";
        match strategy.locate(text, "region") {
            Located::Found(site) => {
                assert_eq!(&text[site.span.clone()], "  /// old\n  ///\n");
                assert_eq!(site.indent, "  ");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_assignment_ignores_comparison() {
        let strategy = AssignmentStrategy::default();
        assert_eq!(
            strategy.locate("region == 1\n", "region"),
            Located::MissingDeclaration
        );
    }

    #[test]
    fn test_assignment_render() {
        let strategy = AssignmentStrategy::default();
        let site = FieldSite {
            span: 0..0,
            indent: String::new(),
            declarations: 1,
            break_after: false,
        };
        let rendered = strategy.render(&doc("region", "AWS region.", "1.2.0"), &site);
        assert_eq!(rendered, "/// AWS region.\n///\n/// @since 1.2.0\n");
    }
}
