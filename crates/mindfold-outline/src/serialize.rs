//! [`Tree`] → outline text serialization.

use crate::annotation;
use crate::parse::match_list_line;
use mindfold_core::{MarkerKind, OutlineNode, Tree};

/// Indent unit emitted per depth level.
const INDENT_UNIT: &str = "  ";

/// Whether serialization embeds id annotations.
///
/// `Embed` produces the internal form (persistence, reconciliation);
/// `Strip` produces the display form shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdAnnotations {
    #[default]
    Embed,
    Strip,
}

/// Serialize a tree back to outline text.
///
/// Ordered nodes always render a literal `1.` marker; the digits carry no
/// semantics and are re-parsed token-agnostically.
#[must_use]
pub fn serialize(tree: &Tree, annotations: IdAnnotations) -> String {
    let mut lines = Vec::with_capacity(tree.node_count());
    render(tree.roots(), 0, annotations, &mut lines);
    lines.join("\n")
}

fn render(nodes: &[OutlineNode], depth: usize, annotations: IdAnnotations, lines: &mut Vec<String>) {
    for node in nodes {
        let marker = match node.marker {
            MarkerKind::Ordered => "1.",
            MarkerKind::Unordered => "-",
        };
        let text = match annotations {
            IdAnnotations::Embed => annotation::embed_id(&node.text, node.id.as_str()),
            IdAnnotations::Strip => node.text.clone(),
        };
        lines.push(format!("{}{} {}", INDENT_UNIT.repeat(depth), marker, text));
        render(&node.children, depth + 1, annotations, lines);
    }
}

/// Rewrite a single node's text in-place in an internal-form source,
/// keyed by its id annotation. Lines without that annotation, and sources
/// that do not contain the id at all, pass through unchanged.
#[must_use]
pub fn rewrite_node_text(source: &str, id: &str, new_text: &str) -> String {
    let mut lines: Vec<String> = source.split('\n').map(str::to_owned).collect();
    for line in &mut lines {
        if annotation::extract_id(line) != Some(id) {
            continue;
        }
        let replacement = match_list_line(line)
            .map(|raw| format!("{}{} {new_text} <!-- id:{id} -->", raw.indent, raw.marker));
        if let Some(replacement) = replacement {
            *line = replacement;
        }
        break;
    }
    lines.join("\n")
}
