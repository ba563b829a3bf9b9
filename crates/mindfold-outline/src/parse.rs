//! Outline text → [`Tree`] parsing.

use crate::annotation;
use mindfold_core::{MarkerKind, NodeId, OutlineNode, Tree};

/// Spaces per depth level in the indent.
const INDENT_UNIT_WIDTH: usize = 2;
/// A tab counts as this many spaces when normalizing the indent.
const TAB_WIDTH: usize = 4;

/// A line that matched the outline grammar, borrowed from the source.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RawLine<'a> {
    /// The literal leading whitespace, preserved for in-place rewrites.
    pub indent: &'a str,
    /// The literal marker token (`-`, `*`, `+`, or `<digits>.`).
    pub marker: &'a str,
    pub kind: MarkerKind,
    /// Trimmed content, possibly still carrying an id annotation.
    pub content: &'a str,
    /// Indent-derived level (not yet normalized to structural depth).
    pub level: usize,
}

/// Match one line against `<indent><marker><space><content>`.
pub(crate) fn match_list_line(line: &str) -> Option<RawLine<'_>> {
    let bytes = line.as_bytes();
    let mut i = 0;
    let mut width = 0;
    while i < bytes.len() {
        match bytes[i] {
            b' ' => width += 1,
            b'\t' => width += TAB_WIDTH,
            _ => break,
        }
        i += 1;
    }
    let indent = &line[..i];
    let rest = &line[i..];

    let (marker_len, kind) = match rest.as_bytes().first() {
        Some(b'-' | b'*' | b'+') => (1, MarkerKind::Unordered),
        Some(b'0'..=b'9') => {
            let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
            if !rest[digits..].starts_with('.') {
                return None;
            }
            (digits + 1, MarkerKind::Ordered)
        }
        _ => return None,
    };
    let marker = &rest[..marker_len];

    let after = &rest[marker_len..];
    if !after.starts_with([' ', '\t']) {
        return None;
    }
    let content = after.trim();
    if content.is_empty() {
        return None;
    }

    Some(RawLine {
        indent,
        marker,
        kind,
        content,
        level: width / INDENT_UNIT_WIDTH,
    })
}

pub(crate) fn tokenize(text: &str) -> Vec<TokenizedLine> {
    text.split('\n')
        .enumerate()
        .filter_map(|(index, line)| {
            match_list_line(line).map(|raw| TokenizedLine {
                id: annotation::extract_id(raw.content).map(NodeId::from),
                text: annotation::strip_annotation(raw.content),
                level: raw.level,
                kind: raw.kind,
                line_no: index + 1,
            })
        })
        .collect()
}

/// A tokenized list line, annotation already split off.
#[derive(Debug, Clone)]
pub(crate) struct TokenizedLine {
    pub id: Option<NodeId>,
    pub text: String,
    pub level: usize,
    pub kind: MarkerKind,
    pub line_no: usize,
}

/// Attach tokens into a forest with a stack of open ancestors.
///
/// Raw indent levels drive the stack (so over-indented lines still nest under
/// the nearest shallower line); structural depths are normalized afterwards
/// so that `child.depth == parent.depth + 1` always holds.
pub(crate) fn build_forest(tokens: Vec<TokenizedLine>) -> Tree {
    let mut roots: Vec<OutlineNode> = Vec::new();
    // Stack of open ancestors; `depth` temporarily holds the raw indent level.
    let mut stack: Vec<OutlineNode> = Vec::new();

    for token in tokens {
        let node = OutlineNode {
            id: token.id.unwrap_or_else(NodeId::generate),
            text: token.text,
            depth: token.level,
            marker: token.kind,
            source_line: Some(token.line_no),
            children: Vec::new(),
        };

        while stack.last().is_some_and(|top| top.depth >= node.depth) {
            pop_and_attach(&mut stack, &mut roots);
        }
        stack.push(node);
    }
    while !stack.is_empty() {
        pop_and_attach(&mut stack, &mut roots);
    }

    normalize_depths(&mut roots, 0);
    Tree::new(roots)
}

fn pop_and_attach(stack: &mut Vec<OutlineNode>, roots: &mut Vec<OutlineNode>) {
    if let Some(done) = stack.pop() {
        match stack.last_mut() {
            Some(parent) => parent.children.push(done),
            None => roots.push(done),
        }
    }
}

fn normalize_depths(nodes: &mut [OutlineNode], depth: usize) {
    for node in nodes {
        node.depth = depth;
        normalize_depths(&mut node.children, depth + 1);
    }
}

/// Parse outline text into a tree.
///
/// Annotated lines keep their embedded id; all other list lines get a fresh
/// one. Lines that do not match the grammar are skipped.
#[must_use]
pub fn parse(text: &str) -> Tree {
    build_forest(tokenize(text))
}

/// Result of [`parse_ensuring_ids`].
#[derive(Debug, Clone)]
pub struct EnsuredParse {
    pub tree: Tree,
    /// The input with an id annotation on every list line (internal form).
    /// Non-list lines are preserved byte-for-byte.
    pub internal_text: String,
    /// Whether any line needed a fresh annotation.
    pub changed: bool,
}

/// Parse and annotate: every list line lacking an id gets a fresh one
/// embedded in place.
#[must_use]
pub fn parse_ensuring_ids(text: &str) -> EnsuredParse {
    let mut changed = false;
    let internal_text = text
        .split('\n')
        .map(|line| match match_list_line(line) {
            Some(raw) if annotation::extract_id(raw.content).is_none() => {
                changed = true;
                let id = NodeId::generate();
                format!(
                    "{}{} {}",
                    raw.indent,
                    raw.marker,
                    annotation::embed_id(raw.content, id.as_str())
                )
            }
            _ => line.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("\n");

    let tree = parse(&internal_text);
    EnsuredParse {
        tree,
        internal_text,
        changed,
    }
}
