//! Cursor position → outline node mapping.

use mindfold_core::{OutlineNode, Tree};

/// Find the node whose source line contains the byte offset `cursor` in
/// `text`.
///
/// `text` must be the same text `tree` was parsed from, so that the nodes'
/// recorded source lines agree with it. Offsets past the end clamp to the
/// last line; lines without a node (blank lines, prose) yield `None`.
#[must_use]
pub fn node_at_cursor<'t>(text: &str, cursor: usize, tree: &'t Tree) -> Option<&'t OutlineNode> {
    let clamped = cursor.min(text.len());
    let line = text.as_bytes()[..clamped]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1;
    tree.preorder().find(|node| node.source_line == Some(line))
}
