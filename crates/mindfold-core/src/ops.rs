//! Structural operations on the outline tree.
//!
//! Every operation is copy-on-write: it clones the input tree, edits the
//! clone, and returns it only on success. A [`TreeOpError::NodeNotFound`]
//! therefore always leaves the caller's value exactly as it was.

use crate::{NodeId, OutlineNode, Tree, TreeOpError, TreeOpResult};
use rustc_hash::FxHashSet;

/// A successful tree edit that introduced a new node.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeEdit {
    /// The edited tree.
    pub tree: Tree,
    /// Id of the node the edit created.
    pub new_id: NodeId,
}

/// Append a new child to the node with `parent_id`.
///
/// The new node inherits the parent's marker kind and sits at
/// `parent.depth + 1`.
pub fn add_child(tree: &Tree, parent_id: &str, text: &str) -> TreeOpResult<TreeEdit> {
    let mut next = tree.clone();
    let Some(parent) = find_mut(next.roots_mut(), parent_id) else {
        return Err(TreeOpError::NodeNotFound(parent_id.into()));
    };

    let node = OutlineNode::new(text, parent.depth + 1).with_marker(parent.marker);
    let new_id = node.id.clone();
    parent.children.push(node);

    Ok(TreeEdit { tree: next, new_id })
}

/// Insert a new sibling immediately after the node with `anchor_id`.
pub fn add_sibling_after(tree: &Tree, anchor_id: &str, text: &str) -> TreeOpResult<TreeEdit> {
    add_sibling(tree, anchor_id, text, false)
}

/// Insert a new sibling immediately before the node with `anchor_id`.
pub fn add_sibling_before(tree: &Tree, anchor_id: &str, text: &str) -> TreeOpResult<TreeEdit> {
    add_sibling(tree, anchor_id, text, true)
}

fn add_sibling(tree: &Tree, anchor_id: &str, text: &str, before: bool) -> TreeOpResult<TreeEdit> {
    let mut next = tree.clone();
    let Some((siblings, index)) = siblings_mut(next.roots_mut(), anchor_id) else {
        return Err(TreeOpError::NodeNotFound(anchor_id.into()));
    };

    let anchor = &siblings[index];
    let node = OutlineNode::new(text, anchor.depth).with_marker(anchor.marker);
    let new_id = node.id.clone();
    let at = if before { index } else { index + 1 };
    siblings.insert(at, node);

    Ok(TreeEdit { tree: next, new_id })
}

/// Remove the node with `id` and its entire subtree.
pub fn delete(tree: &Tree, id: &str) -> TreeOpResult<Tree> {
    let mut next = tree.clone();
    let Some((siblings, index)) = siblings_mut(next.roots_mut(), id) else {
        return Err(TreeOpError::NodeNotFound(id.into()));
    };
    siblings.remove(index);
    Ok(next)
}

/// Remove several nodes (and their subtrees) at once.
///
/// Ids whose ancestor is also selected are filtered out first, so deleting a
/// node together with one of its descendants removes exactly one subtree.
/// Unknown ids are ignored; this operation is total.
#[must_use]
pub fn delete_many(tree: &Tree, ids: &[NodeId]) -> Tree {
    let targets: FxHashSet<NodeId> = filter_redundant(tree, ids).into_iter().collect();
    let mut next = tree.clone();
    prune(next.roots_mut(), &targets);
    next
}

/// Drop ids whose ancestor is also in the selection.
#[must_use]
pub fn filter_redundant(tree: &Tree, ids: &[NodeId]) -> Vec<NodeId> {
    let selected: FxHashSet<&str> = ids.iter().map(NodeId::as_str).collect();
    ids.iter()
        .filter(|id| {
            let mut current = tree.parent_of(id.as_str());
            while let Some(parent) = current {
                if selected.contains(parent.id.as_str()) {
                    return false;
                }
                current = tree.parent_of(parent.id.as_str());
            }
            true
        })
        .cloned()
        .collect()
}

/// Replace the display text of the node with `id`.
pub fn rename(tree: &Tree, id: &str, text: &str) -> TreeOpResult<Tree> {
    let mut next = tree.clone();
    let Some(node) = find_mut(next.roots_mut(), id) else {
        return Err(TreeOpError::NodeNotFound(id.into()));
    };
    node.text = text.to_owned();
    Ok(next)
}

/// Reparent the node with `id` (and its subtree) under `new_parent_id`, or to
/// root level when `None`. Descendant depths are recomputed.
///
/// The node is detached before the new parent is looked up, so moving a node
/// underneath its own subtree fails with `NodeNotFound` and commits nothing.
pub fn move_node(tree: &Tree, id: &str, new_parent_id: Option<&str>) -> TreeOpResult<Tree> {
    let mut next = tree.clone();
    let Some(mut node) = detach(next.roots_mut(), id) else {
        return Err(TreeOpError::NodeNotFound(id.into()));
    };

    match new_parent_id {
        None => {
            node.depth = 0;
            fix_descendant_depths(&mut node);
            next.roots_mut().push(node);
        }
        Some(parent_id) => {
            let Some(parent) = find_mut(next.roots_mut(), parent_id) else {
                return Err(TreeOpError::NodeNotFound(parent_id.into()));
            };
            node.depth = parent.depth + 1;
            fix_descendant_depths(&mut node);
            parent.children.push(node);
        }
    }

    Ok(next)
}

/// Reassign `source_line` in serialization order (1-indexed preorder).
#[must_use]
pub fn renumber_source_lines(tree: &Tree) -> Tree {
    let mut next = tree.clone();
    let mut line = 1usize;
    renumber(next.roots_mut(), &mut line);
    next
}

fn renumber(nodes: &mut [OutlineNode], line: &mut usize) {
    for node in nodes {
        node.source_line = Some(*line);
        *line += 1;
        renumber(&mut node.children, line);
    }
}

fn find_mut<'a>(nodes: &'a mut [OutlineNode], id: &str) -> Option<&'a mut OutlineNode> {
    for node in nodes {
        if node.id.as_str() == id {
            return Some(node);
        }
        if let Some(found) = find_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

fn siblings_mut<'a>(
    nodes: &'a mut Vec<OutlineNode>,
    id: &str,
) -> Option<(&'a mut Vec<OutlineNode>, usize)> {
    if let Some(index) = nodes.iter().position(|n| n.id.as_str() == id) {
        return Some((nodes, index));
    }
    for node in nodes.iter_mut() {
        if let Some(found) = siblings_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

fn detach(nodes: &mut Vec<OutlineNode>, id: &str) -> Option<OutlineNode> {
    if let Some(index) = nodes.iter().position(|n| n.id.as_str() == id) {
        return Some(nodes.remove(index));
    }
    for node in nodes.iter_mut() {
        if let Some(found) = detach(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

fn fix_descendant_depths(node: &mut OutlineNode) {
    let depth = node.depth;
    for child in &mut node.children {
        child.depth = depth + 1;
        fix_descendant_depths(child);
    }
}

fn prune(nodes: &mut Vec<OutlineNode>, targets: &FxHashSet<NodeId>) {
    nodes.retain(|n| !targets.contains(n.id.as_str()));
    for node in nodes.iter_mut() {
        prune(&mut node.children, targets);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MarkerKind;

    fn sample() -> Tree {
        Tree::new(vec![
            OutlineNode::new("Root", 0)
                .with_id("root0000")
                .with_marker(MarkerKind::Ordered)
                .child(
                    OutlineNode::new("First", 1)
                        .with_id("frst0000")
                        .child(OutlineNode::new("Nested", 2).with_id("nest0000")),
                )
                .child(OutlineNode::new("Second", 1).with_id("scnd0000")),
            OutlineNode::new("Other", 0).with_id("othr0000"),
        ])
    }

    #[test]
    fn add_child_appends_and_inherits_marker() {
        let tree = sample();
        let edit = add_child(&tree, "root0000", "Third").expect("parent exists");

        let root = edit.tree.get("root0000").expect("root");
        let added = root.children.last().expect("child added");
        assert_eq!(added.id, edit.new_id);
        assert_eq!(added.text, "Third");
        assert_eq!(added.depth, 1);
        assert_eq!(added.marker, MarkerKind::Ordered);
        // input untouched
        assert_eq!(tree.get("root0000").map(|n| n.children.len()), Some(2));
    }

    #[test]
    fn add_sibling_after_inserts_next_to_anchor() {
        let tree = sample();
        let edit = add_sibling_after(&tree, "frst0000", "Between").expect("anchor exists");
        let root = edit.tree.get("root0000").expect("root");
        let texts: Vec<&str> = root.children.iter().map(|n| n.text.as_str()).collect();
        assert_eq!(texts, ["First", "Between", "Second"]);
        assert_eq!(root.children[1].depth, 1);
    }

    #[test]
    fn add_sibling_before_inserts_ahead_of_anchor() {
        let tree = sample();
        let edit = add_sibling_before(&tree, "scnd0000", "Between").expect("anchor exists");
        let root = edit.tree.get("root0000").expect("root");
        let texts: Vec<&str> = root.children.iter().map(|n| n.text.as_str()).collect();
        assert_eq!(texts, ["First", "Between", "Second"]);
    }

    #[test]
    fn delete_removes_whole_subtree() {
        let tree = sample();
        let next = delete(&tree, "frst0000").expect("node exists");
        assert!(!next.contains("frst0000"));
        assert!(!next.contains("nest0000"));
        assert!(next.contains("scnd0000"));
    }

    #[test]
    fn failed_operation_leaves_input_untouched() {
        let tree = sample();
        let before = tree.clone();

        assert_eq!(
            add_child(&tree, "missing0", "X"),
            Err(TreeOpError::NodeNotFound("missing0".into()))
        );
        assert!(delete(&tree, "missing0").is_err());
        assert!(rename(&tree, "missing0", "X").is_err());
        assert!(move_node(&tree, "missing0", None).is_err());

        assert_eq!(tree, before);
    }

    #[test]
    fn rename_is_in_place_text_mutation() {
        let tree = sample();
        let next = rename(&tree, "nest0000", "Renamed").expect("node exists");
        assert_eq!(next.get("nest0000").map(|n| n.text.as_str()), Some("Renamed"));
        assert_eq!(tree.get("nest0000").map(|n| n.text.as_str()), Some("Nested"));
    }

    #[test]
    fn move_node_reparents_and_fixes_depths() {
        let tree = sample();
        let next = move_node(&tree, "frst0000", Some("othr0000")).expect("both exist");

        let moved = next.get("frst0000").expect("moved node");
        assert_eq!(moved.depth, 1);
        assert_eq!(moved.children[0].depth, 2);
        assert_eq!(
            next.parent_of("frst0000").map(|n| n.id.as_str()),
            Some("othr0000")
        );
    }

    #[test]
    fn move_node_to_root_level() {
        let tree = sample();
        let next = move_node(&tree, "nest0000", None).expect("node exists");

        let moved = next.get("nest0000").expect("moved node");
        assert_eq!(moved.depth, 0);
        assert!(next.parent_of("nest0000").is_none());
        assert_eq!(next.roots().last().map(|n| n.id.as_str()), Some("nest0000"));
    }

    #[test]
    fn move_node_under_own_subtree_fails_cleanly() {
        let tree = sample();
        let before = tree.clone();
        assert!(move_node(&tree, "frst0000", Some("nest0000")).is_err());
        assert_eq!(tree, before);
    }

    #[test]
    fn filter_redundant_drops_descendants_of_selected() {
        let tree = sample();
        let ids: Vec<NodeId> = vec!["frst0000".into(), "nest0000".into(), "othr0000".into()];
        let kept = filter_redundant(&tree, &ids);
        assert_eq!(kept, vec![NodeId::from("frst0000"), NodeId::from("othr0000")]);
    }

    #[test]
    fn delete_many_removes_each_selected_subtree_once() {
        let tree = sample();
        let ids: Vec<NodeId> = vec!["frst0000".into(), "nest0000".into(), "othr0000".into()];
        let next = delete_many(&tree, &ids);

        assert!(!next.contains("frst0000"));
        assert!(!next.contains("nest0000"));
        assert!(!next.contains("othr0000"));
        assert!(next.contains("root0000"));
        assert!(next.contains("scnd0000"));
    }

    #[test]
    fn delete_many_ignores_unknown_ids() {
        let tree = sample();
        let next = delete_many(&tree, &["missing0".into()]);
        assert_eq!(next, tree);
    }

    #[test]
    fn renumber_source_lines_follows_preorder() {
        let tree = sample();
        let next = renumber_source_lines(&tree);
        let lines: Vec<Option<usize>> = next.preorder().map(|n| n.source_line).collect();
        assert_eq!(lines, vec![Some(1), Some(2), Some(3), Some(4), Some(5)]);
    }
}
