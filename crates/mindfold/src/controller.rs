//! Whole-document state: one tree, one layout, two texts.

use mindfold_core::{Direction, LayoutMap, NodeId, OutlineNode, Point, Tree, ops};
use mindfold_layout::{
    DirectionOverrides, LayoutConfig, calculate_layout, project, relayout_subtree,
    resolve_overlaps,
};
use mindfold_outline::{IdAnnotations, node_at_cursor, reconcile, serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A mind-map document: the outline tree, its layout, and the two
/// serialized forms of the text.
///
/// `internal_text` carries id annotations and is the persisted form;
/// `display_text` is what an editor shows. Every operation is atomic on the
/// value: a failed structural edit logs at debug level and changes nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct MindMap {
    tree: Tree,
    layout: LayoutMap,
    internal_text: String,
    display_text: String,
    config: LayoutConfig,
    last_modified: u64,
}

impl Default for MindMap {
    fn default() -> Self {
        Self::new()
    }
}

impl MindMap {
    /// An empty document with the default layout geometry.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LayoutConfig::default())
    }

    #[must_use]
    pub fn with_config(config: LayoutConfig) -> Self {
        Self {
            tree: Tree::empty(),
            layout: LayoutMap::new(),
            internal_text: String::new(),
            display_text: String::new(),
            config,
            last_modified: 0,
        }
    }

    /// Parse `text` into a fresh document.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let mut map = Self::new();
        map.set_text(text);
        map
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    #[must_use]
    pub fn layout(&self) -> &LayoutMap {
        &self.layout
    }

    /// The annotated form of the outline (what gets persisted).
    #[must_use]
    pub fn internal_text(&self) -> &str {
        &self.internal_text
    }

    /// The annotation-free form of the outline (what an editor shows).
    #[must_use]
    pub fn display_text(&self) -> &str {
        &self.display_text
    }

    #[must_use]
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Milliseconds since the Unix epoch at the last mutation.
    #[must_use]
    pub fn last_modified(&self) -> u64 {
        self.last_modified
    }

    // -----------------------------------------------------------------------
    // Text editing
    // -----------------------------------------------------------------------

    /// Replace the outline text, reconciling node identities against the
    /// current tree so manual arrangement survives the edit.
    ///
    /// A fresh document (no annotations in the text, nothing laid out yet)
    /// gets a clean layout; otherwise existing positions are kept and
    /// stored directions are pinned through the recalculation.
    pub fn set_text(&mut self, text: &str) {
        let reconciled = reconcile(text, Some(&self.tree));
        let fresh_document = !mindfold_outline::has_id_annotations(text) && self.layout.is_empty();

        let (existing, overrides) = if fresh_document {
            (LayoutMap::new(), DirectionOverrides::default())
        } else {
            let overrides = self
                .layout
                .iter()
                .filter_map(|(id, meta)| meta.direction.map(|d| (id.clone(), d)))
                .collect();
            (self.layout.clone(), overrides)
        };

        self.tree = reconciled.tree;
        self.internal_text = reconciled.internal_text;
        self.display_text = serialize(&self.tree, IdAnnotations::Strip);
        self.layout = calculate_layout(&self.tree, &existing, &overrides, &self.config);
        self.touch();
    }

    // -----------------------------------------------------------------------
    // Diagram editing
    // -----------------------------------------------------------------------

    /// Move one node to `position` (a drag release).
    ///
    /// A depth-1 node dragged across the center line flips its whole branch
    /// to the other side; any other move stores the position and runs one
    /// overlap-resolution pass.
    pub fn update_node_position(&mut self, id: &str, position: Point) {
        let Some((depth, node_id)) = self.depth_and_id(id) else {
            tracing::debug!(node = id, "position update for unknown node");
            return;
        };

        if depth == 1 {
            let new_direction = Direction::of_x(position.x);
            let old_direction = self.layout.direction_of(id).unwrap_or_default();
            if new_direction != old_direction {
                self.layout =
                    relayout_subtree(id, new_direction, &self.tree, &self.layout, &self.config);
                self.touch();
                return;
            }
        }

        let mut entry = self.layout.get(id).copied().unwrap_or_default();
        entry.position = position;
        self.layout.insert(node_id, entry);
        self.layout = resolve_overlaps(&self.layout, &self.tree.content_map(), &self.config);
        self.touch();
    }

    /// Move several nodes at once (a multi-select drag release).
    ///
    /// All positions land first, moved depth-1 nodes adopt the side their
    /// new x falls in, then a single overlap-resolution pass runs. Unknown
    /// ids are skipped.
    pub fn update_node_positions(&mut self, updates: &[(NodeId, Point)]) {
        if updates.is_empty() {
            return;
        }

        for (id, position) in updates {
            let Some((depth, node_id)) = self.depth_and_id(id.as_str()) else {
                tracing::debug!(node = %id, "position update for unknown node");
                continue;
            };
            let mut entry = self.layout.get(id.as_str()).copied().unwrap_or_default();
            entry.position = *position;
            if depth == 1 {
                entry.direction = Some(Direction::of_x(position.x));
            }
            self.layout.insert(node_id, entry);
        }

        self.layout = resolve_overlaps(&self.layout, &self.tree.content_map(), &self.config);
        self.touch();
    }

    /// Toggle whether a node's subtree shows in the projection.
    pub fn toggle_expanded(&mut self, id: &str) {
        let Some((_, node_id)) = self.depth_and_id(id) else {
            tracing::debug!(node = id, "expand toggle for unknown node");
            return;
        };
        let mut entry = self.layout.get(id).copied().unwrap_or_default();
        entry.expanded = !entry.expanded;
        self.layout.insert(node_id, entry);
        self.touch();
    }

    /// Throw away all positions and lay the tree out from scratch.
    pub fn recalculate_layout(&mut self) {
        self.layout = calculate_layout(
            &self.tree,
            &LayoutMap::new(),
            &DirectionOverrides::default(),
            &self.config,
        );
        self.touch();
    }

    // -----------------------------------------------------------------------
    // Structural editing
    // -----------------------------------------------------------------------

    /// Append a child node; returns its id, or `None` if the parent does
    /// not exist.
    pub fn add_child(&mut self, parent_id: &str, text: &str) -> Option<NodeId> {
        match ops::add_child(&self.tree, parent_id, text) {
            Ok(edit) => {
                self.commit_tree(edit.tree, false);
                Some(edit.new_id)
            }
            Err(err) => {
                tracing::debug!(%err, "add child failed");
                None
            }
        }
    }

    /// Insert a sibling after the anchor; returns its id on success.
    pub fn add_sibling_after(&mut self, anchor_id: &str, text: &str) -> Option<NodeId> {
        match ops::add_sibling_after(&self.tree, anchor_id, text) {
            Ok(edit) => {
                self.commit_tree(edit.tree, false);
                Some(edit.new_id)
            }
            Err(err) => {
                tracing::debug!(%err, "add sibling failed");
                None
            }
        }
    }

    /// Insert a sibling before the anchor; returns its id on success.
    pub fn add_sibling_before(&mut self, anchor_id: &str, text: &str) -> Option<NodeId> {
        match ops::add_sibling_before(&self.tree, anchor_id, text) {
            Ok(edit) => {
                self.commit_tree(edit.tree, false);
                Some(edit.new_id)
            }
            Err(err) => {
                tracing::debug!(%err, "add sibling failed");
                None
            }
        }
    }

    /// Delete a node and its subtree. Returns whether anything changed.
    pub fn delete_node(&mut self, id: &str) -> bool {
        match ops::delete(&self.tree, id) {
            Ok(tree) => {
                self.commit_tree(tree, true);
                true
            }
            Err(err) => {
                tracing::debug!(%err, "delete failed");
                false
            }
        }
    }

    /// Delete several nodes at once; redundant descendants of a selected
    /// ancestor are ignored, as are unknown ids.
    pub fn delete_nodes(&mut self, ids: &[NodeId]) {
        if ids.is_empty() {
            return;
        }
        let tree = ops::delete_many(&self.tree, ids);
        self.commit_tree(tree, true);
    }

    /// Replace a node's text. Returns whether anything changed.
    pub fn rename_node(&mut self, id: &str, text: &str) -> bool {
        match ops::rename(&self.tree, id, text) {
            Ok(tree) => {
                self.commit_tree(tree, true);
                true
            }
            Err(err) => {
                tracing::debug!(%err, "rename failed");
                false
            }
        }
    }

    /// Reparent a node (and its subtree); `None` moves it to root level.
    /// Returns whether anything changed.
    pub fn move_node(&mut self, id: &str, new_parent_id: Option<&str>) -> bool {
        match ops::move_node(&self.tree, id, new_parent_id) {
            Ok(tree) => {
                self.commit_tree(tree, true);
                true
            }
            Err(err) => {
                tracing::debug!(%err, "move failed");
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Reading out
    // -----------------------------------------------------------------------

    /// Flat node/edge lists for rendering.
    #[must_use]
    pub fn projection(&self) -> mindfold_layout::Projection {
        project(&self.tree, &self.layout)
    }

    /// The node under a byte offset in the display text.
    #[must_use]
    pub fn node_at_cursor(&self, offset: usize) -> Option<&OutlineNode> {
        node_at_cursor(&self.display_text, offset, &self.tree)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn depth_and_id(&self, id: &str) -> Option<(usize, NodeId)> {
        self.tree.get(id).map(|node| (node.depth, node.id.clone()))
    }

    /// Install an edited tree: renumber source lines, regenerate both text
    /// forms, and relay out (keeping positions only when asked to).
    fn commit_tree(&mut self, tree: Tree, preserve_positions: bool) {
        self.tree = ops::renumber_source_lines(&tree);
        self.internal_text = serialize(&self.tree, IdAnnotations::Embed);
        self.display_text = serialize(&self.tree, IdAnnotations::Strip);

        let existing = if preserve_positions {
            std::mem::take(&mut self.layout)
        } else {
            LayoutMap::new()
        };
        self.layout =
            calculate_layout(&self.tree, &existing, &DirectionOverrides::default(), &self.config);
        self.layout.prune_orphans(&self.tree);
        self.touch();
    }

    fn touch(&mut self) {
        self.last_modified = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
    }
}

// Snapshot support needs field access without widening the public API.
#[cfg(feature = "persistence")]
impl MindMap {
    pub(crate) fn restore(internal_text: &str, layout: LayoutMap, last_modified: u64) -> Self {
        let mut map = Self::new();
        map.layout = layout;
        map.set_text(internal_text);
        map.last_modified = last_modified;
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_of(map: &MindMap, text: &str) -> NodeId {
        map.tree()
            .preorder()
            .find(|n| n.text == text)
            .map(|n| n.id.clone())
            .expect("node present")
    }

    #[test]
    fn from_text_builds_tree_texts_and_layout() {
        let map = MindMap::from_text("- Root\n  - Child");

        assert_eq!(map.tree().node_count(), 2);
        assert_eq!(map.display_text(), "- Root\n  - Child");
        assert!(map.internal_text().contains("<!-- id:"));
        assert_eq!(map.layout().len(), 2);
    }

    #[test]
    fn set_text_keeps_ids_across_edits() {
        let mut map = MindMap::from_text("- Root\n  - Child");
        let child = id_of(&map, "Child");

        map.set_text("- Root\n  - Child\n  - Another");

        assert_eq!(id_of(&map, "Child"), child);
        assert_eq!(map.tree().node_count(), 3);
    }

    #[test]
    fn set_text_keeps_manual_positions_of_surviving_nodes() {
        let mut map = MindMap::from_text("- Root\n  - Child");
        let child = id_of(&map, "Child");
        map.update_node_position(child.as_str(), Point::new(400.0, 700.0));

        map.set_text("- Root\n  - Child\n  - Another");

        let meta = map.layout().get(child.as_str()).expect("entry");
        assert_eq!(meta.position, Point::new(400.0, 700.0));
    }

    #[test]
    fn dragging_a_branch_across_the_center_flips_it() {
        let mut map = MindMap::from_text("- Root\n  - Branch\n    - Leaf");
        let branch = id_of(&map, "Branch");
        let leaf = id_of(&map, "Leaf");

        map.update_node_position(branch.as_str(), Point::new(-300.0, 0.0));

        let branch_meta = map.layout().get(branch.as_str()).expect("entry");
        assert_eq!(branch_meta.direction, Some(Direction::Left));
        assert!(branch_meta.position.x < 0.0);
        assert!(map.layout().get(leaf.as_str()).expect("entry").position.x < 0.0);
    }

    #[test]
    fn dragging_within_the_same_side_just_stores_the_position() {
        let mut map = MindMap::from_text("- Root\n  - Branch");
        let branch = id_of(&map, "Branch");

        map.update_node_position(branch.as_str(), Point::new(500.0, 123.0));

        let meta = map.layout().get(branch.as_str()).expect("entry");
        assert_eq!(meta.position, Point::new(500.0, 123.0));
        assert_eq!(meta.direction, Some(Direction::Right));
    }

    #[test]
    fn batch_update_applies_every_position() {
        let mut map = MindMap::from_text("- A\n- B");
        let a = id_of(&map, "A");
        let b = id_of(&map, "B");

        map.update_node_positions(&[
            (a.clone(), Point::new(0.0, 500.0)),
            (b.clone(), Point::new(0.0, 900.0)),
        ]);

        assert_eq!(
            map.layout().get(a.as_str()).expect("entry").position.y,
            500.0
        );
        assert_eq!(
            map.layout().get(b.as_str()).expect("entry").position.y,
            900.0
        );
    }

    #[test]
    fn toggle_expanded_flips_and_prunes_projection() {
        let mut map = MindMap::from_text("- Root\n  - Branch\n    - Leaf");
        let branch = id_of(&map, "Branch");

        map.toggle_expanded(branch.as_str());
        assert!(!map.layout().get(branch.as_str()).expect("entry").expanded);
        assert_eq!(map.projection().nodes.len(), 2);

        map.toggle_expanded(branch.as_str());
        assert_eq!(map.projection().nodes.len(), 3);
    }

    #[test]
    fn add_child_updates_both_texts() {
        let mut map = MindMap::from_text("- Root");
        let root = id_of(&map, "Root");

        let new_id = map.add_child(root.as_str(), "Task").expect("parent exists");

        assert!(map.tree().contains(new_id.as_str()));
        assert_eq!(map.display_text(), "- Root\n  - Task");
        assert!(map.internal_text().contains(new_id.as_str()));
    }

    #[test]
    fn add_child_to_unknown_parent_is_a_no_op() {
        let mut map = MindMap::from_text("- Root");
        let before = map.clone();

        assert!(map.add_child("missing0", "X").is_none());

        assert_eq!(map.tree(), before.tree());
        assert_eq!(map.display_text(), before.display_text());
    }

    #[test]
    fn delete_preserves_positions_of_remaining_nodes() {
        let mut map = MindMap::from_text("- Root\n  - Keep\n  - Drop");
        let keep = id_of(&map, "Keep");
        let drop = id_of(&map, "Drop");
        map.update_node_position(keep.as_str(), Point::new(600.0, 50.0));

        assert!(map.delete_node(drop.as_str()));

        assert!(!map.tree().contains(drop.as_str()));
        assert!(map.layout().get(drop.as_str()).is_none());
        assert_eq!(
            map.layout().get(keep.as_str()).expect("entry").position,
            Point::new(600.0, 50.0)
        );
    }

    #[test]
    fn adding_resets_layout_deleting_does_not() {
        let mut map = MindMap::from_text("- Root\n  - Child");
        let child = id_of(&map, "Child");
        map.update_node_position(child.as_str(), Point::new(650.0, 75.0));

        map.add_child(id_of(&map, "Root").as_str(), "New");

        // adds relayout from scratch
        let meta = map.layout().get(child.as_str()).expect("entry");
        assert_ne!(meta.position, Point::new(650.0, 75.0));
    }

    #[test]
    fn rename_keeps_identity_and_rewrites_text() {
        let mut map = MindMap::from_text("- Root\n  - Old");
        let target = id_of(&map, "Old");

        assert!(map.rename_node(target.as_str(), "New"));

        assert_eq!(id_of(&map, "New"), target);
        assert_eq!(map.display_text(), "- Root\n  - New");
    }

    #[test]
    fn move_node_reparents_in_the_serialized_text() {
        let mut map = MindMap::from_text("- A\n  - Child\n- B");
        let child = id_of(&map, "Child");
        let b = id_of(&map, "B");

        assert!(map.move_node(child.as_str(), Some(b.as_str())));

        assert_eq!(map.display_text(), "- A\n- B\n  - Child");
        assert_eq!(
            map.tree().parent_of(child.as_str()).map(|n| n.id.clone()),
            Some(b)
        );
    }

    #[test]
    fn delete_nodes_filters_redundant_selection() {
        let mut map = MindMap::from_text("- Root\n  - Branch\n    - Leaf\n  - Other");
        let branch = id_of(&map, "Branch");
        let leaf = id_of(&map, "Leaf");

        map.delete_nodes(&[branch.clone(), leaf.clone()]);

        assert!(!map.tree().contains(branch.as_str()));
        assert!(!map.tree().contains(leaf.as_str()));
        assert_eq!(map.display_text(), "- Root\n  - Other");
    }

    #[test]
    fn node_at_cursor_follows_the_display_text() {
        let map = MindMap::from_text("- Root\n  - Child");
        // inside the second display line
        let offset = map.display_text().find("Child").expect("present");
        assert_eq!(
            map.node_at_cursor(offset).map(|n| n.text.as_str()),
            Some("Child")
        );
    }

    #[test]
    fn recalculate_layout_discards_manual_positions() {
        let mut map = MindMap::from_text("- Root\n  - Child");
        let child = id_of(&map, "Child");
        map.update_node_position(child.as_str(), Point::new(777.0, 88.0));

        map.recalculate_layout();

        let meta = map.layout().get(child.as_str()).expect("entry");
        assert_ne!(meta.position, Point::new(777.0, 88.0));
    }
}
