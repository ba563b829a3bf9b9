//! The outline tree: an ordered forest of exclusively-owned nodes.

use crate::NodeId;
use rustc_hash::FxHashMap;

/// List marker kind of an outline line.
///
/// Ordered markers are token-agnostic: the digits carry no semantics and
/// always serialize back as `1.`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkerKind {
    /// `-`, `*`, or `+`.
    #[default]
    Unordered,
    /// `<digits>.`.
    Ordered,
}

/// A single outline node.
///
/// Children are exclusively owned; sibling order is significant and defines
/// reading order. `depth` is the distance from a root (root = 0) and always
/// satisfies `child.depth == parent.depth + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineNode {
    /// Stable identity, unique tree-wide.
    pub id: NodeId,
    /// Display text, free of structural markup and id annotations.
    pub text: String,
    /// Distance from the root of this node's subtree (root = 0).
    pub depth: usize,
    /// Marker kind the node was parsed with (and serializes back to).
    pub marker: MarkerKind,
    /// 1-indexed source line in the text this node was parsed from, if any.
    /// Used only by external cursor mapping.
    pub source_line: Option<usize>,
    /// Ordered child nodes.
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    /// Create a node with a fresh id and no children.
    #[must_use]
    pub fn new(text: impl Into<String>, depth: usize) -> Self {
        Self {
            id: NodeId::generate(),
            text: text.into(),
            depth,
            marker: MarkerKind::Unordered,
            source_line: None,
            children: Vec::new(),
        }
    }

    /// Replace the generated id (parsing, tests).
    #[must_use]
    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the marker kind.
    #[must_use]
    pub fn with_marker(mut self, marker: MarkerKind) -> Self {
        self.marker = marker;
        self
    }

    /// Append a child node.
    #[must_use]
    pub fn child(mut self, node: OutlineNode) -> Self {
        self.children.push(node);
        self
    }

    /// Whether this node has any children.
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Iterate this node and all descendants in preorder.
    #[must_use]
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder { stack: vec![self] }
    }
}

/// An ordered forest of [`OutlineNode`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tree {
    roots: Vec<OutlineNode>,
}

impl Tree {
    /// Build a tree from root nodes.
    #[must_use]
    pub fn new(roots: Vec<OutlineNode>) -> Self {
        Self { roots }
    }

    /// The empty forest.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Root-level nodes in reading order.
    #[must_use]
    pub fn roots(&self) -> &[OutlineNode] {
        &self.roots
    }

    /// Mutable access to the root-level nodes.
    ///
    /// Callers editing through this are responsible for keeping `depth`
    /// consistent with nesting; the structural editing ops in [`crate::ops`]
    /// do this for you.
    pub fn roots_mut(&mut self) -> &mut Vec<OutlineNode> {
        &mut self.roots
    }

    /// Whether the forest has no nodes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total node count across the forest.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.preorder().count()
    }

    /// Look up a node by id anywhere in the forest.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&OutlineNode> {
        find_in(&self.roots, id)
    }

    /// Whether a node with this id exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Parent of the node with this id, or `None` for roots and unknown ids.
    ///
    /// Linear walk over the tree; acceptable at interactive outline sizes.
    #[must_use]
    pub fn parent_of(&self, id: &str) -> Option<&OutlineNode> {
        parent_in(&self.roots, id)
    }

    /// Iterate every node in preorder (reading order).
    #[must_use]
    pub fn preorder(&self) -> Preorder<'_> {
        let mut stack: Vec<&OutlineNode> = self.roots.iter().collect();
        stack.reverse();
        Preorder { stack }
    }

    /// All node ids in preorder.
    #[must_use]
    pub fn collect_ids(&self) -> Vec<NodeId> {
        self.preorder().map(|n| n.id.clone()).collect()
    }

    /// Map from node id to display text, for content-aware sizing.
    #[must_use]
    pub fn content_map(&self) -> FxHashMap<NodeId, String> {
        self.preorder()
            .map(|n| (n.id.clone(), n.text.clone()))
            .collect()
    }
}

/// Preorder traversal over a tree or subtree.
#[derive(Debug)]
pub struct Preorder<'a> {
    stack: Vec<&'a OutlineNode>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a OutlineNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        for child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}

fn find_in<'a>(nodes: &'a [OutlineNode], id: &str) -> Option<&'a OutlineNode> {
    for node in nodes {
        if node.id.as_str() == id {
            return Some(node);
        }
        if let Some(found) = find_in(&node.children, id) {
            return Some(found);
        }
    }
    None
}

fn parent_in<'a>(nodes: &'a [OutlineNode], id: &str) -> Option<&'a OutlineNode> {
    for node in nodes {
        if node.children.iter().any(|c| c.id.as_str() == id) {
            return Some(node);
        }
        if let Some(found) = parent_in(&node.children, id) {
            return Some(found);
        }
    }
    None
}
