//! Per-node layout metadata and the sparse layout map.

use crate::{NodeId, Tree};
use rustc_hash::{FxHashMap, FxHashSet};

/// A 2D world coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "persistence", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// The diagram origin.
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Which half-plane a depth-1 branch (and all its descendants) occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "persistence", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Left,
    #[default]
    Right,
}

impl Direction {
    /// Sign of the half-plane on the x axis.
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    /// The half-plane a given x coordinate falls in.
    #[must_use]
    pub fn of_x(x: f64) -> Self {
        if x < 0.0 { Self::Left } else { Self::Right }
    }
}

/// Layout state of a single node.
///
/// `direction` is only meaningful for depth-1 nodes; descendants inherit
/// their depth-1 ancestor's direction and store `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "persistence", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeMetadata {
    pub position: Point,
    pub expanded: bool,
    pub direction: Option<Direction>,
}

impl NodeMetadata {
    /// Metadata at a position, expanded, with no direction of its own.
    #[must_use]
    pub fn at(position: Point) -> Self {
        Self {
            position,
            expanded: true,
            direction: None,
        }
    }
}

impl Default for NodeMetadata {
    fn default() -> Self {
        Self::at(Point::ORIGIN)
    }
}

/// Sparse map from node id to layout metadata.
///
/// Absence of an entry means "not yet laid out", never "invalid". Entries
/// for ids no longer in the tree are harmless garbage; see
/// [`prune_orphans`](Self::prune_orphans).
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "persistence",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct LayoutMap {
    entries: FxHashMap<NodeId, NodeMetadata>,
}

impl LayoutMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&NodeMetadata> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut NodeMetadata> {
        self.entries.get_mut(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn insert(&mut self, id: NodeId, metadata: NodeMetadata) -> Option<NodeMetadata> {
        self.entries.insert(id, metadata)
    }

    pub fn remove(&mut self, id: &str) -> Option<NodeMetadata> {
        self.entries.remove(id)
    }

    /// Stored direction of a node, if any.
    #[must_use]
    pub fn direction_of(&self, id: &str) -> Option<Direction> {
        self.entries.get(id).and_then(|m| m.direction)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &NodeMetadata)> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&NodeId, &mut NodeMetadata)> {
        self.entries.iter_mut()
    }

    /// Drop entries whose id no longer appears in `tree`.
    ///
    /// Pure housekeeping: orphaned entries never affect correctness, this
    /// just keeps long-lived maps from growing without bound. Returns the
    /// number of entries removed.
    pub fn prune_orphans(&mut self, tree: &Tree) -> usize {
        let live: FxHashSet<&str> = tree.preorder().map(|n| n.id.as_str()).collect();
        let before = self.entries.len();
        self.entries.retain(|id, _| live.contains(id.as_str()));
        before - self.entries.len()
    }
}

impl FromIterator<(NodeId, NodeMetadata)> for LayoutMap {
    fn from_iter<T: IntoIterator<Item = (NodeId, NodeMetadata)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for LayoutMap {
    type Item = (NodeId, NodeMetadata);
    type IntoIter = std::collections::hash_map::IntoIter<NodeId, NodeMetadata>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
