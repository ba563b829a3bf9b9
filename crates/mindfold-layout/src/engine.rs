//! Whole-tree placement.

use crate::LayoutConfig;
use crate::measure::estimate_node_height;
use crate::resolve::resolve_overlaps_owned;
use mindfold_core::{Direction, LayoutMap, NodeId, NodeMetadata, OutlineNode, Point, Tree};
use rustc_hash::FxHashMap;

/// Forced directions for depth-1 nodes, consulted before any stored
/// direction. Used by subtree relayout to flip a branch.
pub type DirectionOverrides = FxHashMap<NodeId, Direction>;

/// Axis-aligned box used for collision checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub(crate) fn new(position: Point, height: f64, config: &LayoutConfig) -> Self {
        Self {
            x: position.x,
            y: position.y,
            width: config.node_width,
            height,
        }
    }

    /// Whether the boxes collide when each is inflated by `margin`.
    ///
    /// The comparison is strict, so two boxes separated by exactly `margin`
    /// still count as colliding; callers rely on the bump target being a
    /// fixpoint in that case.
    pub(crate) fn overlaps(&self, other: &BoundingBox, margin: f64) -> bool {
        !(self.x + self.width + margin < other.x
            || other.x + other.width + margin < self.x
            || self.y + self.height + margin < other.y
            || other.y + other.height + margin < self.y)
    }
}

/// Column x coordinate for a depth and direction. Roots sit at 0.
fn column_x(depth: usize, direction: Direction, config: &LayoutConfig) -> f64 {
    if depth == 0 {
        0.0
    } else {
        direction.sign() * depth as f64 * config.column_width()
    }
}

/// Compute positions for every node in the tree.
///
/// Nodes present in `existing` keep their stored position and expansion
/// verbatim; everything else is placed fresh. Roots lay out top to bottom
/// at `x = 0` with a doubled gap between them, each subtree stacks its
/// children below their `start_y` and centers the parent on its first and
/// last child. A final [`resolve_overlaps`](crate::resolve_overlaps) pass
/// runs over the result.
#[must_use]
pub fn calculate_layout(
    tree: &Tree,
    existing: &LayoutMap,
    overrides: &DirectionOverrides,
    config: &LayoutConfig,
) -> LayoutMap {
    if tree.is_empty() {
        return LayoutMap::new();
    }

    let mut placer = Placer {
        config,
        existing,
        overrides,
        result: LayoutMap::new(),
        placed: Vec::with_capacity(tree.node_count()),
    };

    let mut current_y = 0.0;
    for root in tree.roots() {
        let consumed = placer.layout_subtree(root, 0, current_y, Direction::Right);
        current_y += consumed + config.vertical_gap * 2.0;
    }

    resolve_overlaps_owned(placer.result, &tree.content_map(), config)
}

struct Placer<'a> {
    config: &'a LayoutConfig,
    existing: &'a LayoutMap,
    overrides: &'a DirectionOverrides,
    result: LayoutMap,
    placed: Vec<(NodeId, BoundingBox)>,
}

impl Placer<'_> {
    /// Vertical extent a subtree wants: the larger of the node's own height
    /// and its stacked children.
    fn subtree_height(&self, node: &OutlineNode) -> f64 {
        let height = estimate_node_height(&node.text, self.config);
        if node.children.is_empty() {
            return height;
        }
        let children = node
            .children
            .iter()
            .map(|child| self.subtree_height(child) + self.config.vertical_gap)
            .sum::<f64>()
            - self.config.vertical_gap;
        height.max(children)
    }

    /// Scan downward from `preferred_y` until the node's box clears every
    /// already-placed box, up to the placement iteration cap.
    fn free_y(&self, x: f64, preferred_y: f64, id: &NodeId, height: f64) -> f64 {
        let mut probe = BoundingBox::new(Point::new(x, preferred_y), height, self.config);
        for _ in 0..self.config.placement_max_iterations {
            let bump = self
                .placed
                .iter()
                .filter(|(placed_id, _)| placed_id != id)
                .find(|(_, placed)| probe.overlaps(placed, self.config.min_vertical_gap))
                .map(|(_, placed)| placed.y + placed.height + self.config.vertical_gap);

            match bump {
                // A bump that goes nowhere (exactly-at-margin neighbor)
                // cannot make progress on later iterations either.
                Some(y) if y != probe.y => probe.y = y,
                _ => break,
            }
        }
        probe.y
    }

    /// Direction a child should lay out in. Depth-1 children consult the
    /// overrides, then their stored direction, then the inherited ambient;
    /// deeper children always inherit.
    fn child_direction(
        &self,
        parent_depth: usize,
        child_id: &str,
        inherited: Direction,
    ) -> Direction {
        if parent_depth == 0 {
            self.overrides
                .get(child_id)
                .copied()
                .or_else(|| self.existing.direction_of(child_id))
                .unwrap_or(inherited)
        } else {
            inherited
        }
    }

    fn place(
        &mut self,
        node: &OutlineNode,
        depth: usize,
        position: Point,
        height: f64,
        direction: Direction,
    ) {
        self.result.insert(
            node.id.clone(),
            NodeMetadata {
                position,
                expanded: true,
                direction: (depth == 1).then_some(direction),
            },
        );
        self.placed
            .push((node.id.clone(), BoundingBox::new(position, height, self.config)));
    }

    /// Lay out `node` and its descendants, returning the vertical extent
    /// consumed below `start_y`.
    fn layout_subtree(
        &mut self,
        node: &OutlineNode,
        depth: usize,
        start_y: f64,
        direction: Direction,
    ) -> f64 {
        let x = column_x(depth, direction, self.config);
        let height = estimate_node_height(&node.text, self.config);
        let inherited = if depth >= 1 { direction } else { Direction::Right };

        // A stored position wins outright; only its direction field is
        // normalized (depth-1 keeps or adopts one, deeper nodes carry none).
        if let Some(existing) = self.existing.get(node.id.as_str()) {
            let mut kept = *existing;
            kept.direction = if depth == 1 {
                Some(existing.direction.unwrap_or(direction))
            } else {
                None
            };
            self.result.insert(node.id.clone(), kept);
            self.placed.push((
                node.id.clone(),
                BoundingBox::new(existing.position, height, self.config),
            ));

            let mut child_y = start_y;
            for child in &node.children {
                let child_dir = self.child_direction(depth, child.id.as_str(), inherited);
                let consumed = self.layout_subtree(child, depth + 1, child_y, child_dir);
                child_y += consumed + self.config.vertical_gap;
            }
            return self.subtree_height(node);
        }

        if node.children.is_empty() {
            let y = self.free_y(x, start_y, &node.id, height);
            self.place(node, depth, Point::new(x, y), height, direction);
            return height;
        }

        // Children first; the parent centers on them afterwards.
        let mut child_y = start_y;
        let mut slot_ys = Vec::with_capacity(node.children.len());
        for child in &node.children {
            slot_ys.push(child_y);
            let child_dir = self.child_direction(depth, child.id.as_str(), inherited);
            let consumed = self.layout_subtree(child, depth + 1, child_y, child_dir);
            child_y += consumed + self.config.vertical_gap;
        }

        // Center on where the edge children actually landed (they may have
        // been bumped); fall back to the slots they were offered.
        let last = node.children.len() - 1;
        let first_y = self
            .result
            .get(node.children[0].id.as_str())
            .map_or(slot_ys[0], |m| m.position.y);
        let last_y = self
            .result
            .get(node.children[last].id.as_str())
            .map_or(slot_ys[last], |m| m.position.y);
        let center_y = (first_y + last_y) / 2.0;

        let y = self.free_y(x, center_y, &node.id, height);
        self.place(node, depth, Point::new(x, y), height, direction);

        child_y - start_y - self.config.vertical_gap
    }
}
