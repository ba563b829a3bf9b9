//! Subtree relayout: flip one branch to the other side.

use crate::LayoutConfig;
use crate::engine::{DirectionOverrides, calculate_layout};
use mindfold_core::{Direction, LayoutMap, Tree};

/// Re-lay out the subtree rooted at `id` in `new_direction`, keeping every
/// other node where it is.
///
/// The subtree's stored positions are dropped so the engine places it
/// fresh on the new side; the rest of the map rides through as existing
/// positions. An unknown id returns the map unchanged.
#[must_use]
pub fn relayout_subtree(
    id: &str,
    new_direction: Direction,
    tree: &Tree,
    existing: &LayoutMap,
    config: &LayoutConfig,
) -> LayoutMap {
    let Some(target) = tree.get(id) else {
        return existing.clone();
    };

    let mut pruned = existing.clone();
    for node in target.preorder() {
        pruned.remove(node.id.as_str());
    }

    let overrides: DirectionOverrides = [(target.id.clone(), new_direction)].into_iter().collect();
    calculate_layout(tree, &pruned, &overrides, config)
}
