//! Standalone overlap resolution, run after a node is dragged.

use crate::LayoutConfig;
use crate::engine::BoundingBox;
use crate::measure::{ContentMap, estimate_node_height};
use mindfold_core::{LayoutMap, NodeId, Point};
use rustc_hash::FxHashMap;

/// Push overlapping nodes apart vertically.
///
/// The left half-plane (`x < 0`) and the right (`x >= 0`) are resolved
/// independently, and only nodes within one column width of each other on
/// the x axis are compared. On a collision the lower node moves below the
/// upper one. Heights come from `content`; ids without an entry size as
/// empty text.
#[must_use]
pub fn resolve_overlaps(
    metadata: &LayoutMap,
    content: &ContentMap,
    config: &LayoutConfig,
) -> LayoutMap {
    resolve_overlaps_owned(metadata.clone(), content, config)
}

pub(crate) fn resolve_overlaps_owned(
    mut result: LayoutMap,
    content: &ContentMap,
    config: &LayoutConfig,
) -> LayoutMap {
    let heights: FxHashMap<NodeId, f64> = result
        .iter()
        .map(|(id, _)| {
            let text = content.get(id.as_str()).map_or("", String::as_str);
            (id.clone(), estimate_node_height(text, config))
        })
        .collect();

    let mut left = Vec::new();
    let mut right = Vec::new();
    for (id, meta) in result.iter() {
        if meta.position.x < 0.0 {
            left.push(id.clone());
        } else {
            right.push(id.clone());
        }
    }
    // Hash map order is arbitrary; fix a scan order so results are stable.
    sort_by_position(&result, &mut left);
    sort_by_position(&result, &mut right);

    resolve_side(&mut result, &left, &heights, config);
    resolve_side(&mut result, &right, &heights, config);
    result
}

fn sort_by_position(map: &LayoutMap, ids: &mut [NodeId]) {
    ids.sort_by(|a, b| {
        let pa = position_of(map, a);
        let pb = position_of(map, b);
        pa.y.total_cmp(&pb.y)
            .then(pa.x.total_cmp(&pb.x))
            .then_with(|| a.cmp(b))
    });
}

fn position_of(map: &LayoutMap, id: &NodeId) -> Point {
    map.get(id.as_str()).map_or(Point::ORIGIN, |m| m.position)
}

fn resolve_side(
    result: &mut LayoutMap,
    ids: &[NodeId],
    heights: &FxHashMap<NodeId, f64>,
    config: &LayoutConfig,
) {
    let x_tolerance = config.column_width();
    let mut changed = true;
    let mut iterations = 0;

    while changed && iterations < config.resolve_max_iterations {
        changed = false;

        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                let pos_a = position_of(result, &ids[i]);
                let pos_b = position_of(result, &ids[j]);
                if (pos_a.x - pos_b.x).abs() >= x_tolerance {
                    continue;
                }

                let height_a = heights.get(&ids[i]).copied().unwrap_or(config.node_height);
                let height_b = heights.get(&ids[j]).copied().unwrap_or(config.node_height);
                let box_a = BoundingBox::new(pos_a, height_a, config);
                let box_b = BoundingBox::new(pos_b, height_b, config);
                if !box_a.overlaps(&box_b, config.min_vertical_gap) {
                    continue;
                }

                // lower node yields; a push to its current y is a fixpoint
                // and does not count as progress
                let (loser, new_y) = if box_a.y <= box_b.y {
                    (&ids[j], box_a.y + box_a.height + config.vertical_gap)
                } else {
                    (&ids[i], box_b.y + box_b.height + config.vertical_gap)
                };
                if let Some(meta) = result.get_mut(loser.as_str()) {
                    if meta.position.y != new_y {
                        meta.position.y = new_y;
                        changed = true;
                    }
                }
            }
        }

        iterations += 1;
    }

    if changed {
        tracing::debug!(iterations, "overlap resolution hit its iteration cap");
    }
}
