#![forbid(unsafe_code)]

//! Deterministic bidirectional mind-map layout.
//!
//! Roots sit in a center column at `x = 0`; each depth adds one column of
//! horizontal offset, signed by the branch's [`Direction`]. Depth-1 nodes
//! own their direction (stored in their metadata); every deeper node
//! inherits it from its depth-1 ancestor.
//!
//! [`calculate_layout`] is the whole-tree pass: subtrees stack top to
//! bottom, parents center on their children, and nodes that already have a
//! position in the existing [`LayoutMap`] keep it verbatim so manual
//! arrangement survives recomputation. [`resolve_overlaps`] is the
//! standalone collision pass run after a node is dragged, and
//! [`relayout_subtree`] flips one branch to the other side. [`project`]
//! turns a tree plus its layout into the flat node/edge lists a renderer
//! consumes.
//!
//! Same tree, same map, same config in; same map out. Nothing here draws
//! from randomness or iteration order of hash maps.
//!
//! [`Direction`]: mindfold_core::Direction
//! [`LayoutMap`]: mindfold_core::LayoutMap

mod config;
mod engine;
mod measure;
mod project;
mod relayout;
mod resolve;

pub use config::LayoutConfig;
pub use engine::{DirectionOverrides, calculate_layout};
pub use measure::{ContentMap, estimate_node_height};
pub use project::{DiagramEdge, DiagramNode, Projection, project};
pub use relayout::relayout_subtree;
pub use resolve::resolve_overlaps;
