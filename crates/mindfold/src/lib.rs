#![forbid(unsafe_code)]

//! Mindfold: a text outline ⇄ mind map core.
//!
//! An outline is plain text, one list item per line; a mind map is the same
//! tree with positions. This crate keeps the two views of one document in
//! sync: text edits flow through the identity reconciler so nodes keep
//! their ids (and with them their manual positions), and diagram edits flow
//! back out as regenerated text.
//!
//! [`MindMap`] is the entry point for whole-document state; the underlying
//! pieces (parsing in `mindfold-outline`, placement in `mindfold-layout`,
//! the model in `mindfold-core`) are re-exported for callers that want to
//! drive them directly.
//!
//! ```
//! use mindfold::MindMap;
//!
//! let mut map = MindMap::from_text("- Project\n  - Idea\n  - Plan");
//! assert_eq!(map.tree().node_count(), 3);
//!
//! let projection = map.projection();
//! assert_eq!(projection.nodes.len(), 3);
//! assert_eq!(projection.edges.len(), 2);
//! ```
//!
//! Everything is deterministic and free of I/O; persistence is a value
//! exchange through [`Snapshot`](crate::Snapshot) behind the `persistence`
//! feature.

mod controller;
#[cfg(feature = "persistence")]
mod snapshot;

pub use controller::MindMap;
#[cfg(feature = "persistence")]
pub use snapshot::{FORMAT_VERSION, Snapshot};

pub use mindfold_core::{
    Direction, ID_LEN, LayoutMap, MarkerKind, NodeId, NodeMetadata, OutlineNode, Point, Tree,
    TreeOpError, TreeOpResult, ops,
};
pub use mindfold_layout::{
    DiagramEdge, DiagramNode, DirectionOverrides, LayoutConfig, Projection, calculate_layout,
    project, relayout_subtree, resolve_overlaps,
};
pub use mindfold_outline::{
    EnsuredParse, IdAnnotations, Reconciled, has_id_annotations, node_at_cursor, parse,
    parse_ensuring_ids, reconcile, rewrite_node_text, serialize,
};
