#![forbid(unsafe_code)]

//! Core data model for Mindfold: the outline tree, stable node identities,
//! and the sparse layout metadata map.
//!
//! # Role in Mindfold
//! `mindfold-core` holds the value types every other crate operates on. The
//! parser (`mindfold-outline`) produces a [`Tree`], the layout engine
//! (`mindfold-layout`) produces a [`LayoutMap`], and the facade controller
//! threads both through pure functions. Nothing in this crate performs I/O.
//!
//! # Ownership model
//! An [`OutlineNode`] exclusively owns its children; a [`Tree`] is an ordered
//! forest of root nodes. Structural edits ([`ops`]) never mutate the caller's
//! tree: they clone, edit the clone, and only return it on success, so a
//! failed operation leaves the original value untouched.
//!
//! # Metadata lifecycle
//! [`LayoutMap`] entries are created lazily the first time a node is laid out
//! or explicitly positioned. Entries whose node has since been deleted are
//! harmless garbage; [`LayoutMap::prune_orphans`] is optional housekeeping,
//! never a correctness requirement.

mod error;
mod id;
mod metadata;
pub mod ops;
mod tree;

pub use error::{TreeOpError, TreeOpResult};
pub use id::{ID_LEN, NodeId};
pub use metadata::{Direction, LayoutMap, NodeMetadata, Point};
pub use tree::{MarkerKind, OutlineNode, Preorder, Tree};
