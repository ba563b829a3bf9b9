#![forbid(unsafe_code)]

//! Outline text ⇄ tree conversion and identity reconciliation.
//!
//! # Line grammar
//!
//! ```text
//! <indent><marker><space><content>[ <!-- id:XXXXXXXX -->]
//! ```
//!
//! `indent` is sequences of spaces or tabs (tab = 4 spaces), two spaces per
//! depth level. `marker` is `-`, `*`, or `+` (unordered) or `<digits>.`
//! (ordered). Lines that do not match the grammar are not represented in
//! the tree, so the round trip is lossy for non-list content.
//!
//! # Two serialized forms
//!
//! The *internal* form always carries id annotations and is what gets
//! persisted and reconciled against; the *display* form never carries them
//! and is what the user edits. [`reconcile`] bridges the two: it maps a
//! freshly parsed display-form text back onto a previous tree's stable
//! identities so that manual diagram arrangement survives text edits.

pub mod annotation;
mod cursor;
mod parse;
mod reconcile;
mod serialize;

pub use cursor::node_at_cursor;
pub use parse::{EnsuredParse, parse, parse_ensuring_ids};
pub use reconcile::{Reconciled, reconcile};
pub use serialize::{IdAnnotations, rewrite_node_text, serialize};

/// Whether the text contains any inline id annotation.
///
/// Used to pick between the ensure-ids path (internal-form input) and full
/// reconciliation (display-form input).
#[must_use]
pub fn has_id_annotations(text: &str) -> bool {
    annotation::extract_id(text).is_some()
}
