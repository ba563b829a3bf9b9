//! The persisted document shape.
//!
//! A snapshot is a plain value: the outline in internal (annotated) form,
//! the layout map, and a format version. No storage I/O happens here; a
//! host hands JSON strings in and out.

use crate::MindMap;
use mindfold_core::LayoutMap;

/// Version tag written into every snapshot.
pub const FORMAT_VERSION: u32 = 1;

/// Everything needed to rebuild a [`MindMap`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Snapshot {
    pub format_version: u32,
    /// The outline in internal form; the annotations are what let the
    /// layout entries find their nodes again.
    pub outline_text: String,
    pub layout: LayoutMap,
    /// Milliseconds since the Unix epoch of the last mutation.
    pub last_modified: u64,
}

impl Snapshot {
    /// Capture the current state of a document.
    #[must_use]
    pub fn capture(map: &MindMap) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            outline_text: map.internal_text().to_owned(),
            layout: map.layout().clone(),
            last_modified: map.last_modified(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl MindMap {
    /// Rebuild a document from a snapshot. Stored positions are adopted
    /// verbatim; nodes the snapshot's layout does not cover are placed
    /// fresh.
    #[must_use]
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self::restore(
            &snapshot.outline_text,
            snapshot.layout.clone(),
            snapshot.last_modified,
        )
    }
}
