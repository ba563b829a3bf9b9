//! Error taxonomy for structural tree operations.

use crate::NodeId;
use std::fmt;

/// Failure of a structural tree operation.
///
/// Operations work on a clone and only commit on success, so any error here
/// guarantees the caller's tree value is untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeOpError {
    /// The referenced node id does not exist in the tree.
    NodeNotFound(NodeId),
}

impl fmt::Display for TreeOpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeOpError::NodeNotFound(id) => write!(f, "node not found: {id}"),
        }
    }
}

impl std::error::Error for TreeOpError {}

/// Result type for structural tree operations.
pub type TreeOpResult<T> = Result<T, TreeOpError>;
