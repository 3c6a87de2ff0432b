//! Error types for editing operations
//!
//! None of these escape `CommandStack::execute`, `undo` or `redo`; the stack
//! turns them into diagnostics and the operation becomes a no-op.

use doc_model::{DocModelError, FileId, ObjectId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("Target file {0} is no longer available")]
    StaleTarget(FileId),

    #[error("Position {position} is out of range for a buffer of length {len}")]
    OutOfRangePosition { position: usize, len: usize },

    #[error("Embedded object not found: {0}")]
    ObjectNotFound(ObjectId),

    #[error("Content does not match the command: {0}")]
    Inconsistent(String),

    #[error("Document model error: {0}")]
    DocModel(#[source] DocModelError),
}

impl EditError {
    /// Whether the error means the target document is gone
    pub fn is_stale(&self) -> bool {
        matches!(self, EditError::StaleTarget(_))
    }
}

impl From<DocModelError> for EditError {
    fn from(error: DocModelError) -> Self {
        match error {
            DocModelError::FileNotFound(id) => EditError::StaleTarget(id),
            DocModelError::RangeOutOfBounds { end, len, .. } => {
                EditError::OutOfRangePosition { position: end, len }
            }
            DocModelError::ObjectNotFound(id) => EditError::ObjectNotFound(id),
            other => EditError::DocModel(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, EditError>;
