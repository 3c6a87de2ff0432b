//! Error types for document model operations

use crate::{FileId, ObjectId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocModelError {
    #[error("Range {start}..{end} is out of bounds for content of length {len}")]
    RangeOutOfBounds { start: usize, end: usize, len: usize },

    #[error("Invalid content: {0}")]
    InvalidContent(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(ObjectId),

    #[error("File not found: {0}")]
    FileNotFound(FileId),

    #[error("Version not found: {0}")]
    VersionNotFound(u64),

    #[error("Version {0} has been superseded and can no longer be edited")]
    SupersededVersion(u64),

    #[error("Duplicate version number: {0}")]
    DuplicateVersion(u64),

    #[error("Corrupt content encoding: {0}")]
    CorruptEncoding(String),
}

pub type Result<T> = std::result::Result<T, DocModelError>;
