//! Error types for history serialization and storage

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unsupported command kind: {kind}")]
    UnsupportedVariant { kind: String },

    #[error("Corrupt command payload: {0}")]
    SerializationCorrupt(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Document model error: {0}")]
    DocModel(#[from] doc_model::DocModelError),

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
