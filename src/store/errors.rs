//! Store errors

use thiserror::Error;

use crate::index::IndexError;
use crate::schema::SchemaError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Document store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Cannot open store at {path}: {reason}")]
    Open { path: String, reason: String },

    #[error("Store snapshot {path} is corrupt: {reason}")]
    Corrupt { path: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Collection not found: {0}")]
    UnknownCollection(String),

    #[error("Collection '{0}' already exists with a different validator")]
    CollectionConflict(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Index(#[from] IndexError),
}

impl StoreError {
    /// Stable error code for client-facing output
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Open { .. } => "TRANSIT_STORE_OPEN_FAILED",
            StoreError::Corrupt { .. } => "TRANSIT_STORE_CORRUPT",
            StoreError::Io(_) => "TRANSIT_STORE_IO",
            StoreError::UnknownCollection(_) => "TRANSIT_STORE_UNKNOWN_COLLECTION",
            StoreError::CollectionConflict(_) => "TRANSIT_STORE_COLLECTION_CONFLICT",
            StoreError::Schema(e) => e.code().code(),
            StoreError::Index(e) => e.code().code(),
        }
    }

    /// Whether the write was rejected by the collection's contract or a unique index
    pub fn is_rejection(&self) -> bool {
        match self {
            StoreError::Schema(e) => !e.is_fatal(),
            StoreError::Index(e) => !e.is_fatal(),
            _ => false,
        }
    }
}
