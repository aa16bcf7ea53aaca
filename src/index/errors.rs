//! Index error types
//!
//! Error codes:
//! - TRANSIT_INDEX_DUPLICATE_KEY (REJECT)
//! - TRANSIT_INDEX_INVALID_ID (REJECT)
//! - TRANSIT_INDEX_BUILD_FAILED (FATAL)
//! - TRANSIT_INDEX_OPTIONS_CONFLICT (FATAL)

use std::fmt;

pub use crate::schema::Severity;

/// Index-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexErrorCode {
    /// Insert would duplicate a unique key
    DuplicateKey,
    /// Document `_id` is missing or not indexable
    InvalidId,
    /// Unique index build found duplicates in existing data
    BuildFailed,
    /// An index with the same name or field exists with other options
    OptionsConflict,
}

impl IndexErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            IndexErrorCode::DuplicateKey => "TRANSIT_INDEX_DUPLICATE_KEY",
            IndexErrorCode::InvalidId => "TRANSIT_INDEX_INVALID_ID",
            IndexErrorCode::BuildFailed => "TRANSIT_INDEX_BUILD_FAILED",
            IndexErrorCode::OptionsConflict => "TRANSIT_INDEX_OPTIONS_CONFLICT",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            IndexErrorCode::DuplicateKey | IndexErrorCode::InvalidId => Severity::Reject,
            IndexErrorCode::BuildFailed | IndexErrorCode::OptionsConflict => Severity::Fatal,
        }
    }
}

impl fmt::Display for IndexErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Index error type with full context
#[derive(Debug, Clone)]
pub struct IndexError {
    code: IndexErrorCode,
    message: String,
    index: Option<String>,
}

impl IndexError {
    /// Create a duplicate key error for an insert
    pub fn duplicate_key(collection: &str, index: &str, key: impl fmt::Display) -> Self {
        Self {
            code: IndexErrorCode::DuplicateKey,
            message: format!(
                "E11000 duplicate key error collection: {} index: {} dup key: {}",
                collection, index, key
            ),
            index: Some(index.to_string()),
        }
    }

    /// Create an invalid `_id` error
    pub fn invalid_id(collection: &str, reason: impl Into<String>) -> Self {
        Self {
            code: IndexErrorCode::InvalidId,
            message: format!("Invalid _id in '{}': {}", collection, reason.into()),
            index: Some("_id_".to_string()),
        }
    }

    /// Create a build failed error for a unique index over duplicate data
    pub fn build_failed(collection: &str, index: &str, key: impl fmt::Display) -> Self {
        Self {
            code: IndexErrorCode::BuildFailed,
            message: format!(
                "Unique index '{}' on '{}' cannot be built: existing documents share key {}; remove the duplicates and re-run",
                index, collection, key
            ),
            index: Some(index.to_string()),
        }
    }

    /// Create an options conflict error
    pub fn options_conflict(collection: &str, index: &str, reason: impl Into<String>) -> Self {
        Self {
            code: IndexErrorCode::OptionsConflict,
            message: format!(
                "Index '{}' on '{}' conflicts with an existing index: {}",
                index,
                collection,
                reason.into()
            ),
            index: Some(index.to_string()),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> IndexErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the index name if applicable
    pub fn index(&self) -> Option<&str> {
        self.index.as_deref()
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for IndexError {}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;
