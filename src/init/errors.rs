//! Initialization errors
//!
//! Every variant is fatal: setup stops at the first failure and is not
//! retried. Steps already applied stay applied; re-running is safe.

use thiserror::Error;

use crate::store::StoreError;

/// Result type for initialization
pub type InitResult<T> = Result<T, InitError>;

#[derive(Debug, Error)]
pub enum InitError {
    /// The database could not be reached, so no collection was created
    #[error("Cannot connect to database: {0}")]
    Connection(#[source] StoreError),

    /// A collection contract could not be registered
    #[error("Failed to create collection '{collection}': {source}")]
    Collection {
        collection: String,
        #[source]
        source: StoreError,
    },

    /// An index could not be created
    #[error("Failed to create index '{index}' on '{collection}': {source}")]
    Index {
        collection: String,
        index: String,
        #[source]
        source: StoreError,
    },
}

impl InitError {
    pub fn code(&self) -> &'static str {
        match self {
            InitError::Connection(_) => "TRANSIT_INIT_CONNECTION_FAILED",
            InitError::Collection { .. } => "TRANSIT_INIT_COLLECTION_FAILED",
            InitError::Index { .. } => "TRANSIT_INIT_INDEX_FAILED",
        }
    }

    /// The store error underneath
    pub fn store_error(&self) -> &StoreError {
        match self {
            InitError::Connection(source)
            | InitError::Collection { source, .. }
            | InitError::Index { source, .. } => source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexError;

    #[test]
    fn test_index_error_names_key() {
        let err = InitError::Index {
            collection: "passengers".into(),
            index: "email_1".into(),
            source: IndexError::build_failed("passengers", "email_1", "\"a@b.com\"").into(),
        };
        assert_eq!(err.code(), "TRANSIT_INIT_INDEX_FAILED");
        let msg = err.to_string();
        assert!(msg.contains("email_1"));
        assert!(msg.contains("a@b.com"));
        assert_eq!(err.store_error().code(), "TRANSIT_INDEX_BUILD_FAILED");
    }

    #[test]
    fn test_connection_error() {
        let err = InitError::Connection(StoreError::Open {
            path: "/nope/db.json".into(),
            reason: "parent directory does not exist".into(),
        });
        assert_eq!(err.code(), "TRANSIT_INIT_CONNECTION_FAILED");
        assert!(err.to_string().starts_with("Cannot connect to database"));
    }
}
