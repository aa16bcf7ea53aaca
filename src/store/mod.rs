//! Document store subsystem
//!
//! `DocumentStore` is the database handle the initializer works against.
//! Every implementation enforces collection contracts and unique indexes
//! on its own write path, so malformed writes are rejected no matter which
//! service issues them.
//!
//! Implementations:
//! - `MemoryStore`: in-process, used by tests and embedding
//! - `FileStore`: `MemoryStore` persisted to a checksummed snapshot

mod checksum;
mod errors;
mod file;
mod memory;
pub mod object_id;

pub use errors::{StoreError, StoreResult};
pub use file::FileStore;
pub use memory::{CollectionImage, MemoryStore, StoreImage};

use serde_json::Value;

use crate::index::{IndexOutcome, IndexSpec};
use crate::schema::CollectionSchema;

/// Result of declaring a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionOutcome {
    /// The collection did not exist and was created with the contract
    Created,
    /// The collection already existed with an identical contract
    AlreadyExists,
}

/// A writable handle to a document database
pub trait DocumentStore {
    /// Ensures a collection exists with the given contract.
    ///
    /// An existing collection with a different contract is a conflict.
    fn create_collection(&mut self, schema: CollectionSchema) -> StoreResult<CollectionOutcome>;

    /// Ensures an index exists, building it over existing documents.
    fn create_index(&mut self, collection: &str, spec: IndexSpec) -> StoreResult<IndexOutcome>;

    /// Inserts a document and returns its `_id`.
    fn insert(&mut self, collection: &str, document: Value) -> StoreResult<Value>;

    /// Names of all collections, sorted
    fn collection_names(&self) -> Vec<String>;

    /// Contract of a collection
    fn schema(&self, collection: &str) -> Option<&CollectionSchema>;

    /// Indexes of a collection, `_id_` first
    fn indexes(&self, collection: &str) -> Option<Vec<IndexSpec>>;

    /// Number of documents in a collection
    fn count(&self, collection: &str) -> StoreResult<usize>;

    /// Documents whose `field` equals `value`
    fn find_eq(&self, collection: &str, field: &str, value: &Value) -> StoreResult<Vec<Value>>;
}
