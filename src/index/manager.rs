//! Per-collection index manager
//!
//! # API
//!
//! - `create_index(spec, documents)` - Declare an index and build it over existing documents
//! - `check_insert(doc)` - Reject a write that would duplicate a unique key
//! - `apply_insert(slot, doc)` - Update indexes after a write
//! - `lookup_eq(field, value)` - Exact match lookup
//!
//! Index builds are all-or-nothing: a failed build leaves no partial index.

use serde_json::Value;

use super::btree::{DocumentSlot, IndexKey, IndexTree};
use super::errors::{IndexError, IndexResult};
use super::types::IndexSpec;

/// Result of declaring an index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOutcome {
    /// The index did not exist and was built
    Created,
    /// An identical index already existed
    AlreadyExists,
}

#[derive(Debug, Clone)]
struct BuiltIndex {
    spec: IndexSpec,
    tree: IndexTree,
}

impl BuiltIndex {
    /// Extracts the key this index stores for a document.
    ///
    /// Missing fields key as null unless the index is sparse.
    fn key_for(&self, doc: &Value) -> Option<IndexKey> {
        match doc.get(&self.spec.field) {
            Some(v) => IndexKey::from_json(v),
            None if self.spec.sparse => None,
            None => Some(IndexKey::Null),
        }
    }
}

/// Indexes of one collection: the implicit `_id_` index plus declared ones
#[derive(Debug, Clone)]
pub struct CollectionIndexes {
    collection: String,
    /// `indexes[0]` is always the primary key index
    indexes: Vec<BuiltIndex>,
}

impl CollectionIndexes {
    /// Creates the index set of an empty collection
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            indexes: vec![BuiltIndex {
                spec: IndexSpec::primary(),
                tree: IndexTree::new(),
            }],
        }
    }

    /// Returns all index declarations, primary first
    pub fn specs(&self) -> Vec<IndexSpec> {
        self.indexes.iter().map(|i| i.spec.clone()).collect()
    }

    /// Returns the number of distinct keys held by an index
    pub fn key_count(&self, name: &str) -> Option<usize> {
        self.indexes
            .iter()
            .find(|i| i.spec.name == name)
            .map(|i| i.tree.key_count())
    }

    /// Declares an index and builds it over the existing documents.
    ///
    /// # Errors
    ///
    /// - `TRANSIT_INDEX_OPTIONS_CONFLICT` if an index with the same name, or
    ///   on the same field, exists with a different definition
    /// - `TRANSIT_INDEX_BUILD_FAILED` if the index is unique and two existing
    ///   documents share a key
    pub fn create_index<'a, I>(&mut self, spec: IndexSpec, documents: I) -> IndexResult<IndexOutcome>
    where
        I: IntoIterator<Item = (DocumentSlot, &'a Value)>,
    {
        if spec.field.is_empty() || spec.name.is_empty() {
            return Err(IndexError::options_conflict(
                &self.collection,
                &spec.name,
                "index name and field must not be empty",
            ));
        }

        if let Some(existing) = self.indexes.iter().find(|i| i.spec.name == spec.name) {
            if existing.spec.same_definition(&spec) {
                return Ok(IndexOutcome::AlreadyExists);
            }
            return Err(IndexError::options_conflict(
                &self.collection,
                &spec.name,
                format!(
                    "existing index has field '{}', unique={}, sparse={}",
                    existing.spec.field, existing.spec.unique, existing.spec.sparse
                ),
            ));
        }

        if let Some(existing) = self.indexes.iter().find(|i| i.spec.field == spec.field) {
            return Err(IndexError::options_conflict(
                &self.collection,
                &spec.name,
                format!(
                    "field '{}' is already indexed as '{}'",
                    spec.field, existing.spec.name
                ),
            ));
        }

        let mut built = BuiltIndex {
            spec,
            tree: IndexTree::new(),
        };
        for (slot, doc) in documents {
            let Some(key) = built.key_for(doc) else {
                continue;
            };
            if built.spec.unique && built.tree.contains(&key) {
                return Err(IndexError::build_failed(
                    &self.collection,
                    &built.spec.name,
                    key,
                ));
            }
            built.tree.insert(key, slot);
        }

        self.indexes.push(built);
        Ok(IndexOutcome::Created)
    }

    /// Checks a document against every unique index before it is written.
    ///
    /// # Errors
    ///
    /// - `TRANSIT_INDEX_INVALID_ID` if `_id` is missing or not indexable
    /// - `TRANSIT_INDEX_DUPLICATE_KEY` if a unique key is already taken
    pub fn check_insert(&self, doc: &Value) -> IndexResult<()> {
        match doc.get("_id") {
            None => return Err(IndexError::invalid_id(&self.collection, "missing")),
            Some(id) if IndexKey::from_json(id).is_none() => {
                return Err(IndexError::invalid_id(
                    &self.collection,
                    "arrays and embedded documents are not supported",
                ))
            }
            Some(_) => {}
        }

        for index in self.indexes.iter().filter(|i| i.spec.unique) {
            if let Some(key) = index.key_for(doc) {
                if index.tree.contains(&key) {
                    return Err(IndexError::duplicate_key(
                        &self.collection,
                        &index.spec.name,
                        key,
                    ));
                }
            }
        }

        Ok(())
    }

    /// Adds a written document to every index.
    ///
    /// Called AFTER `check_insert` succeeded and the document was stored.
    pub fn apply_insert(&mut self, slot: DocumentSlot, doc: &Value) {
        for index in &mut self.indexes {
            if let Some(key) = index.key_for(doc) {
                index.tree.insert(key, slot);
            }
        }
    }

    /// Lookup all slots holding `value` in `field`.
    ///
    /// Returns `None` when no index covers the field.
    pub fn lookup_eq(&self, field: &str, value: &Value) -> Option<Vec<DocumentSlot>> {
        let index = self.indexes.iter().find(|i| i.spec.field == field)?;
        let key = IndexKey::from_json(value)?;
        Some(index.tree.lookup_eq(&key))
    }
}
