//! In-memory document store
//!
//! Write path for `insert`:
//! 1. Assign `_id` if absent
//! 2. Validate against the collection contract
//! 3. Check every unique index
//! 4. Append the document, then update indexes
//!
//! A rejected write leaves the collection untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::index::{CollectionIndexes, IndexKey, IndexOutcome, IndexSpec, ID_INDEX_NAME};
use crate::schema::{CollectionSchema, SchemaValidator};

use super::errors::{StoreError, StoreResult};
use super::object_id;
use super::{CollectionOutcome, DocumentStore};

#[derive(Debug, Clone)]
struct Collection {
    validator: SchemaValidator,
    indexes: CollectionIndexes,
    documents: Vec<Value>,
}

impl Collection {
    fn slots(&self) -> impl Iterator<Item = (u64, &Value)> {
        self.documents.iter().enumerate().map(|(i, d)| (i as u64, d))
    }
}

/// Serializable image of one collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionImage {
    pub schema: CollectionSchema,
    /// Declared indexes, without the implicit `_id_`
    pub indexes: Vec<IndexSpec>,
    pub documents: Vec<Value>,
}

/// Serializable image of a whole store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreImage {
    pub collections: Vec<CollectionImage>,
}

/// Document store kept entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: BTreeMap<String, Collection>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures the store contents
    pub fn to_image(&self) -> StoreImage {
        StoreImage {
            collections: self
                .collections
                .values()
                .map(|c| CollectionImage {
                    schema: c.validator.schema().clone(),
                    indexes: c
                        .indexes
                        .specs()
                        .into_iter()
                        .filter(|s| s.name != ID_INDEX_NAME)
                        .collect(),
                    documents: c.documents.clone(),
                })
                .collect(),
        }
    }

    /// Rebuilds a store from an image.
    ///
    /// Contracts are recompiled and every index is rebuilt from the
    /// documents, so an image that violates its own unique indexes fails.
    pub fn from_image(image: StoreImage) -> StoreResult<Self> {
        let mut store = Self::new();
        for coll in image.collections {
            let name = coll.schema.collection.clone();
            let mut collection = Collection {
                validator: SchemaValidator::new(coll.schema)?,
                indexes: CollectionIndexes::new(&name),
                documents: Vec::with_capacity(coll.documents.len()),
            };
            for doc in coll.documents {
                collection.indexes.check_insert(&doc)?;
                collection
                    .indexes
                    .apply_insert(collection.documents.len() as u64, &doc);
                collection.documents.push(doc);
            }
            for spec in coll.indexes {
                let Collection {
                    indexes, documents, ..
                } = &mut collection;
                indexes.create_index(
                    spec,
                    documents.iter().enumerate().map(|(i, d)| (i as u64, d)),
                )?;
            }
            store.collections.insert(name, collection);
        }
        Ok(store)
    }

    fn collection(&self, name: &str) -> StoreResult<&Collection> {
        self.collections
            .get(name)
            .ok_or_else(|| StoreError::UnknownCollection(name.to_string()))
    }

    fn collection_mut(&mut self, name: &str) -> StoreResult<&mut Collection> {
        self.collections
            .get_mut(name)
            .ok_or_else(|| StoreError::UnknownCollection(name.to_string()))
    }
}

/// Puts `_id` first, generating an ObjectId when absent
fn with_id(document: Value) -> Value {
    match document {
        Value::Object(fields) => {
            let id = fields.get("_id").cloned().unwrap_or_else(object_id::generate);
            let mut ordered = Map::with_capacity(fields.len() + 1);
            ordered.insert("_id".to_string(), id);
            ordered.extend(fields.into_iter().filter(|(k, _)| k != "_id"));
            Value::Object(ordered)
        }
        other => other,
    }
}

impl DocumentStore for MemoryStore {
    fn create_collection(&mut self, schema: CollectionSchema) -> StoreResult<CollectionOutcome> {
        let validator = SchemaValidator::new(schema)?;
        let name = validator.schema().collection.clone();

        if let Some(existing) = self.collections.get(&name) {
            if existing.validator.schema() == validator.schema() {
                return Ok(CollectionOutcome::AlreadyExists);
            }
            return Err(StoreError::CollectionConflict(name));
        }

        self.collections.insert(
            name.clone(),
            Collection {
                validator,
                indexes: CollectionIndexes::new(name),
                documents: Vec::new(),
            },
        );
        Ok(CollectionOutcome::Created)
    }

    fn create_index(&mut self, collection: &str, spec: IndexSpec) -> StoreResult<IndexOutcome> {
        let Collection {
            indexes, documents, ..
        } = self.collection_mut(collection)?;
        let outcome = indexes.create_index(
            spec,
            documents.iter().enumerate().map(|(i, d)| (i as u64, d)),
        )?;
        Ok(outcome)
    }

    fn insert(&mut self, collection: &str, document: Value) -> StoreResult<Value> {
        let coll = self.collection_mut(collection)?;
        let document = with_id(document);

        coll.validator.validate_document(&document)?;
        coll.indexes.check_insert(&document)?;

        let slot = coll.documents.len() as u64;
        coll.indexes.apply_insert(slot, &document);
        let id = document.get("_id").cloned().unwrap_or(Value::Null);
        coll.documents.push(document);
        Ok(id)
    }

    fn collection_names(&self) -> Vec<String> {
        self.collections.keys().cloned().collect()
    }

    fn schema(&self, collection: &str) -> Option<&CollectionSchema> {
        self.collections.get(collection).map(|c| c.validator.schema())
    }

    fn indexes(&self, collection: &str) -> Option<Vec<IndexSpec>> {
        self.collections.get(collection).map(|c| c.indexes.specs())
    }

    fn count(&self, collection: &str) -> StoreResult<usize> {
        Ok(self.collection(collection)?.documents.len())
    }

    fn find_eq(&self, collection: &str, field: &str, value: &Value) -> StoreResult<Vec<Value>> {
        let coll = self.collection(collection)?;

        if let Some(slots) = coll.indexes.lookup_eq(field, value) {
            return Ok(slots
                .into_iter()
                .filter_map(|s| coll.documents.get(s as usize).cloned())
                .collect());
        }

        let wanted = IndexKey::from_json(value);
        Ok(coll
            .slots()
            .filter(|(_, doc)| match (doc.get(field), &wanted) {
                (Some(v), Some(key)) => IndexKey::from_json(v).as_ref() == Some(key),
                (Some(v), None) => v == value,
                (None, _) => false,
            })
            .map(|(_, doc)| doc.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldRule;
    use serde_json::json;

    fn routes_schema() -> CollectionSchema {
        CollectionSchema::new("routes")
            .required("routeNumber", FieldRule::string())
            .required("stops", FieldRule::array())
            .optional("isActive", FieldRule::bool())
    }

    fn route(number: &str) -> Value {
        json!({"routeNumber": number, "stops": ["A", "B"]})
    }

    #[test]
    fn test_create_collection_idempotent() {
        let mut store = MemoryStore::new();
        assert_eq!(
            store.create_collection(routes_schema()).unwrap(),
            CollectionOutcome::Created
        );
        assert_eq!(
            store.create_collection(routes_schema()).unwrap(),
            CollectionOutcome::AlreadyExists
        );
        assert_eq!(store.collection_names(), vec!["routes"]);
    }

    #[test]
    fn test_create_collection_conflict() {
        let mut store = MemoryStore::new();
        store.create_collection(routes_schema()).unwrap();

        let changed = routes_schema().optional("color", FieldRule::string());
        let err = store.create_collection(changed).unwrap_err();
        assert!(matches!(err, StoreError::CollectionConflict(ref c) if c == "routes"));
    }

    #[test]
    fn test_insert_assigns_object_id_first() {
        let mut store = MemoryStore::new();
        store.create_collection(routes_schema()).unwrap();

        let id = store.insert("routes", route("R1")).unwrap();
        assert!(crate::schema::value::object_id_hex(&id).is_some());

        let stored = store.find_eq("routes", "_id", &id).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].as_object().unwrap().keys().next().unwrap(), "_id");
    }

    #[test]
    fn test_insert_keeps_given_id() {
        let mut store = MemoryStore::new();
        store.create_collection(routes_schema()).unwrap();
        let id = store
            .insert("routes", json!({"_id": "r-1", "routeNumber": "R1", "stops": []}))
            .unwrap();
        assert_eq!(id, json!("r-1"));
    }

    #[test]
    fn test_rejected_insert_leaves_no_trace() {
        let mut store = MemoryStore::new();
        store.create_collection(routes_schema()).unwrap();
        store
            .create_index("routes", IndexSpec::ascending("routeNumber").unique())
            .unwrap();

        store.insert("routes", route("R1")).unwrap();
        let err = store.insert("routes", route("R1")).unwrap_err();
        assert_eq!(err.code(), "TRANSIT_INDEX_DUPLICATE_KEY");

        let err = store
            .insert("routes", json!({"routeNumber": "R2"}))
            .unwrap_err();
        assert_eq!(err.code(), "TRANSIT_SCHEMA_VALIDATION_FAILED");

        assert_eq!(store.count("routes").unwrap(), 1);
        assert!(store.insert("routes", route("R2")).is_ok());
    }

    #[test]
    fn test_unknown_collection() {
        let mut store = MemoryStore::new();
        let err = store.insert("buses", json!({})).unwrap_err();
        assert!(matches!(err, StoreError::UnknownCollection(_)));
        assert!(store.count("buses").is_err());
        assert!(store
            .create_index("buses", IndexSpec::ascending("plate"))
            .is_err());
    }

    #[test]
    fn test_find_eq_with_and_without_index() {
        let mut store = MemoryStore::new();
        store.create_collection(routes_schema()).unwrap();
        store
            .insert("routes", json!({"routeNumber": "R1", "stops": [], "isActive": true}))
            .unwrap();
        store
            .insert("routes", json!({"routeNumber": "R2", "stops": [], "isActive": false}))
            .unwrap();

        let scanned = store.find_eq("routes", "isActive", &json!(true)).unwrap();
        assert_eq!(scanned.len(), 1);

        store
            .create_index("routes", IndexSpec::ascending("isActive"))
            .unwrap();
        let indexed = store.find_eq("routes", "isActive", &json!(true)).unwrap();
        assert_eq!(indexed, scanned);
    }

    #[test]
    fn test_image_round_trip_rebuilds_indexes() {
        let mut store = MemoryStore::new();
        store.create_collection(routes_schema()).unwrap();
        store
            .create_index("routes", IndexSpec::ascending("routeNumber").unique())
            .unwrap();
        store.insert("routes", route("R1")).unwrap();

        let mut restored = MemoryStore::from_image(store.to_image()).unwrap();
        assert_eq!(restored.count("routes").unwrap(), 1);
        assert_eq!(restored.indexes("routes").unwrap().len(), 2);
        assert!(restored.insert("routes", route("R1")).is_err());
    }

    #[test]
    fn test_image_with_duplicates_fails() {
        let mut image = StoreImage::default();
        image.collections.push(CollectionImage {
            schema: routes_schema(),
            indexes: vec![IndexSpec::ascending("routeNumber").unique()],
            documents: vec![
                json!({"_id": 1, "routeNumber": "R1", "stops": []}),
                json!({"_id": 2, "routeNumber": "R1", "stops": []}),
            ],
        });
        let err = MemoryStore::from_image(image).unwrap_err();
        assert_eq!(err.code(), "TRANSIT_INDEX_BUILD_FAILED");
    }
}
