//! Initialization Tests
//!
//! - Re-running initialization changes nothing and keeps existing data
//! - Pre-existing duplicates make a unique index build fail
//! - A collection registered with another contract makes setup fail
//! - A file-backed store reopens in its initialized state
//! - Exported validators carry the catalog's rules

use std::fs;

use serde_json::{json, Value};
use tempfile::TempDir;
use transit_schema::catalog::{passengers, transport_catalog, EMAIL_PATTERN};
use transit_schema::index::IndexOutcome;
use transit_schema::init::{InitError, SchemaInitializer, SetupStep};
use transit_schema::schema::{to_json_schema, CollectionSchema, FieldRule};
use transit_schema::store::{CollectionOutcome, DocumentStore, FileStore, MemoryStore, StoreError};

// =============================================================================
// Helper Functions
// =============================================================================

fn passenger(email: &str) -> Value {
    json!({
        "email": email,
        "password": "secret",
        "firstName": "A",
        "lastName": "B",
        "phoneNumber": "+100"
    })
}

fn open_store(dir: &TempDir) -> FileStore {
    FileStore::open(dir.path().join("transport_db.json")).unwrap()
}

// =============================================================================
// Idempotence
// =============================================================================

/// A second run reports everything as existing and leaves documents alone.
#[test]
fn test_rerun_keeps_data() {
    let mut store = MemoryStore::new();
    let init = SchemaInitializer::transport();
    init.run(&mut store).unwrap();

    let id = store.insert("passengers", passenger("a@b.com")).unwrap();

    let report = init.run(&mut store).unwrap();
    assert!(report.is_noop());
    for collection in &report.collections {
        assert_eq!(collection.outcome, CollectionOutcome::AlreadyExists);
        assert!(collection
            .indexes
            .iter()
            .all(|i| i.outcome == IndexOutcome::AlreadyExists));
    }

    let found = store
        .find_eq("passengers", "email", &json!("a@b.com"))
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["_id"], id);

    // uniqueness still enforced after the re-run
    assert!(store.insert("passengers", passenger("a@b.com")).is_err());
}

/// The report lists every declared index in catalog order.
#[test]
fn test_report_matches_catalog() {
    let mut store = MemoryStore::new();
    let report = SchemaInitializer::transport().run(&mut store).unwrap();

    let catalog = transport_catalog();
    assert_eq!(report.collections.len(), catalog.len());
    for (reported, declared) in report.collections.iter().zip(&catalog) {
        assert_eq!(reported.collection, declared.name());
        let names: Vec<_> = reported.indexes.iter().map(|i| i.name.as_str()).collect();
        let expected: Vec<_> = declared.indexes.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, expected);
    }
}

/// Indexes are declared on the store with `_id_` first.
#[test]
fn test_store_index_listing() {
    let mut store = MemoryStore::new();
    SchemaInitializer::transport().run(&mut store).unwrap();

    let names: Vec<_> = store
        .indexes("tickets")
        .unwrap()
        .into_iter()
        .map(|i| i.name)
        .collect();
    assert_eq!(
        names,
        vec!["_id_", "passengerId_1", "tripId_1", "status_1", "createdAt_1"]
    );
}

// =============================================================================
// Failures
// =============================================================================

/// Duplicate emails inserted before the index existed abort setup.
#[test]
fn test_existing_duplicates_fail_index_build() {
    let mut store = MemoryStore::new();
    store.create_collection(passengers().schema).unwrap();
    store.insert("passengers", passenger("a@b.com")).unwrap();
    store.insert("passengers", passenger("a@b.com")).unwrap();

    let err = SchemaInitializer::transport().run(&mut store).unwrap_err();
    match &err {
        InitError::Index {
            collection, index, ..
        } => {
            assert_eq!(collection, "passengers");
            assert_eq!(index, "email_1");
        }
        other => panic!("expected an index failure, got {:?}", other),
    }
    assert_eq!(err.store_error().code(), "TRANSIT_INDEX_BUILD_FAILED");
    assert!(err.to_string().contains("a@b.com"));

    // no partial index was left behind
    let names: Vec<_> = store
        .indexes("passengers")
        .unwrap()
        .into_iter()
        .map(|i| i.name)
        .collect();
    assert_eq!(names, vec!["_id_"]);
    assert_eq!(store.count("passengers").unwrap(), 2);
}

/// A collection registered with another contract is a conflict.
#[test]
fn test_conflicting_contract_fails() {
    let mut store = MemoryStore::new();
    store
        .create_collection(CollectionSchema::new("routes").required("code", FieldRule::string()))
        .unwrap();

    let err = SchemaInitializer::transport().run(&mut store).unwrap_err();
    match err {
        InitError::Collection { collection, source } => {
            assert_eq!(collection, "routes");
            assert!(matches!(source, StoreError::CollectionConflict(name) if name == "routes"));
        }
        other => panic!("expected a collection failure, got {:?}", other),
    }

    // the existing contract is untouched
    assert!(store.schema("routes").unwrap().is_required("code"));
}

/// Same index name on another field is rejected.
#[test]
fn test_conflicting_index_fails() {
    let mut catalog = transport_catalog();
    let mut store = MemoryStore::new();
    SchemaInitializer::new("transport_db", catalog.clone())
        .run(&mut store)
        .unwrap();

    catalog[1].indexes[0] = catalog[1].indexes[0].clone().sparse();
    let err = SchemaInitializer::new("transport_db", catalog)
        .run(&mut store)
        .unwrap_err();
    assert!(matches!(&err, InitError::Index { index, .. } if index == "routeNumber_1"));
    assert_eq!(err.store_error().code(), "TRANSIT_INDEX_OPTIONS_CONFLICT");
}

// =============================================================================
// File-Backed Store
// =============================================================================

/// Reopening a snapshot sees the collections, indexes and documents.
#[test]
fn test_file_store_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = open_store(&dir);
        SchemaInitializer::transport().run(&mut store).unwrap();
        store.insert("passengers", passenger("a@b.com")).unwrap();
    }

    let mut reopened = open_store(&dir);
    assert_eq!(reopened.collection_names().len(), 6);
    assert_eq!(reopened.count("passengers").unwrap(), 1);

    let report = SchemaInitializer::transport().run(&mut reopened).unwrap();
    assert!(report.is_noop());
    assert!(reopened.insert("passengers", passenger("a@b.com")).is_err());
}

/// A snapshot that cannot be written leaves the store as it was, so the
/// same document can be retried once the disk recovers.
#[test]
fn test_failed_write_can_be_retried() {
    let dir = TempDir::new().unwrap();
    let mut store = open_store(&dir);
    SchemaInitializer::transport().run(&mut store).unwrap();

    let blocker = dir.path().join("transport_db.json.tmp");
    fs::create_dir(&blocker).unwrap();

    let err = store.insert("passengers", passenger("a@b.com")).unwrap_err();
    assert!(!err.is_rejection());
    assert_eq!(store.count("passengers").unwrap(), 0);

    fs::remove_dir(&blocker).unwrap();
    store.insert("passengers", passenger("a@b.com")).unwrap();

    let reopened = open_store(&dir);
    assert_eq!(reopened.count("passengers").unwrap(), 1);
}

/// An edited snapshot fails its checksum.
#[test]
fn test_tampered_snapshot_rejected() {
    let dir = TempDir::new().unwrap();
    {
        let mut store = open_store(&dir);
        SchemaInitializer::transport().run(&mut store).unwrap();
    }

    let path = dir.path().join("transport_db.json");
    let content = fs::read_to_string(&path).unwrap();
    fs::write(&path, content.replace("routeNumber", "routeNumbre")).unwrap();

    let err = FileStore::open(&path).unwrap_err();
    assert!(matches!(err, StoreError::Corrupt { .. }));
    assert_eq!(err.code(), "TRANSIT_STORE_CORRUPT");
}

/// A missing data directory is a connection failure.
#[test]
fn test_missing_directory() {
    let dir = TempDir::new().unwrap();
    let err = FileStore::open(dir.path().join("nope").join("db.json")).unwrap_err();
    assert!(matches!(err, StoreError::Open { .. }));
}

// =============================================================================
// Export
// =============================================================================

/// Rendered validators carry required lists, enums and patterns.
#[test]
fn test_rendered_validators_match_catalog() {
    for spec in transport_catalog() {
        let rendered = to_json_schema(&spec.schema);
        let body = &rendered["$jsonSchema"];
        assert_eq!(body["bsonType"], "object");
        assert_eq!(body["required"], json!(spec.schema.required));

        for prop in &spec.schema.properties {
            let out = &body["properties"][&prop.name];
            assert_eq!(out["bsonType"], prop.rule.bson_type.type_name());
            if let Some(values) = &prop.rule.enum_values {
                assert_eq!(out["enum"], json!(values));
            }
        }
    }

    let rendered = to_json_schema(&passengers().schema);
    let props = &rendered["$jsonSchema"]["properties"];
    assert_eq!(props["email"]["pattern"], EMAIL_PATTERN);
    assert_eq!(props["password"]["minLength"], 6);
}

/// The plan creates every collection before any index.
#[test]
fn test_plan_commands() {
    let plan = SchemaInitializer::transport().plan();
    let first_index = plan
        .iter()
        .position(|s| matches!(s, SetupStep::CreateIndexes { .. }))
        .unwrap();
    assert_eq!(first_index, 6);

    let commands: Vec<Value> = plan.iter().map(SetupStep::to_command).collect();
    assert_eq!(commands[0]["create"], "passengers");
    assert_eq!(
        commands[6]["indexes"][0],
        json!({"key": {"email": 1}, "name": "email_1", "unique": true})
    );
}
