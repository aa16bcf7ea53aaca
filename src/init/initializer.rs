//! Schema initializer
//!
//! Applies a catalog to a store in two passes:
//! 1. every collection with its validator, in catalog order
//! 2. every declared index of every collection
//!
//! Both passes are idempotent: identical declarations already present are
//! reported as `AlreadyExists` and existing documents are never touched.
//! The first failure aborts the run.

use serde_json::{json, Value};

use crate::catalog::{transport_catalog, CollectionSpec, DATABASE_NAME};
use crate::index::{IndexOutcome, IndexSpec};
use crate::observability::{log_event_with_fields, Event};
use crate::schema::{to_json_schema, CollectionSchema, SchemaError};
use crate::store::{CollectionOutcome, DocumentStore, StoreError};

use super::errors::{InitError, InitResult};

/// Printed once every collection and index is in place
pub const SUCCESS_MESSAGE: &str = "Database initialization completed successfully!";

/// Outcome of one index declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexReport {
    pub name: String,
    pub outcome: IndexOutcome,
}

/// Outcome of one collection and its indexes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionReport {
    pub collection: String,
    pub outcome: CollectionOutcome,
    pub indexes: Vec<IndexReport>,
}

/// What a successful run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    pub database: String,
    pub collections: Vec<CollectionReport>,
}

impl InitReport {
    pub fn collections_created(&self) -> usize {
        self.collections
            .iter()
            .filter(|c| c.outcome == CollectionOutcome::Created)
            .count()
    }

    pub fn indexes_created(&self) -> usize {
        self.collections
            .iter()
            .flat_map(|c| &c.indexes)
            .filter(|i| i.outcome == IndexOutcome::Created)
            .count()
    }

    /// True when the run found everything already in place
    pub fn is_noop(&self) -> bool {
        self.collections_created() == 0 && self.indexes_created() == 0
    }
}

/// One declaration of a setup plan
#[derive(Debug, Clone, PartialEq)]
pub enum SetupStep {
    CreateCollection(CollectionSchema),
    CreateIndexes {
        collection: String,
        indexes: Vec<IndexSpec>,
    },
}

impl SetupStep {
    /// Renders the equivalent MongoDB database command
    pub fn to_command(&self) -> Value {
        match self {
            SetupStep::CreateCollection(schema) => json!({
                "create": schema.collection,
                "validator": to_json_schema(schema),
                "validationLevel": "strict",
                "validationAction": "error",
            }),
            SetupStep::CreateIndexes {
                collection,
                indexes,
            } => json!({
                "createIndexes": collection,
                "indexes": indexes.iter().map(IndexSpec::to_mongo_index).collect::<Vec<_>>(),
            }),
        }
    }

    pub fn collection(&self) -> &str {
        match self {
            SetupStep::CreateCollection(schema) => &schema.collection,
            SetupStep::CreateIndexes { collection, .. } => collection,
        }
    }
}

/// Applies collection contracts and indexes to a store
#[derive(Debug, Clone)]
pub struct SchemaInitializer {
    database: String,
    catalog: Vec<CollectionSpec>,
}

impl SchemaInitializer {
    pub fn new(database: impl Into<String>, catalog: Vec<CollectionSpec>) -> Self {
        Self {
            database: database.into(),
            catalog,
        }
    }

    /// The transport ticketing catalog on its default database
    pub fn transport() -> Self {
        Self::new(DATABASE_NAME, transport_catalog())
    }

    /// Name reported in logs and in `InitReport`. The store itself is not
    /// partitioned by it.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn catalog(&self) -> &[CollectionSpec] {
        &self.catalog
    }

    /// Steps `run` performs, in order, without touching a store
    pub fn plan(&self) -> Vec<SetupStep> {
        let collections = self
            .catalog
            .iter()
            .map(|spec| SetupStep::CreateCollection(spec.schema.clone()));
        let indexes = self
            .catalog
            .iter()
            .filter(|spec| !spec.indexes.is_empty())
            .map(|spec| SetupStep::CreateIndexes {
                collection: spec.name().to_string(),
                indexes: spec.indexes.clone(),
            });
        collections.chain(indexes).collect()
    }

    /// Applies the catalog to `store`.
    ///
    /// Every contract is checked before the first store call, so a
    /// malformed catalog leaves the store untouched.
    pub fn run<S>(&self, store: &mut S) -> InitResult<InitReport>
    where
        S: DocumentStore + ?Sized,
    {
        log_event_with_fields(
            Event::InitStart,
            &[
                ("database", self.database.as_str()),
                ("collections", self.catalog.len().to_string().as_str()),
            ],
        );

        let result = self.apply(store);
        match &result {
            Ok(report) => log_event_with_fields(
                Event::InitComplete,
                &[
                    ("database", self.database.as_str()),
                    ("collections_created", report.collections_created().to_string().as_str()),
                    ("indexes_created", report.indexes_created().to_string().as_str()),
                    ("message", SUCCESS_MESSAGE),
                ],
            ),
            Err(err) => log_event_with_fields(
                Event::InitFailed,
                &[
                    ("database", self.database.as_str()),
                    ("code", err.code()),
                    ("error", err.to_string().as_str()),
                ],
            ),
        }
        result
    }

    fn apply<S>(&self, store: &mut S) -> InitResult<InitReport>
    where
        S: DocumentStore + ?Sized,
    {
        for spec in &self.catalog {
            spec.schema
                .validate_structure()
                .map_err(|reason| InitError::Collection {
                    collection: spec.name().to_string(),
                    source: StoreError::Schema(SchemaError::malformed(spec.name(), reason)),
                })?;
        }

        let mut collections = Vec::with_capacity(self.catalog.len());
        for spec in &self.catalog {
            let outcome = store
                .create_collection(spec.schema.clone())
                .map_err(|source| InitError::Collection {
                    collection: spec.name().to_string(),
                    source,
                })?;
            let event = match outcome {
                CollectionOutcome::Created => Event::CollectionCreated,
                CollectionOutcome::AlreadyExists => Event::CollectionExists,
            };
            log_event_with_fields(event, &[("collection", spec.name())]);
            collections.push(CollectionReport {
                collection: spec.name().to_string(),
                outcome,
                indexes: Vec::with_capacity(spec.indexes.len()),
            });
        }

        for (spec, report) in self.catalog.iter().zip(collections.iter_mut()) {
            for index in &spec.indexes {
                let outcome = store
                    .create_index(spec.name(), index.clone())
                    .map_err(|source| InitError::Index {
                        collection: spec.name().to_string(),
                        index: index.name.clone(),
                        source,
                    })?;
                let event = match outcome {
                    IndexOutcome::Created => Event::IndexCreated,
                    IndexOutcome::AlreadyExists => Event::IndexExists,
                };
                log_event_with_fields(
                    event,
                    &[("collection", spec.name()), ("index", index.name.as_str())],
                );
                report.indexes.push(IndexReport {
                    name: index.name.clone(),
                    outcome,
                });
            }
        }

        Ok(InitReport {
            database: self.database.clone(),
            collections,
        })
    }
}
