//! Schema subsystem
//!
//! Validation contracts are attached to collections and enforced on every
//! write by the store, independent of which service performs the write.
//!
//! # Design Principles
//!
//! - Violations abort writes
//! - No defaults or coercion
//! - Deterministic validation
//! - Contracts render 1:1 to MongoDB `$jsonSchema`

mod errors;
mod json_schema;
mod types;
mod validator;
pub mod value;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, Severity, ValidationDetails};
pub use json_schema::to_json_schema;
pub use types::{BsonType, CollectionSchema, FieldRule, Property};
pub use validator::SchemaValidator;
