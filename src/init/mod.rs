//! Schema initialization
//!
//! `SchemaInitializer` brings a store to the state declared by a catalog:
//! collections with their validators, then secondary indexes. Running it
//! against an already initialized store changes nothing.

mod errors;
mod initializer;

pub use errors::{InitError, InitResult};
pub use initializer::{
    CollectionReport, IndexReport, InitReport, SchemaInitializer, SetupStep, SUCCESS_MESSAGE,
};
