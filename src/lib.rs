//! transit-schema - storage-level contracts for a transport ticketing system
//!
//! Declares the passengers, routes, trips, tickets, payments and
//! notifications collections, enforces their validators and unique indexes
//! on every write, and applies them idempotently to a document store.

pub mod catalog;
pub mod cli;
pub mod index;
pub mod init;
pub mod observability;
pub mod schema;
pub mod store;
