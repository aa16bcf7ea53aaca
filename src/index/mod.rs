//! Index subsystem
//!
//! Indexes are maintained in memory and rebuilt from the documents of a
//! collection when a store is opened.
//!
//! # Design Principles
//!
//! - Deterministic: BTreeMap iteration order, sorted slots
//! - Unique indexes are checked BEFORE a write, updated AFTER it
//! - Index builds over duplicate data fail and leave nothing behind

mod btree;
mod errors;
mod manager;
mod types;

pub use btree::{DocumentSlot, IndexKey, IndexTree};
pub use errors::{IndexError, IndexErrorCode, IndexResult};
pub use manager::{CollectionIndexes, IndexOutcome};
pub use types::{IndexSpec, ID_INDEX_NAME};
