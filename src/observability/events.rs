//! Observable events
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events of a schema setup run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot
    ConfigLoaded,
    StoreOpened,

    // Initialization
    InitStart,
    CollectionCreated,
    CollectionExists,
    IndexCreated,
    IndexExists,
    InitComplete,
    /// Setup aborted (FATAL)
    InitFailed,

    // Writes through the CLI
    DocumentInserted,
    DocumentRejected,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StoreOpened => "STORE_OPENED",
            Event::InitStart => "INIT_START",
            Event::CollectionCreated => "COLLECTION_CREATED",
            Event::CollectionExists => "COLLECTION_EXISTS",
            Event::IndexCreated => "INDEX_CREATED",
            Event::IndexExists => "INDEX_EXISTS",
            Event::InitComplete => "INIT_COMPLETE",
            Event::InitFailed => "INIT_FAILED",
            Event::DocumentInserted => "DOCUMENT_INSERTED",
            Event::DocumentRejected => "DOCUMENT_REJECTED",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::InitFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
