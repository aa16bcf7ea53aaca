//! Observability for setup runs
//!
//! Structured JSON logging of lifecycle events.
//!
//! ```ignore
//! use transit_schema::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::CollectionCreated, &[("collection", "routes")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

/// Default severity of an event: FATAL for aborts, INFO otherwise
pub fn severity_of(event: Event) -> Severity {
    if event.is_fatal() {
        Severity::Fatal
    } else {
        Severity::Info
    }
}

/// Log a lifecycle event at its default severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    log_event_at(severity_of(event), event, fields);
}

/// Log a lifecycle event at an explicit severity
pub fn log_event_at(severity: Severity, event: Event, fields: &[(&str, &str)]) {
    Logger::log(severity, event.as_str(), fields);
}
