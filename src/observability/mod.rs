//! Observability
//!
//! - Structured JSON logging with a process-wide severity threshold
//! - Named lifecycle events
//! - Atomic counters
//!
//! Observability is read-only: nothing here changes a placement or
//! routing decision, and a failed write to stderr is ignored.
//!
//! ```ignore
//! use polystore::observability::{log_event_with_fields, Event, Logger};
//!
//! Logger::info("RECLASSIFICATION_BEGIN", &[]);
//! log_event_with_fields(Event::TablePartitioned, &[("table_id", "4")]);
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::{ObservationScope, Timer};

/// Log a lifecycle event at its own severity
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields at its own severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_fatal() {
        Severity::Fatal
    } else {
        event.severity()
    };
    Logger::log(severity, event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        log_event(Event::ConfigLoaded);
        log_event(Event::CatalogRollback);
    }

    #[test]
    fn test_log_event_with_fields() {
        log_event_with_fields(Event::TablePartitioned, &[("table_id", "1"), ("partition_type", "HASH")]);
    }
}
