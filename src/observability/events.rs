//! Lifecycle events of the placement engine
//!
//! Every structural decision (catalog commit, partitioning, placement,
//! reclassification, plan choice) is reported as one named event.

use std::fmt;

use super::logger::Severity;

/// Named events emitted by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    ConfigLoaded,

    // Allocation catalog
    CatalogTransactionBegin,
    CatalogCommit,
    CatalogRollback,

    // Partitioning
    TablePartitioned,
    TableMerged,
    PartitionReclassified,
    PartitionDistributionViolation,

    // Placement
    PlacementDecided,
    PlacementNoStore,

    // Routing
    PlanSelected,
    RoutingColdStart,

    // Command line
    CommandStart,
    CommandComplete,
    CommandFailed,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",

            Event::CatalogTransactionBegin => "CATALOG_TRANSACTION_BEGIN",
            Event::CatalogCommit => "CATALOG_COMMIT",
            Event::CatalogRollback => "CATALOG_ROLLBACK",

            Event::TablePartitioned => "TABLE_PARTITIONED",
            Event::TableMerged => "TABLE_MERGED",
            Event::PartitionReclassified => "PARTITION_RECLASSIFIED",
            Event::PartitionDistributionViolation => "PARTITION_DISTRIBUTION_VIOLATION",

            Event::PlacementDecided => "PLACEMENT_DECIDED",
            Event::PlacementNoStore => "PLACEMENT_NO_STORE",

            Event::PlanSelected => "PLAN_SELECTED",
            Event::RoutingColdStart => "ROUTING_COLD_START",

            Event::CommandStart => "COMMAND_BEGIN",
            Event::CommandComplete => "COMMAND_COMPLETE",
            Event::CommandFailed => "COMMAND_FAILED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::PlanSelected | Event::CatalogTransactionBegin => Severity::Trace,
            Event::PartitionDistributionViolation | Event::RoutingColdStart => Severity::Warn,
            Event::PlacementNoStore | Event::CommandFailed => Severity::Error,
            _ => Severity::Info,
        }
    }

    /// Returns true if this event ends the current command
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::CommandFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Event; 15] = [
        Event::ConfigLoaded,
        Event::CatalogTransactionBegin,
        Event::CatalogCommit,
        Event::CatalogRollback,
        Event::TablePartitioned,
        Event::TableMerged,
        Event::PartitionReclassified,
        Event::PartitionDistributionViolation,
        Event::PlacementDecided,
        Event::PlacementNoStore,
        Event::PlanSelected,
        Event::RoutingColdStart,
        Event::CommandStart,
        Event::CommandComplete,
        Event::CommandFailed,
    ];

    #[test]
    fn test_event_names_are_upper_snake() {
        for event in ALL {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_event_names_unique() {
        let mut names: Vec<_> = ALL.iter().map(|e| e.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), ALL.len());
    }

    #[test]
    fn test_severity_mapping() {
        assert_eq!(Event::PlanSelected.severity(), Severity::Trace);
        assert_eq!(Event::RoutingColdStart.severity(), Severity::Warn);
        assert_eq!(Event::PlacementNoStore.severity(), Severity::Error);
        assert_eq!(Event::CatalogCommit.severity(), Severity::Info);
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::TablePartitioned), "TABLE_PARTITIONED");
        assert!(Event::CommandFailed.is_fatal());
        assert!(!Event::CatalogCommit.is_fatal());
    }
}
