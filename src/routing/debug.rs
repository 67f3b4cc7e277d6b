//! Analyze-mode reporting of routing decisions

use std::sync::Mutex;

use serde::Serialize;

use super::config::PlanSelectionStrategy;
use crate::observability::Logger;

/// Intermediate vectors of one selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingDebugRecord {
    pub strategy: PlanSelectionStrategy,
    pub ratio_post: f64,
    pub pre_costs: Vec<f64>,
    pub post_costs: Vec<f64>,
    /// Raw historical execution times, `None` where the class was never seen
    pub historical_costs: Vec<Option<f64>>,
    pub effective_costs: Vec<f64>,
    /// PROBABILITY only: selection weights summing to 100
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentages: Option<Vec<f64>>,
    pub selected_index: usize,
}

/// Receiver of debug records
pub trait RoutingDebugSink: Send + Sync {
    fn publish(&self, record: RoutingDebugRecord);
}

/// Keeps every record in memory
#[derive(Debug, Default)]
pub struct MemoryDebugSink {
    records: Mutex<Vec<RoutingDebugRecord>>,
}

impl MemoryDebugSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<RoutingDebugRecord> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn last(&self) -> Option<RoutingDebugRecord> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .last()
            .cloned()
    }
}

impl RoutingDebugSink for MemoryDebugSink {
    fn publish(&self, record: RoutingDebugRecord) {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(record);
    }
}

/// Writes each record as a TRACE log line
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDebugSink;

impl RoutingDebugSink for LogDebugSink {
    fn publish(&self, record: RoutingDebugRecord) {
        let body = serde_json::to_string(&record).unwrap_or_default();
        Logger::trace("ROUTING_DEBUG", &[("record", body.as_str())]);
    }
}

/// The parts of the current transaction the selector looks at
#[derive(Clone, Copy, Default)]
pub struct TransactionContext<'a> {
    /// Analyze/explain mode: publish debug records
    pub analyze: bool,
    pub sink: Option<&'a dyn RoutingDebugSink>,
}

impl<'a> TransactionContext<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn analyzing(sink: &'a dyn RoutingDebugSink) -> Self {
        Self {
            analyze: true,
            sink: Some(sink),
        }
    }

    pub(crate) fn publish(&self, record: impl FnOnce() -> RoutingDebugRecord) {
        if !self.analyze {
            return;
        }
        if let Some(sink) = self.sink {
            sink.publish(record());
        }
    }
}
