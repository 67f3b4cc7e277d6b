//! Operational counters
//!
//! - Counters only, monotonic
//! - Reset only when the registry is created
//! - Relaxed atomics, safe to share behind an `Arc`

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters for plan routing and temperature reclassification
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Plans chosen by the BEST strategy
    plans_selected_best: AtomicU64,
    /// Plans chosen by the PROBABILITY strategy
    plans_selected_probability: AtomicU64,
    /// Selections where no candidate had post costs yet
    routing_cold_starts: AtomicU64,
    /// Reclassification passes over all temperature tables
    reclassification_runs: AtomicU64,
    /// Chunks moved between HOT and COLD
    partitions_reclassified: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Routing

    pub fn increment_plans_selected_best(&self) {
        self.plans_selected_best.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_plans_selected_probability(&self) {
        self.plans_selected_probability.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_routing_cold_starts(&self) {
        self.routing_cold_starts.fetch_add(1, Ordering::Relaxed);
    }

    /// Total plans selected by any strategy
    pub fn plans_selected(&self) -> u64 {
        self.plans_selected_best.load(Ordering::Relaxed)
            + self.plans_selected_probability.load(Ordering::Relaxed)
    }

    // Temperature

    pub fn increment_reclassification_runs(&self) {
        self.reclassification_runs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_partitions_reclassified(&self, count: u64) {
        self.partitions_reclassified.fetch_add(count, Ordering::Relaxed);
    }

    /// All counters as a single JSON object.
    pub fn to_json(&self) -> String {
        // Plain u64 fields cannot fail to serialize
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| String::from("{}"))
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            plans_selected_best: self.plans_selected_best.load(Ordering::Relaxed),
            plans_selected_probability: self.plans_selected_probability.load(Ordering::Relaxed),
            routing_cold_starts: self.routing_cold_starts.load(Ordering::Relaxed),
            reclassification_runs: self.reclassification_runs.load(Ordering::Relaxed),
            partitions_reclassified: self.partitions_reclassified.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of all counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub plans_selected_best: u64,
    pub plans_selected_probability: u64,
    pub routing_cold_starts: u64,
    pub reclassification_runs: u64,
    pub partitions_reclassified: u64,
}
