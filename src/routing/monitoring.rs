//! Observed execution costs
//!
//! Execution feedback arrives asynchronously from query execution; the
//! selector only ever reads it. Missing data for a query class is normal
//! (cold start), not an error.

use std::collections::BTreeMap;
use std::sync::RwLock;

use serde::Serialize;

/// Historical cost of one physical query class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPostCost {
    pub physical_query_class: String,
    /// Mean observed execution time (milliseconds)
    pub execution_time: f64,
    pub samples: u64,
}

/// Source of historical execution costs
pub trait MonitoringCostProvider: Send + Sync {
    fn get_query_post_costs(&self, physical_query_class: &str) -> Option<QueryPostCost>;
}

/// In-memory post cost store keeping a running mean per query class
#[derive(Debug, Default)]
pub struct PostCostStore {
    inner: RwLock<BTreeMap<String, QueryPostCost>>,
}

impl PostCostStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with one observation per class.
    pub fn from_history<I, K>(history: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let store = Self::new();
        for (class, execution_time) in history {
            store.record(class, execution_time);
        }
        store
    }

    /// Fold one observed execution time into the class mean.
    ///
    /// Negative and non-finite observations are ignored.
    pub fn record(&self, physical_query_class: impl Into<String>, execution_time: f64) {
        if !execution_time.is_finite() || execution_time < 0.0 {
            return;
        }
        let class = physical_query_class.into();
        let mut map = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let entry = map.entry(class.clone()).or_insert(QueryPostCost {
            physical_query_class: class,
            execution_time: 0.0,
            samples: 0,
        });
        entry.samples = entry.samples.saturating_add(1);
        entry.execution_time += (execution_time - entry.execution_time) / entry.samples as f64;
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl MonitoringCostProvider for PostCostStore {
    fn get_query_post_costs(&self, physical_query_class: &str) -> Option<QueryPostCost> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(physical_query_class)
            .cloned()
    }
}
