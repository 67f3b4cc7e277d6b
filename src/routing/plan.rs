//! Candidate routing plans

use serde::{Deserialize, Serialize};

/// A fully specified execution plan for one logical query
pub trait RoutingPlan {
    /// Fingerprint shared by structurally equivalent physical plans.
    fn physical_query_class(&self) -> &str;
}

/// Plain candidate identified by an opaque id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidatePlan {
    pub id: String,
    pub physical_query_class: String,
}

impl CandidatePlan {
    pub fn new(id: impl Into<String>, physical_query_class: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            physical_query_class: physical_query_class.into(),
        }
    }
}

impl RoutingPlan for CandidatePlan {
    fn physical_query_class(&self) -> &str {
        &self.physical_query_class
    }
}

impl<P: RoutingPlan + ?Sized> RoutingPlan for &P {
    fn physical_query_class(&self) -> &str {
        (**self).physical_query_class()
    }
}
