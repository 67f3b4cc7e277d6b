//! Routing configuration

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::{RoutingError, RoutingResult};

/// Below this, a blend weight counts as zero.
pub const NEGLIGIBLE: f64 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlanSelectionStrategy {
    /// Deterministic arg-min over effective costs
    Best,
    /// Weighted random draw favoring cheaper plans
    Probability,
}

impl PlanSelectionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanSelectionStrategy::Best => "BEST",
            PlanSelectionStrategy::Probability => "PROBABILITY",
        }
    }
}

impl fmt::Display for PlanSelectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PlanSelectionStrategy {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BEST" => Ok(PlanSelectionStrategy::Best),
            "PROBABILITY" => Ok(PlanSelectionStrategy::Probability),
            _ => Err(RoutingError::strategy_not_configured()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoutingConfig {
    /// Weight of historical (post) cost; static (pre) cost gets the rest
    pub pre_cost_post_cost_ratio: f64,
    pub plan_selection_strategy: Option<PlanSelectionStrategy>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            pre_cost_post_cost_ratio: 0.0,
            plan_selection_strategy: Some(PlanSelectionStrategy::Best),
        }
    }
}

impl RoutingConfig {
    pub fn new(pre_cost_post_cost_ratio: f64, strategy: PlanSelectionStrategy) -> Self {
        Self {
            pre_cost_post_cost_ratio,
            plan_selection_strategy: Some(strategy),
        }
    }

    pub fn validate(&self) -> RoutingResult<()> {
        let ratio = self.pre_cost_post_cost_ratio;
        if !(0.0..=1.0).contains(&ratio) {
            return Err(RoutingError::invalid_ratio(ratio));
        }
        Ok(())
    }

    pub fn ratio_post(&self) -> f64 {
        self.pre_cost_post_cost_ratio
    }

    pub fn ratio_pre(&self) -> f64 {
        1.0 - self.pre_cost_post_cost_ratio
    }
}
