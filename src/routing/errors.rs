//! Routing error types
//!
//! Error codes (all FATAL to the calling query):
//! - POLY_ROUTING_STRATEGY_NOT_CONFIGURED
//! - POLY_ROUTING_NO_CANDIDATES
//! - POLY_ROUTING_COST_LENGTH_MISMATCH
//! - POLY_ROUTING_INVALID_RATIO
//! - POLY_ROUTING_INVALID_COST

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingErrorCode {
    /// Neither BEST nor PROBABILITY is configured
    StrategyNotConfigured,
    /// Empty candidate list
    NoCandidates,
    /// Plans and costs differ in length
    CostLengthMismatch,
    /// Blend ratio outside [0, 1]
    InvalidRatio,
    /// Negative or non-finite cost
    InvalidCost,
}

impl RoutingErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            RoutingErrorCode::StrategyNotConfigured => "POLY_ROUTING_STRATEGY_NOT_CONFIGURED",
            RoutingErrorCode::NoCandidates => "POLY_ROUTING_NO_CANDIDATES",
            RoutingErrorCode::CostLengthMismatch => "POLY_ROUTING_COST_LENGTH_MISMATCH",
            RoutingErrorCode::InvalidRatio => "POLY_ROUTING_INVALID_RATIO",
            RoutingErrorCode::InvalidCost => "POLY_ROUTING_INVALID_COST",
        }
    }

    /// Whether the error stems from configuration rather than the request
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            RoutingErrorCode::StrategyNotConfigured | RoutingErrorCode::InvalidRatio
        )
    }
}

impl fmt::Display for RoutingErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone)]
pub struct RoutingError {
    code: RoutingErrorCode,
    message: String,
}

impl RoutingError {
    fn new(code: RoutingErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn strategy_not_configured() -> Self {
        Self::new(
            RoutingErrorCode::StrategyNotConfigured,
            "No plan selection strategy configured (expected BEST or PROBABILITY)",
        )
    }

    pub fn no_candidates() -> Self {
        Self::new(RoutingErrorCode::NoCandidates, "No candidate routing plans")
    }

    pub fn cost_length_mismatch(plans: usize, costs: usize) -> Self {
        Self::new(
            RoutingErrorCode::CostLengthMismatch,
            format!("{} candidate plans but {} costs", plans, costs),
        )
    }

    pub fn invalid_ratio(ratio: f64) -> Self {
        Self::new(
            RoutingErrorCode::InvalidRatio,
            format!("Pre/post cost ratio {} is outside [0, 1]", ratio),
        )
    }

    pub fn invalid_cost(index: usize, cost: f64) -> Self {
        Self::new(
            RoutingErrorCode::InvalidCost,
            format!("Cost {} of candidate {} is negative or not finite", cost, index),
        )
    }

    pub fn code(&self) -> RoutingErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_fatal(&self) -> bool {
        true
    }
}

impl fmt::Display for RoutingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[FATAL] {}: {}", self.code, self.message)
    }
}

impl std::error::Error for RoutingError {}

pub type RoutingResult<T> = Result<T, RoutingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_format() {
        let err = RoutingError::strategy_not_configured();
        let text = err.to_string();
        assert!(text.starts_with("[FATAL] POLY_ROUTING_STRATEGY_NOT_CONFIGURED"));
        assert!(err.code().is_configuration());
    }

    #[test]
    fn test_mismatch_message() {
        let err = RoutingError::cost_length_mismatch(3, 2);
        assert_eq!(err.code(), RoutingErrorCode::CostLengthMismatch);
        assert!(err.message().contains("3 candidate plans but 2 costs"));
        assert!(!err.code().is_configuration());
    }
}
