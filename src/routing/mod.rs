//! Routing plan selection
//!
//! Given semantically equivalent candidate plans for one logical query
//! and their static cost estimates, picks the plan to execute using a
//! blend of static and historically observed costs.
//!
//! # Concurrency
//!
//! The selector holds no per-query state. It is safe to share between
//! threads: the monitoring provider is read-only from here and the random
//! source sits behind a mutex.

mod config;
mod debug;
mod errors;
mod monitoring;
mod plan;
mod selector;

pub use config::{PlanSelectionStrategy, RoutingConfig, NEGLIGIBLE};
pub use debug::{LogDebugSink, MemoryDebugSink, RoutingDebugRecord, RoutingDebugSink, TransactionContext};
pub use errors::{RoutingError, RoutingErrorCode, RoutingResult};
pub use monitoring::{MonitoringCostProvider, PostCostStore, QueryPostCost};
pub use plan::{CandidatePlan, RoutingPlan};
pub use selector::{calculate_probabilities, calculate_selection_weights, RoutingPlanSelector};
