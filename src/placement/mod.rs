//! Placement strategies
//!
//! Chooses the stores a new table or column lands on, and records the
//! decision in the allocation catalog. Finding no store is a
//! configuration error, never an empty result.

mod allocate;
mod errors;
mod registry;
mod strategy;

pub use allocate::{place_new_column, place_new_table};
pub use errors::{PlacementError, PlacementResult};
pub use registry::{Adapter, AdapterCapabilities, AdapterKind, AdapterRegistry};
pub use strategy::{PlacementStrategy, PlacementStrategyKind, ReplicateEverywhere, SingleStoreMinimal};
