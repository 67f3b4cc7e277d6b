//! polystore - data placement and plan routing for a polystore engine
//!
//! - `catalog`: allocation bookkeeping with snapshot isolation
//! - `partition`: partition schemes and temperature reclassification
//! - `placement`: where new tables and columns live
//! - `routing`: cost-blended plan selection

pub mod catalog;
pub mod cli;
pub mod config;
pub mod observability;
pub mod partition;
pub mod placement;
pub mod routing;
