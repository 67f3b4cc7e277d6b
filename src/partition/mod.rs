//! Partition managers
//!
//! One manager per partitioning scheme (NONE, HASH, RANGE, LIST,
//! TEMPERATURE), looked up through the registry by `PartitionType`.
//!
//! # Guarantees
//!
//! - `get_target_partition_id` is a pure function of the table's
//!   partition property and the value
//! - `validate_partition_distribution` never fails; violations are
//!   logged and reported as `false`
//! - Setup validation happens before any catalog change

mod ddl;
mod errors;
mod frequency;
mod hash;
mod list;
mod manager;
mod range;
mod registry;
mod settings;
mod single;
mod temperature;

pub use ddl::{merge_table, partition_table, PartitionRequest, UNBOUND_GROUP_NAME};
pub use errors::{PartitionError, PartitionResult};
pub use frequency::{
    apply as apply_redistribution, determine_redistribution, AccessEvent, AccessFrequencySource,
    AccessKind, AccessLog, FrequencyMap, Redistribution,
};
pub use hash::HashPartitionManager;
pub use list::ListPartitionManager;
pub use manager::PartitionManager;
pub use range::{RangeBounds, RangePartitionManager};
pub use registry::{partition_manager, partition_manager_by_name};
pub use settings::{PartitionSetting, PartitionSettingsSchema, ResolvedSettings, SettingKind};
pub use single::SinglePartitionManager;
pub use temperature::{
    CostIndication, FrequencyWindow, TemperaturePartitionManager, TemperatureProperty,
    TemperatureSetup, TimeUnit, DEFAULT_CHUNKS,
};
