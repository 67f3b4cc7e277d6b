//! Scheme registry
//!
//! Managers are stateless, so one static instance per scheme is shared
//! by every table.

use super::errors::{PartitionError, PartitionResult};
use super::hash::HashPartitionManager;
use super::list::ListPartitionManager;
use super::manager::PartitionManager;
use super::range::RangePartitionManager;
use super::single::SinglePartitionManager;
use super::temperature::TemperaturePartitionManager;
use crate::catalog::PartitionType;

static SINGLE: SinglePartitionManager = SinglePartitionManager;
static HASH: HashPartitionManager = HashPartitionManager;
static RANGE: RangePartitionManager = RangePartitionManager;
static LIST: ListPartitionManager = ListPartitionManager;
static TEMPERATURE: TemperaturePartitionManager = TemperaturePartitionManager;

/// Manager responsible for `partition_type`.
pub fn partition_manager(partition_type: PartitionType) -> &'static dyn PartitionManager {
    match partition_type {
        PartitionType::None => &SINGLE,
        PartitionType::Hash => &HASH,
        PartitionType::Range => &RANGE,
        PartitionType::List => &LIST,
        PartitionType::Temperature => &TEMPERATURE,
    }
}

/// Manager for a scheme name such as `"hash"` or `"TEMPERATURE"`.
pub fn partition_manager_by_name(name: &str) -> PartitionResult<&'static dyn PartitionManager> {
    name.parse::<PartitionType>()
        .map(partition_manager)
        .map_err(|_| PartitionError::UnknownScheme(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_every_scheme() {
        for partition_type in [
            PartitionType::None,
            PartitionType::Hash,
            PartitionType::Range,
            PartitionType::List,
            PartitionType::Temperature,
        ] {
            assert_eq!(partition_manager(partition_type).partition_type(), partition_type);
        }
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(
            partition_manager_by_name("list").unwrap().partition_type(),
            PartitionType::List
        );
        assert!(matches!(
            partition_manager_by_name("round_robin"),
            Err(PartitionError::UnknownScheme(_))
        ));
    }

    #[test]
    fn test_unbound_requirement() {
        assert!(partition_manager(PartitionType::Range).requires_unbound_partition_group());
        assert!(partition_manager(PartitionType::List).requires_unbound_partition_group());
        assert!(!partition_manager(PartitionType::Hash).requires_unbound_partition_group());
    }
}
