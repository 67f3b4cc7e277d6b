//! Unpartitioned tables
//!
//! One group holding one partition; every value maps to it.

use super::errors::{PartitionError, PartitionResult};
use super::manager::{property_of, PartitionManager};
use crate::catalog::{CatalogContext, LogicalColumn, PartitionId, PartitionType, TableId};

#[derive(Debug, Default, Clone, Copy)]
pub struct SinglePartitionManager;

impl PartitionManager for SinglePartitionManager {
    fn partition_type(&self) -> PartitionType {
        PartitionType::None
    }

    fn get_target_partition_id(
        &self,
        ctx: &CatalogContext<'_>,
        table_id: TableId,
        _column_value: &str,
    ) -> PartitionResult<PartitionId> {
        property_of(ctx, table_id)?
            .partition_ids
            .first()
            .copied()
            .ok_or(PartitionError::NoPartitions(table_id.value()))
    }

    fn validate_partition_setup(
        &self,
        _qualifiers: &[Vec<String>],
        _number_of_partitions: usize,
        _names: &[String],
        _column: &LogicalColumn,
    ) -> PartitionResult<()> {
        Err(PartitionError::UnknownScheme(
            "NONE cannot be used to partition a table; merge it instead".to_string(),
        ))
    }
}
