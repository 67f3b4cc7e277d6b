//! LIST partitioning
//!
//! Each named group lists the values it stores. Unlisted values land in
//! the implicit unbound group.

use std::collections::BTreeSet;

use super::errors::{PartitionError, PartitionResult};
use super::manager::{validate_base_setup, PartitionManager};
use super::range::{property_groups, unbound_partition};
use crate::catalog::{CatalogContext, LogicalColumn, PartitionId, PartitionType, TableId};

#[derive(Debug, Default, Clone, Copy)]
pub struct ListPartitionManager;

impl PartitionManager for ListPartitionManager {
    fn partition_type(&self) -> PartitionType {
        PartitionType::List
    }

    fn get_target_partition_id(
        &self,
        ctx: &CatalogContext<'_>,
        table_id: TableId,
        column_value: &str,
    ) -> PartitionResult<PartitionId> {
        let groups = property_groups(ctx, table_id)?;
        let value = column_value.trim();

        let listed = groups
            .iter()
            .filter(|g| !g.is_unbound)
            .find(|g| g.qualifiers.iter().any(|q| q.trim() == value))
            .and_then(|g| g.partition_ids.first().copied());

        listed
            .or_else(|| unbound_partition(&groups))
            .ok_or_else(|| PartitionError::NoMatchingPartition {
                table_id: table_id.value(),
                value: column_value.to_string(),
            })
    }

    fn validate_partition_setup(
        &self,
        qualifiers: &[Vec<String>],
        number_of_partitions: usize,
        names: &[String],
        column: &LogicalColumn,
    ) -> PartitionResult<()> {
        validate_base_setup(self, number_of_partitions, names, column)?;

        if qualifiers.is_empty() {
            return Err(PartitionError::InvalidQualifiers(
                "LIST partitioning requires a value list for every partition".to_string(),
            ));
        }
        if qualifiers.len() != names.len() {
            return Err(PartitionError::InvalidQualifiers(format!(
                "{} partition names but {} value lists",
                names.len(),
                qualifiers.len()
            )));
        }

        let mut seen = BTreeSet::new();
        for (name, values) in names.iter().zip(qualifiers) {
            if values.is_empty() {
                return Err(PartitionError::InvalidQualifiers(format!(
                    "partition '{}' lists no values",
                    name
                )));
            }
            for value in values {
                if !seen.insert(value.trim()) {
                    return Err(PartitionError::InvalidQualifiers(format!(
                        "value '{}' is listed by more than one partition",
                        value.trim()
                    )));
                }
            }
        }
        Ok(())
    }

    fn requires_unbound_partition_group(&self) -> bool {
        true
    }
}
