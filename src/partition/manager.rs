//! Partition manager contract
//!
//! One implementation per partitioning scheme. Managers are stateless:
//! everything they need is read through the `CatalogContext` passed to
//! each call.

use std::collections::{BTreeMap, BTreeSet};

use super::errors::{PartitionError, PartitionResult};
use super::settings::PartitionSettingsSchema;
use crate::catalog::{
    AdapterId, AllocationCatalog, CatalogContext, ColumnId, ColumnPlacement, ColumnType,
    LogicalColumn, PartitionId, PartitionProperty, PartitionType, TableId,
};
use crate::observability::{log_event_with_fields, Event, Logger};

/// Partitioning scheme behavior
pub trait PartitionManager: Send + Sync {
    fn partition_type(&self) -> PartitionType;

    /// Partition that stores rows with `column_value` in the partition column.
    ///
    /// Deterministic: same configuration and value, same partition.
    fn get_target_partition_id(
        &self,
        ctx: &CatalogContext<'_>,
        table_id: TableId,
        column_value: &str,
    ) -> PartitionResult<PartitionId>;

    /// Whether every column of the table has at least one placement that
    /// stores all of the table's partitions.
    ///
    /// Never fails: a violation is logged and reported as `false`.
    fn validate_partition_distribution(&self, ctx: &CatalogContext<'_>, table_id: TableId) -> bool {
        let Some(property) = ctx.allocation.get_partition_property(table_id) else {
            log_event_with_fields(
                Event::PartitionDistributionViolation,
                &[
                    ("table_id", table_id.value().to_string().as_str()),
                    ("reason", "no partition property"),
                ],
            );
            return false;
        };

        for column in ctx.logical.get_columns(table_id) {
            let has_full_placement = ctx
                .allocation
                .get_column_placements(column.id)
                .into_iter()
                .filter(|p| p.table_id == table_id)
                .any(|p| holds_all_partitions(ctx.allocation, table_id, property, p.adapter_id));

            if !has_full_placement {
                log_event_with_fields(
                    Event::PartitionDistributionViolation,
                    &[
                        ("column_id", column.id.value().to_string().as_str()),
                        ("reason", "no placement holds all partitions"),
                        ("table_id", table_id.value().to_string().as_str()),
                    ],
                );
                return false;
            }
        }
        true
    }

    /// Whether dropping `column_id`'s placement on `adapter_id` would leave
    /// the column without a placement holding every partition.
    fn probe_partition_distribution_change(
        &self,
        ctx: &CatalogContext<'_>,
        table_id: TableId,
        adapter_id: AdapterId,
        column_id: ColumnId,
    ) -> bool {
        breaks_full_placement(ctx, table_id, adapter_id, column_id)
    }

    /// Minimal placement set able to answer a query restricted to
    /// `partition_ids` (all partitions when empty).
    ///
    /// For each partition, one placement per table column is chosen,
    /// preferring the adapter that covers the most columns. Adapters in
    /// `excluded_adapters` are never chosen.
    fn get_relevant_placements(
        &self,
        ctx: &CatalogContext<'_>,
        table_id: TableId,
        partition_ids: &[PartitionId],
        excluded_adapters: &[AdapterId],
    ) -> BTreeMap<PartitionId, Vec<ColumnPlacement>> {
        relevant_placements(ctx, table_id, partition_ids, excluded_adapters)
    }

    /// Check a requested partitioning before any catalog change is made.
    fn validate_partition_setup(
        &self,
        qualifiers: &[Vec<String>],
        number_of_partitions: usize,
        names: &[String],
        column: &LogicalColumn,
    ) -> PartitionResult<()> {
        let _ = qualifiers;
        validate_base_setup(self, number_of_partitions, names, column)
    }

    /// Whether the scheme needs an implicit catch-all group.
    fn requires_unbound_partition_group(&self) -> bool {
        false
    }

    fn supports_column_of_type(&self, column_type: ColumnType) -> bool {
        let _ = column_type;
        true
    }

    /// Internal partitions created per partition group.
    fn number_of_partitions_per_group(&self, number_of_partitions: u64) -> u64 {
        let _ = number_of_partitions;
        1
    }

    /// Declarative tunables of the scheme.
    fn settings(&self) -> PartitionSettingsSchema {
        PartitionSettingsSchema::empty(self.partition_type())
    }
}

/// Checks shared by every scheme: column type support and the two
/// partition minimum.
pub(crate) fn validate_base_setup<M: PartitionManager + ?Sized>(
    manager: &M,
    number_of_partitions: usize,
    names: &[String],
    column: &LogicalColumn,
) -> PartitionResult<()> {
    if !manager.supports_column_of_type(column.column_type) {
        return Err(PartitionError::UnsupportedColumnType {
            partition_type: manager.partition_type(),
            column_type: column.column_type,
        });
    }

    let requested = if number_of_partitions == 0 {
        names.len()
    } else {
        number_of_partitions
    };
    if requested < 2 {
        Logger::warn(
            "PARTITION_SETUP_REJECTED",
            &[
                ("partition_type", manager.partition_type().as_str()),
                ("requested", requested.to_string().as_str()),
            ],
        );
        return Err(PartitionError::TooFewPartitions(requested));
    }
    Ok(())
}

/// Partition property of a table, or the matching error.
pub(crate) fn property_of<'a>(
    ctx: &CatalogContext<'a>,
    table_id: TableId,
) -> PartitionResult<&'a PartitionProperty> {
    ctx.allocation
        .get_partition_property(table_id)
        .ok_or(PartitionError::MissingPartitionProperty(table_id.value()))
}

/// Whether `adapter_id` stores every partition listed in `property`.
pub(crate) fn holds_all_partitions(
    allocation: &AllocationCatalog,
    table_id: TableId,
    property: &PartitionProperty,
    adapter_id: AdapterId,
) -> bool {
    let table_partitions: BTreeSet<PartitionId> = property.partition_ids.iter().copied().collect();
    let held = allocation
        .get_partitions_on_data_placement(adapter_id, table_id)
        .into_iter()
        .filter(|id| table_partitions.contains(id))
        .count();
    held == property.total_partitions()
}

pub(crate) fn breaks_full_placement(
    ctx: &CatalogContext<'_>,
    table_id: TableId,
    adapter_id: AdapterId,
    column_id: ColumnId,
) -> bool {
    let Some(property) = ctx.allocation.get_partition_property(table_id) else {
        return true;
    };

    let remaining_full = ctx
        .allocation
        .get_column_placements(column_id)
        .into_iter()
        .filter(|p| p.table_id == table_id && p.adapter_id != adapter_id)
        .any(|p| holds_all_partitions(ctx.allocation, table_id, property, p.adapter_id));

    if !remaining_full {
        Logger::warn(
            "PARTITION_DISTRIBUTION_CHANGE_REJECTED",
            &[
                ("adapter_id", adapter_id.value().to_string().as_str()),
                ("column_id", column_id.value().to_string().as_str()),
                ("table_id", table_id.value().to_string().as_str()),
            ],
        );
    }
    !remaining_full
}

pub(crate) fn relevant_placements(
    ctx: &CatalogContext<'_>,
    table_id: TableId,
    partition_ids: &[PartitionId],
    excluded_adapters: &[AdapterId],
) -> BTreeMap<PartitionId, Vec<ColumnPlacement>> {
    let mut result = BTreeMap::new();
    let Some(property) = ctx.allocation.get_partition_property(table_id) else {
        return result;
    };

    let requested: Vec<PartitionId> = if partition_ids.is_empty() {
        property.partition_ids.clone()
    } else {
        partition_ids.to_vec()
    };
    let columns = ctx.logical.get_columns(table_id);

    for partition_id in requested {
        let mut candidates: Vec<(AdapterId, usize)> = ctx
            .allocation
            .get_allocations_for_table(table_id)
            .into_iter()
            .map(|a| a.adapter_id)
            .filter(|adapter| !excluded_adapters.contains(adapter))
            .filter(|adapter| {
                ctx.allocation
                    .get_partitions_on_data_placement(*adapter, table_id)
                    .contains(&partition_id)
            })
            .map(|adapter| {
                let covered = columns
                    .iter()
                    .filter(|c| ctx.allocation.check_if_exists_column_placement(adapter, c.id))
                    .count();
                (adapter, covered)
            })
            .collect();
        // Stable sort keeps allocation order among equally good adapters
        candidates.sort_by(|a, b| b.1.cmp(&a.1));

        let mut chosen = Vec::with_capacity(columns.len());
        for column in &columns {
            let placement = candidates
                .iter()
                .find_map(|(adapter, _)| ctx.allocation.get_column_placement(*adapter, column.id));
            match placement {
                Some(placement) => chosen.push(placement.clone()),
                None => Logger::warn(
                    "PARTITION_PLACEMENT_INCOMPLETE",
                    &[
                        ("column_id", column.id.value().to_string().as_str()),
                        ("partition_id", partition_id.value().to_string().as_str()),
                        ("table_id", table_id.value().to_string().as_str()),
                    ],
                ),
            }
        }
        result.insert(partition_id, chosen);
    }
    result
}
