//! Applying and removing a partitioning scheme
//!
//! Used by DDL execution: validates the request with the scheme's
//! manager, creates the partition groups, installs the partition property
//! and places every new partition on every adapter the table lives on.
//! Nothing is changed in the catalog when validation fails.

use std::collections::{BTreeMap, BTreeSet};

use super::errors::{PartitionError, PartitionResult};
use super::registry::partition_manager;
use super::temperature::TemperatureSetup;
use crate::catalog::{
    AdapterId, AllocationCatalog, ColumnId, LogicalCatalog, LogicalColumn, PartitionGroupId,
    PartitionId, PartitionType, PlacementType, TableId,
};
use crate::observability::{log_event_with_fields, Event};

/// Name of the implicit catch-all group of RANGE and LIST tables.
pub const UNBOUND_GROUP_NAME: &str = "Unbound";

/// A requested partitioning of one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionRequest {
    pub partition_type: PartitionType,
    pub column_id: ColumnId,
    pub names: Vec<String>,
    /// One qualifier list per named partition (range bounds, list values)
    pub qualifiers: Vec<Vec<String>>,
    /// Explicit partition count; 0 means "one per name"
    pub number_of_partitions: usize,
    /// Scheme tunables, validated against the manager's settings schema
    pub settings: BTreeMap<String, String>,
}

impl PartitionRequest {
    pub fn hash(column_id: ColumnId, number_of_partitions: usize) -> Self {
        Self::new(PartitionType::Hash, column_id)
            .with_number_of_partitions(number_of_partitions)
    }

    /// RANGE partitions named `name` covering `[lower, upper]`.
    pub fn range(column_id: ColumnId, ranges: &[(&str, &str, &str)]) -> Self {
        let mut request = Self::new(PartitionType::Range, column_id);
        for (name, lower, upper) in ranges {
            request.names.push(name.to_string());
            request.qualifiers.push(vec![lower.to_string(), upper.to_string()]);
        }
        request
    }

    /// LIST partitions named `name` holding `values`.
    pub fn list(column_id: ColumnId, lists: &[(&str, &[&str])]) -> Self {
        let mut request = Self::new(PartitionType::List, column_id);
        for (name, values) in lists {
            request.names.push(name.to_string());
            request
                .qualifiers
                .push(values.iter().map(|v| v.to_string()).collect());
        }
        request
    }

    pub fn temperature(column_id: ColumnId, settings: &[(&str, &str)]) -> Self {
        let mut request = Self::new(PartitionType::Temperature, column_id);
        request.settings = settings
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        request
    }

    pub fn new(partition_type: PartitionType, column_id: ColumnId) -> Self {
        Self {
            partition_type,
            column_id,
            names: Vec::new(),
            qualifiers: Vec::new(),
            number_of_partitions: 0,
            settings: BTreeMap::new(),
        }
    }

    pub fn with_number_of_partitions(mut self, number_of_partitions: usize) -> Self {
        self.number_of_partitions = number_of_partitions;
        self
    }

    pub fn with_names(mut self, names: &[&str]) -> Self {
        self.names = names.iter().map(|n| n.to_string()).collect();
        self
    }
}

/// Partition `table_id` as requested.
///
/// The table must currently be unpartitioned. Its previous single
/// partition is replaced; callers migrate the rows.
pub fn partition_table(
    logical: &dyn LogicalCatalog,
    catalog: &mut AllocationCatalog,
    table_id: TableId,
    request: &PartitionRequest,
) -> PartitionResult<Vec<PartitionGroupId>> {
    if catalog
        .get_partition_property(table_id)
        .is_some_and(|p| p.is_partitioned())
    {
        return Err(PartitionError::AlreadyPartitioned(table_id.value()));
    }
    let column = logical
        .get_column(request.column_id)
        .filter(|c| c.table_id == table_id)
        .ok_or(PartitionError::UnknownColumn {
            table_id: table_id.value(),
            column_id: request.column_id.value(),
        })?;
    check_unique_names(&request.names)?;

    let previous_groups: Vec<PartitionGroupId> = catalog
        .get_partition_groups(table_id)
        .into_iter()
        .map(|g| g.id)
        .collect();

    let (group_ids, temperature) = if request.partition_type == PartitionType::Temperature {
        let (groups, property) = create_temperature_groups(catalog, table_id, column, request)?;
        (groups, Some(property))
    } else {
        (create_groups(catalog, table_id, column, request)?, None)
    };

    for group_id in previous_groups {
        catalog.delete_partition_group(group_id)?;
    }
    catalog.partition_table(
        table_id,
        request.partition_type,
        request.column_id,
        group_ids.clone(),
        temperature,
    )?;
    place_everywhere(catalog, table_id)?;

    let partitions = catalog
        .get_partition_property(table_id)
        .map_or(0, |p| p.total_partitions());
    log_event_with_fields(
        Event::TablePartitioned,
        &[
            ("partition_type", request.partition_type.as_str()),
            ("partitions", partitions.to_string().as_str()),
            ("table_id", table_id.value().to_string().as_str()),
        ],
    );
    Ok(group_ids)
}

/// Collapse a partitioned table back into a single partition.
pub fn merge_table(catalog: &mut AllocationCatalog, table_id: TableId) -> PartitionResult<PartitionId> {
    let merged = catalog.merge_table(table_id)?;
    log_event_with_fields(
        Event::TableMerged,
        &[("table_id", table_id.value().to_string().as_str())],
    );
    Ok(merged)
}

fn check_unique_names(names: &[String]) -> PartitionResult<()> {
    let mut seen = BTreeSet::new();
    for name in names {
        let sanitized = name.trim().to_lowercase();
        if !seen.insert(sanitized) {
            return Err(PartitionError::DuplicatePartitionName(name.clone()));
        }
    }
    Ok(())
}

fn create_groups(
    catalog: &mut AllocationCatalog,
    table_id: TableId,
    column: &LogicalColumn,
    request: &PartitionRequest,
) -> PartitionResult<Vec<PartitionGroupId>> {
    let manager = partition_manager(request.partition_type);
    let needs_unbound = manager.requires_unbound_partition_group();

    // The unbound group counts toward the partition minimum
    let group_count = if needs_unbound {
        request.names.len() + 1
    } else if request.number_of_partitions == 0 {
        request.names.len()
    } else {
        request.number_of_partitions
    };
    manager.validate_partition_setup(&request.qualifiers, group_count, &request.names, column)?;

    let per_group = manager.number_of_partitions_per_group(request.number_of_partitions as u64);
    let named = if needs_unbound { group_count - 1 } else { group_count };

    let mut group_ids = Vec::with_capacity(group_count);
    for i in 0..named {
        let name = request
            .names
            .get(i)
            .cloned()
            .unwrap_or_else(|| format!("part_{}", i));
        let qualifiers = request.qualifiers.get(i).cloned().unwrap_or_default();
        group_ids.push(catalog.add_partition_group(
            table_id,
            name,
            request.partition_type,
            per_group,
            qualifiers,
            false,
        ));
    }
    if needs_unbound {
        group_ids.push(catalog.add_partition_group(
            table_id,
            UNBOUND_GROUP_NAME,
            request.partition_type,
            per_group,
            Vec::new(),
            true,
        ));
    }
    Ok(group_ids)
}

fn create_temperature_groups(
    catalog: &mut AllocationCatalog,
    table_id: TableId,
    column: &LogicalColumn,
    request: &PartitionRequest,
) -> PartitionResult<(Vec<PartitionGroupId>, super::temperature::TemperatureProperty)> {
    let manager = partition_manager(PartitionType::Temperature);
    // An explicit count is the chunk count; without one the two groups are requested
    let requested = if request.number_of_partitions == 0 {
        2
    } else {
        request.number_of_partitions
    };
    manager.validate_partition_setup(&request.qualifiers, requested, &request.names, column)?;

    let mut settings = request.settings.clone();
    if request.number_of_partitions > 0 {
        settings.retain(|name, _| !name.eq_ignore_ascii_case("chunks"));
        settings.insert("chunks".to_string(), request.number_of_partitions.to_string());
    }
    let resolved = manager.settings().validate(&settings)?;
    let mut setup = TemperatureSetup::from_settings(&resolved)?;
    if let [hot, cold] = request.names.as_slice() {
        setup.hot_label = hot.clone();
        setup.cold_label = cold.clone();
    }

    let hot = catalog.add_partition_group(
        table_id,
        setup.hot_label.clone(),
        PartitionType::Temperature,
        setup.initial_hot_chunks(),
        Vec::new(),
        false,
    );
    let cold = catalog.add_partition_group(
        table_id,
        setup.cold_label.clone(),
        PartitionType::Temperature,
        setup.initial_cold_chunks(),
        Vec::new(),
        false,
    );
    Ok((vec![hot, cold], setup.into_property(hot, cold)))
}

fn place_everywhere(catalog: &mut AllocationCatalog, table_id: TableId) -> PartitionResult<()> {
    let adapters: Vec<AdapterId> = catalog
        .get_allocations_for_table(table_id)
        .into_iter()
        .map(|a| a.adapter_id)
        .collect();
    let partitions: Vec<PartitionId> = catalog
        .get_partition_property(table_id)
        .map(|p| p.partition_ids.clone())
        .unwrap_or_default();

    for adapter_id in adapters {
        for partition_id in &partitions {
            catalog.add_partition_placement(adapter_id, table_id, *partition_id, PlacementType::Automatic)?;
        }
    }
    Ok(())
}
