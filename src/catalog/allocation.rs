//! Allocation catalog
//!
//! Authoritative record of how logical tables are decomposed into
//! horizontal partitions (rows) and vertical partitions (columns), and
//! which adapters hold which pieces.
//!
//! # Concurrency
//!
//! The catalog itself is a plain value: readers take `&self`, DDL takes
//! `&mut self`. Isolation comes from `copy()`: a transaction mutates its
//! private copy and the enclosing `CatalogHandle` swaps it in on commit.
//! Arbitrating concurrent DDL writers is the caller's obligation.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::entities::{
    AllocationPlacement, ColumnPlacement, DataPlacement, HorizontalPartition, PartitionGroup,
    PartitionPlacement, PartitionProperty, PartitionType, PlacementType, VerticalPartition,
};
use super::errors::{CatalogError, CatalogResult};
use super::ids::{
    AdapterId, AllocationId, ColumnId, IdGenerator, PartitionGroupId, PartitionId, TableId,
};
use crate::partition::TemperatureProperty;

/// Serializable state of the catalog.
///
/// Everything except the id generator lives here, so `copy()` is a plain
/// serialize/deserialize round-trip of this struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct AllocationState {
    allocations: BTreeMap<AllocationId, AllocationPlacement>,
    column_placements: BTreeMap<AllocationId, Vec<ColumnPlacement>>,
    horizontal: BTreeMap<PartitionId, HorizontalPartition>,
    vertical: BTreeMap<PartitionId, VerticalPartition>,
    partition_groups: BTreeMap<PartitionGroupId, PartitionGroup>,
    partition_placements: Vec<PartitionPlacement>,
    properties: BTreeMap<TableId, PartitionProperty>,
}

/// Allocation catalog
#[derive(Debug)]
pub struct AllocationCatalog {
    ids: Arc<IdGenerator>,
    state: AllocationState,
}

impl PartialEq for AllocationCatalog {
    /// Value equality of the recorded placements; the id generator is
    /// shared infrastructure and not part of the value.
    fn eq(&self, other: &Self) -> bool {
        self.state == other.state
    }
}

impl AllocationCatalog {
    /// Create an empty catalog drawing ids from `ids`.
    pub fn new(ids: Arc<IdGenerator>) -> Self {
        Self {
            ids,
            state: AllocationState::default(),
        }
    }

    /// The id generator this catalog draws from.
    pub fn id_generator(&self) -> &Arc<IdGenerator> {
        &self.ids
    }

    // =========================================================================
    // Snapshot lifecycle
    // =========================================================================

    /// Fully independent deep copy of the catalog.
    ///
    /// Obtained by serializing and re-hydrating the whole state. The copy
    /// shares the id generator, so ids stay unique across original and copy.
    pub fn copy(&self) -> CatalogResult<AllocationCatalog> {
        let bytes = serde_json::to_vec(&self.state).map_err(CatalogError::snapshot_failed)?;
        let state: AllocationState =
            serde_json::from_slice(&bytes).map_err(CatalogError::snapshot_failed)?;
        Ok(AllocationCatalog {
            ids: Arc::clone(&self.ids),
            state,
        })
    }

    /// Lifecycle hook. Durability and the atomic swap belong to the
    /// enclosing catalog.
    pub fn commit(&mut self) {}

    /// Lifecycle hook. The enclosing catalog discards the copy.
    pub fn rollback(&mut self) {}

    // =========================================================================
    // Horizontal / vertical partitions
    // =========================================================================

    /// Record a new horizontal partition of `table_id`.
    pub fn add_horizontal_placement(&mut self, table_id: TableId) -> PartitionId {
        self.insert_horizontal(table_id, None, Vec::new(), false)
    }

    /// Record a new vertical partition of `table_id`.
    pub fn add_vertical_placement(&mut self, table_id: TableId) -> PartitionId {
        let id = PartitionId(self.ids.next_id());
        self.state.vertical.insert(
            id,
            VerticalPartition {
                id,
                logical_table_id: table_id,
                column_ids: Vec::new(),
            },
        );
        id
    }

    /// Remove a horizontal partition without touching its group.
    pub fn delete_horizontal_placement(
        &mut self,
        partition_id: PartitionId,
    ) -> CatalogResult<HorizontalPartition> {
        self.state
            .horizontal
            .remove(&partition_id)
            .ok_or_else(|| CatalogError::unknown_partition(partition_id.value()))
    }

    pub fn delete_vertical_placement(
        &mut self,
        partition_id: PartitionId,
    ) -> CatalogResult<VerticalPartition> {
        self.state
            .vertical
            .remove(&partition_id)
            .ok_or_else(|| CatalogError::unknown_partition(partition_id.value()))
    }

    /// Assign the columns stored together by a vertical partition.
    pub fn set_vertical_partition_columns(
        &mut self,
        partition_id: PartitionId,
        column_ids: Vec<ColumnId>,
    ) -> CatalogResult<()> {
        let partition = self
            .state
            .vertical
            .get_mut(&partition_id)
            .ok_or_else(|| CatalogError::unknown_partition(partition_id.value()))?;
        partition.column_ids = column_ids;
        Ok(())
    }

    pub fn get_horizontal_partition(&self, partition_id: PartitionId) -> Option<&HorizontalPartition> {
        self.state.horizontal.get(&partition_id)
    }

    pub fn get_vertical_partition(&self, partition_id: PartitionId) -> Option<&VerticalPartition> {
        self.state.vertical.get(&partition_id)
    }

    pub fn get_vertical_partitions_by_table(&self, table_id: TableId) -> Vec<&VerticalPartition> {
        self.state
            .vertical
            .values()
            .filter(|p| p.logical_table_id == table_id)
            .collect()
    }

    fn insert_horizontal(
        &mut self,
        table_id: TableId,
        group_id: Option<PartitionGroupId>,
        qualifiers: Vec<String>,
        is_unbound: bool,
    ) -> PartitionId {
        let id = PartitionId(self.ids.next_id());
        self.state.horizontal.insert(
            id,
            HorizontalPartition {
                id,
                logical_table_id: table_id,
                partition_group_id: group_id,
                qualifiers,
                is_unbound,
            },
        );
        id
    }

    // =========================================================================
    // Allocations
    // =========================================================================

    /// Record that `adapter_id` holds a physical representation of `table_id`.
    pub fn add_allocation(
        &mut self,
        table_id: TableId,
        adapter_id: AdapterId,
    ) -> CatalogResult<AllocationId> {
        if self.get_allocation(adapter_id, table_id).is_some() {
            return Err(CatalogError::duplicate_placement(format!(
                "Table {} is already allocated on adapter {}",
                table_id.value(),
                adapter_id.value()
            )));
        }

        let id = AllocationId(self.ids.next_id());
        self.state.allocations.insert(
            id,
            AllocationPlacement {
                id,
                logical_table_id: table_id,
                adapter_id,
            },
        );
        self.state.column_placements.insert(id, Vec::new());
        Ok(id)
    }

    /// Remove an allocation together with its column and partition placements.
    pub fn delete_allocation(
        &mut self,
        allocation_id: AllocationId,
    ) -> CatalogResult<AllocationPlacement> {
        let allocation = self
            .state
            .allocations
            .remove(&allocation_id)
            .ok_or_else(|| CatalogError::unknown_allocation_id(allocation_id.value()))?;
        self.state.column_placements.remove(&allocation_id);
        self.state.partition_placements.retain(|p| {
            !(p.adapter_id == allocation.adapter_id && p.table_id == allocation.logical_table_id)
        });
        Ok(allocation)
    }

    pub fn get_allocation(
        &self,
        adapter_id: AdapterId,
        table_id: TableId,
    ) -> Option<&AllocationPlacement> {
        self.state
            .allocations
            .values()
            .find(|a| a.adapter_id == adapter_id && a.logical_table_id == table_id)
    }

    /// Allocations of a table, oldest first.
    pub fn get_allocations_for_table(&self, table_id: TableId) -> Vec<&AllocationPlacement> {
        self.state
            .allocations
            .values()
            .filter(|a| a.logical_table_id == table_id)
            .collect()
    }

    pub fn get_allocations_on_adapter(&self, adapter_id: AdapterId) -> Vec<&AllocationPlacement> {
        self.state
            .allocations
            .values()
            .filter(|a| a.adapter_id == adapter_id)
            .collect()
    }

    /// Everything each adapter holds of `table_id`, in allocation order.
    pub fn get_data_placements(&self, table_id: TableId) -> Vec<DataPlacement> {
        self.get_allocations_for_table(table_id)
            .into_iter()
            .map(|allocation| DataPlacement {
                adapter_id: allocation.adapter_id,
                table_id,
                column_ids: self
                    .placements_of(allocation.id)
                    .iter()
                    .map(|p| p.column_id)
                    .collect(),
                partition_ids: self.get_partitions_on_data_placement(allocation.adapter_id, table_id),
            })
            .collect()
    }

    // =========================================================================
    // Column placements
    // =========================================================================

    /// Place `column_id` of `table_id` on `adapter_id`.
    ///
    /// The table must already be allocated on the adapter. The column gets
    /// the next physical position of that allocation.
    pub fn add_column_placement(
        &mut self,
        adapter_id: AdapterId,
        table_id: TableId,
        column_id: ColumnId,
        placement_type: PlacementType,
        physical_name: Option<String>,
    ) -> CatalogResult<()> {
        let allocation_id = self
            .get_allocation(adapter_id, table_id)
            .map(|a| a.id)
            .ok_or_else(|| CatalogError::unknown_allocation(adapter_id.value(), table_id.value()))?;

        let placements = self.state.column_placements.entry(allocation_id).or_default();
        if placements.iter().any(|p| p.column_id == column_id) {
            return Err(CatalogError::duplicate_placement(format!(
                "Column {} is already placed on adapter {}",
                column_id.value(),
                adapter_id.value()
            )));
        }

        let physical_position = placements
            .iter()
            .map(|p| p.physical_position)
            .max()
            .map_or(1, |max| max + 1);

        placements.push(ColumnPlacement {
            allocation_id,
            adapter_id,
            table_id,
            column_id,
            placement_type,
            physical_position,
            physical_name,
        });
        Ok(())
    }

    /// Remove the placement of `column_id` from `adapter_id`.
    pub fn delete_column_placement(
        &mut self,
        adapter_id: AdapterId,
        column_id: ColumnId,
    ) -> CatalogResult<ColumnPlacement> {
        for placements in self.state.column_placements.values_mut() {
            if let Some(index) = placements
                .iter()
                .position(|p| p.adapter_id == adapter_id && p.column_id == column_id)
            {
                return Ok(placements.remove(index));
            }
        }
        Err(CatalogError::unknown_column_placement(
            adapter_id.value(),
            column_id.value(),
        ))
    }

    pub fn get_column_placement(
        &self,
        adapter_id: AdapterId,
        column_id: ColumnId,
    ) -> Option<&ColumnPlacement> {
        self.all_column_placements()
            .find(|p| p.adapter_id == adapter_id && p.column_id == column_id)
    }

    pub fn check_if_exists_column_placement(&self, adapter_id: AdapterId, column_id: ColumnId) -> bool {
        self.get_column_placement(adapter_id, column_id).is_some()
    }

    /// All placements of a column, in allocation order.
    pub fn get_column_placements(&self, column_id: ColumnId) -> Vec<&ColumnPlacement> {
        self.all_column_placements()
            .filter(|p| p.column_id == column_id)
            .collect()
    }

    /// Placements of one table on one adapter, ordered by physical position.
    pub fn get_column_placements_on_adapter_per_table(
        &self,
        adapter_id: AdapterId,
        table_id: TableId,
    ) -> Vec<&ColumnPlacement> {
        let mut placements: Vec<&ColumnPlacement> = self
            .get_allocation(adapter_id, table_id)
            .map(|a| self.placements_of(a.id).iter().collect())
            .unwrap_or_default();
        placements.sort_by_key(|p| p.physical_position);
        placements
    }

    pub fn get_column_placements_on_adapter(&self, adapter_id: AdapterId) -> Vec<&ColumnPlacement> {
        self.all_column_placements()
            .filter(|p| p.adapter_id == adapter_id)
            .collect()
    }

    pub fn update_column_placement_type(
        &mut self,
        adapter_id: AdapterId,
        column_id: ColumnId,
        placement_type: PlacementType,
    ) -> CatalogResult<()> {
        let placement = self.column_placement_mut(adapter_id, column_id)?;
        placement.placement_type = placement_type;
        Ok(())
    }

    pub fn update_column_placement_physical_position(
        &mut self,
        adapter_id: AdapterId,
        column_id: ColumnId,
        position: u64,
    ) -> CatalogResult<()> {
        let placement = self.column_placement_mut(adapter_id, column_id)?;
        placement.physical_position = position;
        Ok(())
    }

    fn placements_of(&self, allocation_id: AllocationId) -> &[ColumnPlacement] {
        self.state
            .column_placements
            .get(&allocation_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn all_column_placements(&self) -> impl Iterator<Item = &ColumnPlacement> {
        self.state.column_placements.values().flatten()
    }

    fn column_placement_mut(
        &mut self,
        adapter_id: AdapterId,
        column_id: ColumnId,
    ) -> CatalogResult<&mut ColumnPlacement> {
        self.state
            .column_placements
            .values_mut()
            .flatten()
            .find(|p| p.adapter_id == adapter_id && p.column_id == column_id)
            .ok_or_else(|| CatalogError::unknown_column_placement(adapter_id.value(), column_id.value()))
    }

    // =========================================================================
    // Partition groups and partitions
    // =========================================================================

    /// Create a partition group holding `internal_partitions` new partitions.
    ///
    /// Every internal partition inherits the group's qualifiers.
    pub fn add_partition_group(
        &mut self,
        table_id: TableId,
        name: impl Into<String>,
        partition_type: PartitionType,
        internal_partitions: u64,
        qualifiers: Vec<String>,
        is_unbound: bool,
    ) -> PartitionGroupId {
        let group_id = PartitionGroupId(self.ids.next_id());
        let partition_ids = (0..internal_partitions.max(1))
            .map(|_| self.insert_horizontal(table_id, Some(group_id), qualifiers.clone(), is_unbound))
            .collect();

        self.state.partition_groups.insert(
            group_id,
            PartitionGroup {
                id: group_id,
                logical_table_id: table_id,
                name: name.into(),
                partition_type,
                internal_partition_count: internal_partitions.max(1),
                qualifiers,
                is_unbound,
                partition_ids,
            },
        );
        group_id
    }

    /// Remove a group and all of its partitions.
    pub fn delete_partition_group(&mut self, group_id: PartitionGroupId) -> CatalogResult<()> {
        let group = self
            .state
            .partition_groups
            .remove(&group_id)
            .ok_or_else(|| CatalogError::unknown_partition_group(group_id.value()))?;
        for partition_id in group.partition_ids {
            self.forget_partition(partition_id);
        }
        Ok(())
    }

    pub fn get_partition_group(&self, group_id: PartitionGroupId) -> Option<&PartitionGroup> {
        self.state.partition_groups.get(&group_id)
    }

    pub fn get_partition_groups(&self, table_id: TableId) -> Vec<&PartitionGroup> {
        self.state
            .partition_groups
            .values()
            .filter(|g| g.logical_table_id == table_id)
            .collect()
    }

    /// Add one partition to an existing group.
    pub fn add_partition(
        &mut self,
        table_id: TableId,
        group_id: PartitionGroupId,
        qualifiers: Vec<String>,
        is_unbound: bool,
    ) -> CatalogResult<PartitionId> {
        if !self.state.partition_groups.contains_key(&group_id) {
            return Err(CatalogError::unknown_partition_group(group_id.value()));
        }
        let partition_id = self.insert_horizontal(table_id, Some(group_id), qualifiers, is_unbound);
        if let Some(group) = self.state.partition_groups.get_mut(&group_id) {
            group.partition_ids.push(partition_id);
        }
        if let Some(property) = self
            .state
            .properties
            .get_mut(&table_id)
            .filter(|p| p.partition_group_ids.contains(&group_id))
        {
            property.partition_ids.push(partition_id);
        }
        Ok(partition_id)
    }

    /// Remove a partition, its group membership and its placements.
    pub fn delete_partition(&mut self, partition_id: PartitionId) -> CatalogResult<()> {
        if !self.state.horizontal.contains_key(&partition_id) {
            return Err(CatalogError::unknown_partition(partition_id.value()));
        }
        self.forget_partition(partition_id);
        Ok(())
    }

    /// Move a partition into another group of the same table.
    pub fn update_partition(
        &mut self,
        partition_id: PartitionId,
        group_id: PartitionGroupId,
    ) -> CatalogResult<()> {
        if !self.state.partition_groups.contains_key(&group_id) {
            return Err(CatalogError::unknown_partition_group(group_id.value()));
        }
        let partition = self
            .state
            .horizontal
            .get_mut(&partition_id)
            .ok_or_else(|| CatalogError::unknown_partition(partition_id.value()))?;

        let previous = partition.partition_group_id.replace(group_id);
        if previous == Some(group_id) {
            return Ok(());
        }
        if let Some(old) = previous.and_then(|id| self.state.partition_groups.get_mut(&id)) {
            old.partition_ids.retain(|id| *id != partition_id);
        }
        if let Some(new) = self.state.partition_groups.get_mut(&group_id) {
            new.partition_ids.push(partition_id);
        }
        Ok(())
    }

    pub fn get_partition(&self, partition_id: PartitionId) -> Option<&HorizontalPartition> {
        self.state.horizontal.get(&partition_id)
    }

    /// Partitions currently assigned to a group.
    pub fn get_partitions(&self, group_id: PartitionGroupId) -> Vec<&HorizontalPartition> {
        self.state
            .partition_groups
            .get(&group_id)
            .map(|group| {
                group
                    .partition_ids
                    .iter()
                    .filter_map(|id| self.state.horizontal.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get_partitions_by_table(&self, table_id: TableId) -> Vec<&HorizontalPartition> {
        self.state
            .horizontal
            .values()
            .filter(|p| p.logical_table_id == table_id)
            .collect()
    }

    pub fn get_partition_group_by_partition(&self, partition_id: PartitionId) -> Option<PartitionGroupId> {
        self.state
            .horizontal
            .get(&partition_id)
            .and_then(|p| p.partition_group_id)
    }

    fn forget_partition(&mut self, partition_id: PartitionId) {
        if let Some(partition) = self.state.horizontal.remove(&partition_id) {
            if let Some(group) = partition
                .partition_group_id
                .and_then(|id| self.state.partition_groups.get_mut(&id))
            {
                group.partition_ids.retain(|id| *id != partition_id);
            }
            if let Some(property) = self.state.properties.get_mut(&partition.logical_table_id) {
                property.partition_ids.retain(|id| *id != partition_id);
            }
        }
        self.state
            .partition_placements
            .retain(|p| p.partition_id != partition_id);
    }

    // =========================================================================
    // Partition placements
    // =========================================================================

    /// Record that `adapter_id` stores `partition_id` of `table_id`.
    ///
    /// The table must be allocated on the adapter. Re-adding an existing
    /// placement is a no-op.
    pub fn add_partition_placement(
        &mut self,
        adapter_id: AdapterId,
        table_id: TableId,
        partition_id: PartitionId,
        placement_type: PlacementType,
    ) -> CatalogResult<()> {
        if self.get_allocation(adapter_id, table_id).is_none() {
            return Err(CatalogError::unknown_allocation(adapter_id.value(), table_id.value()));
        }
        if !self.state.horizontal.contains_key(&partition_id) {
            return Err(CatalogError::unknown_partition(partition_id.value()));
        }
        let exists = self
            .state
            .partition_placements
            .iter()
            .any(|p| p.adapter_id == adapter_id && p.partition_id == partition_id);
        if !exists {
            self.state.partition_placements.push(PartitionPlacement {
                adapter_id,
                table_id,
                partition_id,
                placement_type,
            });
        }
        Ok(())
    }

    /// Returns whether a placement was removed.
    pub fn delete_partition_placement(&mut self, adapter_id: AdapterId, partition_id: PartitionId) -> bool {
        let before = self.state.partition_placements.len();
        self.state
            .partition_placements
            .retain(|p| !(p.adapter_id == adapter_id && p.partition_id == partition_id));
        before != self.state.partition_placements.len()
    }

    /// Partitions of `table_id` stored on `adapter_id`, ascending.
    pub fn get_partitions_on_data_placement(
        &self,
        adapter_id: AdapterId,
        table_id: TableId,
    ) -> Vec<PartitionId> {
        let ids: BTreeSet<PartitionId> = self
            .state
            .partition_placements
            .iter()
            .filter(|p| p.adapter_id == adapter_id && p.table_id == table_id)
            .map(|p| p.partition_id)
            .collect();
        ids.into_iter().collect()
    }

    /// Groups with at least one partition stored on `adapter_id`.
    pub fn get_partition_groups_on_data_placement(
        &self,
        adapter_id: AdapterId,
        table_id: TableId,
    ) -> Vec<PartitionGroupId> {
        let groups: BTreeSet<PartitionGroupId> = self
            .get_partitions_on_data_placement(adapter_id, table_id)
            .into_iter()
            .filter_map(|id| self.get_partition_group_by_partition(id))
            .collect();
        groups.into_iter().collect()
    }

    /// Adapters storing at least one partition of the group.
    pub fn get_adapters_by_partition_group(
        &self,
        table_id: TableId,
        group_id: PartitionGroupId,
    ) -> Vec<AdapterId> {
        let adapters: BTreeSet<AdapterId> = self
            .state
            .partition_placements
            .iter()
            .filter(|p| {
                p.table_id == table_id
                    && self.get_partition_group_by_partition(p.partition_id) == Some(group_id)
            })
            .map(|p| p.adapter_id)
            .collect();
        adapters.into_iter().collect()
    }

    /// Placements of `column_id` on adapters that store the group.
    pub fn get_column_placements_by_partition_group(
        &self,
        table_id: TableId,
        group_id: PartitionGroupId,
        column_id: ColumnId,
    ) -> Vec<&ColumnPlacement> {
        let adapters = self.get_adapters_by_partition_group(table_id, group_id);
        self.get_column_placements(column_id)
            .into_iter()
            .filter(|p| p.table_id == table_id && adapters.contains(&p.adapter_id))
            .collect()
    }

    // =========================================================================
    // Table partitioning
    // =========================================================================

    /// Give a freshly created table its single default group and partition.
    pub fn add_default_partitioning(&mut self, table_id: TableId) -> PartitionId {
        let group_id =
            self.add_partition_group(table_id, "full", PartitionType::None, 1, Vec::new(), false);
        let partition_ids = self
            .state
            .partition_groups
            .get(&group_id)
            .map(|g| g.partition_ids.clone())
            .unwrap_or_default();
        let partition_id = partition_ids[0];

        self.state.properties.insert(
            table_id,
            PartitionProperty {
                partition_type: PartitionType::None,
                partition_column_id: None,
                partition_group_ids: vec![group_id],
                partition_ids,
                temperature: None,
            },
        );
        partition_id
    }

    /// Install a partitioning scheme built from already created groups.
    ///
    /// The table's partition set is the concatenation of the groups'
    /// partitions, in group order.
    pub fn partition_table(
        &mut self,
        table_id: TableId,
        partition_type: PartitionType,
        partition_column_id: ColumnId,
        partition_group_ids: Vec<PartitionGroupId>,
        temperature: Option<TemperatureProperty>,
    ) -> CatalogResult<()> {
        let mut partition_ids = Vec::new();
        for group_id in &partition_group_ids {
            let group = self
                .state
                .partition_groups
                .get(group_id)
                .ok_or_else(|| CatalogError::unknown_partition_group(group_id.value()))?;
            partition_ids.extend(group.partition_ids.iter().copied());
        }

        self.state.properties.insert(
            table_id,
            PartitionProperty {
                partition_type,
                partition_column_id: Some(partition_column_id),
                partition_group_ids,
                partition_ids,
                temperature,
            },
        );
        Ok(())
    }

    /// Collapse a partitioned table back into one partition.
    ///
    /// Every adapter the table is allocated on receives a placement of the
    /// merged partition; moving the rows is the DDL layer's job.
    pub fn merge_table(&mut self, table_id: TableId) -> CatalogResult<PartitionId> {
        if !self.state.properties.contains_key(&table_id) {
            return Err(CatalogError::unknown_table(table_id.value()));
        }

        let groups: Vec<PartitionGroupId> = self
            .get_partition_groups(table_id)
            .into_iter()
            .map(|g| g.id)
            .collect();
        for group_id in groups {
            self.delete_partition_group(group_id)?;
        }

        let merged = self.add_default_partitioning(table_id);
        let adapters: Vec<AdapterId> = self
            .get_allocations_for_table(table_id)
            .into_iter()
            .map(|a| a.adapter_id)
            .collect();
        for adapter_id in adapters {
            self.add_partition_placement(adapter_id, table_id, merged, PlacementType::Automatic)?;
        }
        Ok(merged)
    }

    pub fn get_partition_property(&self, table_id: TableId) -> Option<&PartitionProperty> {
        self.state.properties.get(&table_id)
    }

    /// Tables currently partitioned with `partition_type`, ascending.
    pub fn get_tables_by_partition_type(&self, partition_type: PartitionType) -> Vec<TableId> {
        self.state
            .properties
            .iter()
            .filter(|(_, property)| property.partition_type == partition_type)
            .map(|(table_id, _)| *table_id)
            .collect()
    }

    pub fn update_table_partition_property(
        &mut self,
        table_id: TableId,
        property: PartitionProperty,
    ) -> CatalogResult<()> {
        match self.state.properties.get_mut(&table_id) {
            Some(current) => {
                *current = property;
                Ok(())
            }
            None => Err(CatalogError::unknown_table(table_id.value())),
        }
    }
}
