//! Allocation Catalog Snapshot Tests
//!
//! Tests for catalog invariants:
//! - Ids are unique across horizontal and vertical partitions
//! - `copy()` is a value, independent of its source
//! - Handle transactions are isolated until commit

use std::collections::HashSet;

use polystore::catalog::{
    AdapterId, AllocationCatalog, CatalogErrorCode, CatalogHandle, ColumnId, ColumnType,
    IdGenerator, LogicalCatalog, LogicalSchema, PartitionGroupId, PlacementType, TableId,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn catalog_with_table() -> (LogicalSchema, AllocationCatalog, TableId) {
    let ids = IdGenerator::shared();
    let mut schema = LogicalSchema::new(ids.clone());
    let table = schema.add_table(
        "customers",
        &[("id", ColumnType::BigInt), ("name", ColumnType::Varchar)],
    );
    let mut catalog = AllocationCatalog::new(ids);
    catalog.add_default_partitioning(table);
    catalog.add_allocation(table, AdapterId(1)).unwrap();
    for column in column_ids(&schema, table) {
        catalog
            .add_column_placement(AdapterId(1), table, column, PlacementType::Automatic, None)
            .unwrap();
    }
    (schema, catalog, table)
}

fn column_ids(schema: &LogicalSchema, table: TableId) -> Vec<ColumnId> {
    schema.get_columns(table).into_iter().map(|c| c.id).collect()
}

// =============================================================================
// Id Allocation Tests
// =============================================================================

/// Horizontal and vertical placements never share an id.
#[test]
fn test_ids_unique_across_kinds() {
    let mut catalog = AllocationCatalog::new(IdGenerator::shared());
    let table = TableId(500);

    let mut seen = HashSet::new();
    for _ in 0..50 {
        assert!(seen.insert(catalog.add_horizontal_placement(table).value()));
        assert!(seen.insert(catalog.add_vertical_placement(table).value()));
    }
    assert_eq!(seen.len(), 100);
}

/// Ids keep increasing after placements are deleted.
#[test]
fn test_ids_not_reused_after_delete() {
    let mut catalog = AllocationCatalog::new(IdGenerator::shared());
    let table = TableId(500);

    let first = catalog.add_horizontal_placement(table);
    catalog.delete_horizontal_placement(first).unwrap();
    let second = catalog.add_horizontal_placement(table);

    assert!(second.value() > first.value());
}

/// A copy continues the shared id sequence instead of restarting it.
#[test]
fn test_copy_shares_id_sequence() {
    let mut catalog = AllocationCatalog::new(IdGenerator::shared());
    let table = TableId(500);
    let before = catalog.add_horizontal_placement(table);

    let mut copy = catalog.copy().unwrap();
    let from_copy = copy.add_horizontal_placement(table);
    let from_source = catalog.add_horizontal_placement(table);

    assert!(from_copy.value() > before.value());
    assert_ne!(from_copy, from_source);
}

// =============================================================================
// Snapshot Isolation Tests
// =============================================================================

/// The copy is value-equal to its source.
#[test]
fn test_copy_is_value_equal() {
    let (_schema, catalog, _table) = catalog_with_table();
    let copy = catalog.copy().unwrap();
    assert_eq!(copy, catalog);
}

/// Mutating the copy leaves the source untouched, and vice versa.
#[test]
fn test_copy_is_independent() {
    let (_schema, mut catalog, table) = catalog_with_table();
    let mut copy = catalog.copy().unwrap();

    copy.add_allocation(table, AdapterId(2)).unwrap();
    assert_eq!(copy.get_allocations_for_table(table).len(), 2);
    assert_eq!(catalog.get_allocations_for_table(table).len(), 1);

    let partition = catalog.add_horizontal_placement(table);
    assert!(catalog.get_horizontal_partition(partition).is_some());
    assert!(copy.get_horizontal_partition(partition).is_none());
}

/// Readers keep their snapshot while a transaction commits.
#[test]
fn test_handle_commit_swaps_snapshot() {
    let (_schema, catalog, table) = catalog_with_table();
    let handle = CatalogHandle::new(catalog);

    let before = handle.snapshot();
    let mut tx = handle.begin().unwrap();
    tx.catalog_mut().add_allocation(table, AdapterId(9)).unwrap();

    // Uncommitted work is invisible
    assert_eq!(handle.snapshot().get_allocations_for_table(table).len(), 1);

    let after = tx.commit();
    assert_eq!(after.get_allocations_for_table(table).len(), 2);
    assert_eq!(handle.snapshot().get_allocations_for_table(table).len(), 2);
    assert_eq!(before.get_allocations_for_table(table).len(), 1);
}

/// Rollback and drop both discard the working copy.
#[test]
fn test_handle_rollback_and_drop_discard() {
    let (_schema, catalog, table) = catalog_with_table();
    let handle = CatalogHandle::new(catalog);

    let mut tx = handle.begin().unwrap();
    tx.catalog_mut().add_allocation(table, AdapterId(2)).unwrap();
    tx.rollback();

    {
        let mut tx = handle.begin().unwrap();
        tx.catalog_mut().add_allocation(table, AdapterId(3)).unwrap();
    }

    assert_eq!(handle.snapshot().get_allocations_for_table(table).len(), 1);
}

// =============================================================================
// Placement Bookkeeping Tests
// =============================================================================

/// Column positions follow insertion order on an allocation.
#[test]
fn test_column_positions_are_ordinal() {
    let (schema, catalog, table) = catalog_with_table();
    let columns = column_ids(&schema, table);

    let placements = catalog.get_column_placements_on_adapter_per_table(AdapterId(1), table);
    let positions: Vec<u64> = columns
        .iter()
        .map(|c| {
            placements
                .iter()
                .find(|p| p.column_id == *c)
                .unwrap()
                .physical_position
        })
        .collect();
    assert_eq!(positions, vec![1, 2]);
}

/// Deleting an allocation removes its column placements.
#[test]
fn test_delete_allocation_cascades() {
    let (schema, mut catalog, table) = catalog_with_table();
    let allocation = catalog.get_allocation(AdapterId(1), table).unwrap().id;

    catalog.delete_allocation(allocation).unwrap();

    assert!(catalog.get_allocations_for_table(table).is_empty());
    for column in column_ids(&schema, table) {
        assert!(!catalog.check_if_exists_column_placement(AdapterId(1), column));
    }
}

/// A table cannot be allocated twice on the same adapter.
#[test]
fn test_duplicate_allocation_rejected() {
    let (_schema, mut catalog, table) = catalog_with_table();
    assert!(catalog.add_allocation(table, AdapterId(1)).is_err());
}

/// A deleted column placement is gone; the others keep their positions.
#[test]
fn test_delete_column_placement() {
    let (schema, mut catalog, table) = catalog_with_table();
    let columns = column_ids(&schema, table);

    let removed = catalog.delete_column_placement(AdapterId(1), columns[1]).unwrap();
    assert_eq!(removed.column_id, columns[1]);
    assert!(!catalog.check_if_exists_column_placement(AdapterId(1), columns[1]));
    assert!(catalog.get_column_placements(columns[1]).is_empty());

    let remaining = catalog.get_column_placements_on_adapter_per_table(AdapterId(1), table);
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].physical_position, 1);

    let err = catalog.delete_column_placement(AdapterId(1), columns[1]).unwrap_err();
    assert_eq!(err.code(), CatalogErrorCode::UnknownColumnPlacement);
}

/// Placement type and physical position can be changed in place.
#[test]
fn test_update_column_placement() {
    let (schema, mut catalog, table) = catalog_with_table();
    let column = column_ids(&schema, table)[0];

    catalog
        .update_column_placement_type(AdapterId(1), column, PlacementType::Manual)
        .unwrap();
    catalog
        .update_column_placement_physical_position(AdapterId(1), column, 7)
        .unwrap();

    let placement = catalog.get_column_placement(AdapterId(1), column).unwrap();
    assert_eq!(placement.placement_type, PlacementType::Manual);
    assert_eq!(placement.physical_position, 7);

    let err = catalog
        .update_column_placement_type(AdapterId(2), column, PlacementType::Manual)
        .unwrap_err();
    assert_eq!(err.code(), CatalogErrorCode::UnknownColumnPlacement);
}

// =============================================================================
// Partition Bookkeeping Tests
// =============================================================================

/// Vertical partitions record their columns until deleted.
#[test]
fn test_vertical_partition_lifecycle() {
    let (schema, mut catalog, table) = catalog_with_table();
    let columns = column_ids(&schema, table);

    let vertical = catalog.add_vertical_placement(table);
    catalog
        .set_vertical_partition_columns(vertical, columns.clone())
        .unwrap();
    assert_eq!(catalog.get_vertical_partition(vertical).unwrap().column_ids, columns);
    assert_eq!(catalog.get_vertical_partitions_by_table(table).len(), 1);

    catalog.delete_vertical_placement(vertical).unwrap();
    assert!(catalog.get_vertical_partition(vertical).is_none());

    let err = catalog.set_vertical_partition_columns(vertical, columns).unwrap_err();
    assert_eq!(err.code(), CatalogErrorCode::UnknownPartition);
    assert!(catalog.delete_vertical_placement(vertical).is_err());
}

/// A partition added to one of the table's groups joins its partition set.
#[test]
fn test_add_partition_extends_group_and_property() {
    let (_schema, mut catalog, table) = catalog_with_table();
    let group = catalog.get_partition_property(table).unwrap().partition_group_ids[0];

    let added = catalog.add_partition(table, group, Vec::new(), false).unwrap();

    assert_eq!(catalog.get_partitions(group).len(), 2);
    assert_eq!(catalog.get_partition_group_by_partition(added), Some(group));
    assert!(catalog.get_partition_property(table).unwrap().partition_ids.contains(&added));

    catalog.delete_partition(added).unwrap();
    assert_eq!(catalog.get_partition_property(table).unwrap().total_partitions(), 1);

    let err = catalog
        .add_partition(table, PartitionGroupId(9_999), Vec::new(), false)
        .unwrap_err();
    assert_eq!(err.code(), CatalogErrorCode::UnknownPartitionGroup);
}

/// The partition property can be replaced only for known tables.
#[test]
fn test_update_table_partition_property() {
    let (schema, mut catalog, table) = catalog_with_table();
    let column = column_ids(&schema, table)[0];

    let mut property = catalog.get_partition_property(table).unwrap().clone();
    property.partition_column_id = Some(column);
    catalog
        .update_table_partition_property(table, property.clone())
        .unwrap();
    assert_eq!(catalog.get_partition_property(table), Some(&property));

    let err = catalog
        .update_table_partition_property(TableId(9_999), property)
        .unwrap_err();
    assert_eq!(err.code(), CatalogErrorCode::UnknownTable);
}
