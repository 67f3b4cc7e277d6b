//! Recording placement decisions in the allocation catalog

use super::errors::{PlacementError, PlacementResult};
use super::registry::AdapterRegistry;
use super::strategy::PlacementStrategy;
use crate::catalog::{
    AdapterId, AllocationCatalog, CatalogContext, ColumnId, LogicalCatalog, PartitionId,
    PlacementType, TableId,
};
use crate::observability::{log_event_with_fields, Event};

/// Allocate a new table on the stores chosen by `strategy`.
///
/// Every column and every partition of the table is placed on each
/// chosen store. A table without partitioning gets its default single
/// partition first. On error `catalog` is left untouched.
pub fn place_new_table(
    logical: &dyn LogicalCatalog,
    catalog: &mut AllocationCatalog,
    registry: &AdapterRegistry,
    strategy: &dyn PlacementStrategy,
    table_id: TableId,
) -> PlacementResult<Vec<AdapterId>> {
    let table = logical
        .get_table(table_id)
        .ok_or(PlacementError::UnknownTable(table_id.value()))?;
    let stores = strategy.get_data_stores_for_new_entity(registry)?;

    let mut working = catalog.copy()?;
    if working.get_partition_property(table_id).is_none() {
        working.add_default_partitioning(table_id);
    }
    let partitions: Vec<PartitionId> = working
        .get_partition_property(table_id)
        .map(|p| p.partition_ids.clone())
        .unwrap_or_default();

    for store in &stores {
        working.add_allocation(table_id, *store)?;
        for column_id in &table.column_ids {
            working.add_column_placement(*store, table_id, *column_id, PlacementType::Automatic, None)?;
        }
        for partition_id in &partitions {
            working.add_partition_placement(*store, table_id, *partition_id, PlacementType::Automatic)?;
        }
    }
    *catalog = working;

    log_placement(strategy, table_id, &stores);
    Ok(stores)
}

/// Place a column newly added to an existing table.
///
/// On error `catalog` is left untouched.
pub fn place_new_column(
    logical: &dyn LogicalCatalog,
    catalog: &mut AllocationCatalog,
    registry: &AdapterRegistry,
    strategy: &dyn PlacementStrategy,
    column_id: ColumnId,
) -> PlacementResult<Vec<AdapterId>> {
    let column = logical
        .get_column(column_id)
        .ok_or(PlacementError::UnknownColumn(column_id.value()))?;
    let stores = {
        let ctx = CatalogContext::new(logical, catalog);
        strategy.get_data_stores_for_new_rel_field(&ctx, registry, column)?
    };

    let mut working = catalog.copy()?;
    for store in &stores {
        working.add_column_placement(*store, column.table_id, column_id, PlacementType::Automatic, None)?;
    }
    *catalog = working;

    log_placement(strategy, column.table_id, &stores);
    Ok(stores)
}

fn log_placement(strategy: &dyn PlacementStrategy, table_id: TableId, stores: &[AdapterId]) {
    let adapters = stores
        .iter()
        .map(|s| s.value().to_string())
        .collect::<Vec<_>>()
        .join(",");
    log_event_with_fields(
        Event::PlacementDecided,
        &[
            ("adapters", adapters.as_str()),
            ("strategy", strategy.kind().as_str()),
            ("table_id", table_id.value().to_string().as_str()),
        ],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ColumnType, IdGenerator, LogicalSchema};
    use crate::placement::{Adapter, ReplicateEverywhere, SingleStoreMinimal};

    fn registry() -> AdapterRegistry {
        let mut registry = AdapterRegistry::new();
        registry.register(Adapter::store(1, "hsqldb")).unwrap();
        registry.register(Adapter::store(2, "postgres")).unwrap();
        registry
    }

    #[test]
    fn test_new_table_fully_placed_on_each_store() {
        let ids = IdGenerator::shared();
        let mut schema = LogicalSchema::new(ids.clone());
        let table = schema.add_table("t", &[("a", ColumnType::Integer), ("b", ColumnType::Varchar)]);
        let mut catalog = AllocationCatalog::new(ids);

        let stores =
            place_new_table(&schema, &mut catalog, &registry(), &ReplicateEverywhere, table).unwrap();

        assert_eq!(stores.len(), 2);
        for store in stores {
            assert_eq!(catalog.get_column_placements_on_adapter_per_table(store, table).len(), 2);
            assert_eq!(catalog.get_partitions_on_data_placement(store, table).len(), 1);
        }
    }

    #[test]
    fn test_new_column_follows_single_store() {
        let ids = IdGenerator::shared();
        let mut schema = LogicalSchema::new(ids.clone());
        let table = schema.add_table("t", &[("a", ColumnType::Integer)]);
        let mut catalog = AllocationCatalog::new(ids);
        place_new_table(&schema, &mut catalog, &registry(), &SingleStoreMinimal, table).unwrap();

        let column = schema.add_column(table, "b", ColumnType::Double).unwrap();
        let stores =
            place_new_column(&schema, &mut catalog, &registry(), &SingleStoreMinimal, column).unwrap();

        assert_eq!(stores, vec![AdapterId(1)]);
        assert!(catalog.check_if_exists_column_placement(AdapterId(1), column));
        assert!(!catalog.check_if_exists_column_placement(AdapterId(2), column));
    }
}
