//! Placement policies
//!
//! Decide, at table or column creation time, which stores receive the
//! new entity. Both policies return a non-empty list or an error; an
//! empty success is never produced.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::{PlacementError, PlacementResult};
use super::registry::AdapterRegistry;
use crate::catalog::{AdapterId, CatalogContext, LogicalColumn};
use crate::observability::{log_event_with_fields, Event};

/// Store selection policy
pub trait PlacementStrategy: Send + Sync {
    fn kind(&self) -> PlacementStrategyKind;

    /// Stores a newly created table is placed on.
    fn get_data_stores_for_new_entity(&self, registry: &AdapterRegistry) -> PlacementResult<Vec<AdapterId>>;

    /// Stores a column newly added to an existing table is placed on.
    fn get_data_stores_for_new_rel_field(
        &self,
        ctx: &CatalogContext<'_>,
        registry: &AdapterRegistry,
        column: &LogicalColumn,
    ) -> PlacementResult<Vec<AdapterId>>;
}

/// Configured placement policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlacementStrategyKind {
    #[default]
    ReplicateEverywhere,
    SingleStore,
}

impl PlacementStrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlacementStrategyKind::ReplicateEverywhere => "REPLICATE_EVERYWHERE",
            PlacementStrategyKind::SingleStore => "SINGLE_STORE",
        }
    }

    pub fn build(&self) -> Box<dyn PlacementStrategy> {
        match self {
            PlacementStrategyKind::ReplicateEverywhere => Box::new(ReplicateEverywhere),
            PlacementStrategyKind::SingleStore => Box::new(SingleStoreMinimal),
        }
    }
}

impl fmt::Display for PlacementStrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PlacementStrategyKind {
    type Err = PlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "REPLICATE_EVERYWHERE" => Ok(PlacementStrategyKind::ReplicateEverywhere),
            "SINGLE_STORE" | "SINGLE_STORE_MINIMAL" => Ok(PlacementStrategyKind::SingleStore),
            _ => Err(PlacementError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Every store gets a full replica
#[derive(Debug, Default, Clone, Copy)]
pub struct ReplicateEverywhere;

impl PlacementStrategy for ReplicateEverywhere {
    fn kind(&self) -> PlacementStrategyKind {
        PlacementStrategyKind::ReplicateEverywhere
    }

    fn get_data_stores_for_new_entity(&self, registry: &AdapterRegistry) -> PlacementResult<Vec<AdapterId>> {
        let stores: Vec<AdapterId> = registry.stores().iter().map(|a| a.id).collect();
        if stores.is_empty() {
            return Err(no_store(self.kind()));
        }
        Ok(stores)
    }

    /// The stores the column's table already lives on.
    fn get_data_stores_for_new_rel_field(
        &self,
        ctx: &CatalogContext<'_>,
        _registry: &AdapterRegistry,
        column: &LogicalColumn,
    ) -> PlacementResult<Vec<AdapterId>> {
        let stores: Vec<AdapterId> = ctx
            .allocation
            .get_allocations_for_table(column.table_id)
            .into_iter()
            .map(|a| a.adapter_id)
            .collect();
        if stores.is_empty() {
            return Err(no_table_placement(self.kind(), column));
        }
        Ok(stores)
    }
}

/// Everything goes to one store
#[derive(Debug, Default, Clone, Copy)]
pub struct SingleStoreMinimal;

impl PlacementStrategy for SingleStoreMinimal {
    fn kind(&self) -> PlacementStrategyKind {
        PlacementStrategyKind::SingleStore
    }

    /// The first registered store.
    fn get_data_stores_for_new_entity(&self, registry: &AdapterRegistry) -> PlacementResult<Vec<AdapterId>> {
        registry
            .stores()
            .first()
            .map(|a| vec![a.id])
            .ok_or_else(|| no_store(self.kind()))
    }

    /// The store backing the table's first allocation.
    fn get_data_stores_for_new_rel_field(
        &self,
        ctx: &CatalogContext<'_>,
        _registry: &AdapterRegistry,
        column: &LogicalColumn,
    ) -> PlacementResult<Vec<AdapterId>> {
        ctx.allocation
            .get_allocations_for_table(column.table_id)
            .first()
            .map(|a| vec![a.adapter_id])
            .ok_or_else(|| no_table_placement(self.kind(), column))
    }
}

fn no_store(kind: PlacementStrategyKind) -> PlacementError {
    log_event_with_fields(Event::PlacementNoStore, &[("strategy", kind.as_str())]);
    PlacementError::NoStoreAvailable
}

fn no_table_placement(kind: PlacementStrategyKind, column: &LogicalColumn) -> PlacementError {
    log_event_with_fields(
        Event::PlacementNoStore,
        &[
            ("column", column.name.as_str()),
            ("strategy", kind.as_str()),
            ("table_id", column.table_id.value().to_string().as_str()),
        ],
    );
    PlacementError::NoPlacementForTable(column.table_id.value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AllocationCatalog, ColumnId, ColumnType, IdGenerator, LogicalSchema, TableId};
    use crate::placement::Adapter;

    fn registry(stores: &[(u64, &str)]) -> AdapterRegistry {
        let mut registry = AdapterRegistry::new();
        registry.register(Adapter::source(100, "csv")).unwrap();
        for (id, name) in stores {
            registry.register(Adapter::store(*id, *name)).unwrap();
        }
        registry
    }

    fn column(table_id: TableId) -> LogicalColumn {
        LogicalColumn {
            id: ColumnId(77),
            table_id,
            name: "added".to_string(),
            column_type: ColumnType::Integer,
            position: 3,
        }
    }

    #[test]
    fn test_replicate_everywhere_uses_all_stores() {
        let stores = ReplicateEverywhere
            .get_data_stores_for_new_entity(&registry(&[(1, "a"), (2, "b")]))
            .unwrap();
        assert_eq!(stores, vec![AdapterId(1), AdapterId(2)]);
    }

    #[test]
    fn test_single_store_picks_first() {
        let stores = SingleStoreMinimal
            .get_data_stores_for_new_entity(&registry(&[(5, "a"), (2, "b")]))
            .unwrap();
        assert_eq!(stores, vec![AdapterId(5)]);
    }

    #[test]
    fn test_no_store_is_an_error() {
        let empty = registry(&[]);
        assert!(matches!(
            SingleStoreMinimal.get_data_stores_for_new_entity(&empty),
            Err(PlacementError::NoStoreAvailable)
        ));
        assert!(matches!(
            ReplicateEverywhere.get_data_stores_for_new_entity(&empty),
            Err(PlacementError::NoStoreAvailable)
        ));
    }

    #[test]
    fn test_new_field_follows_table_allocations() {
        let schema = LogicalSchema::new(IdGenerator::shared());
        let mut catalog = AllocationCatalog::new(IdGenerator::shared());
        let table = TableId(10);
        catalog.add_allocation(table, AdapterId(3)).unwrap();
        catalog.add_allocation(table, AdapterId(1)).unwrap();
        let ctx = CatalogContext::new(&schema, &catalog);
        let registry = registry(&[(1, "a"), (3, "c")]);

        let all = ReplicateEverywhere
            .get_data_stores_for_new_rel_field(&ctx, &registry, &column(table))
            .unwrap();
        assert_eq!(all, vec![AdapterId(3), AdapterId(1)]);

        let single = SingleStoreMinimal
            .get_data_stores_for_new_rel_field(&ctx, &registry, &column(table))
            .unwrap();
        assert_eq!(single, vec![AdapterId(3)]);
    }

    #[test]
    fn test_new_field_without_allocation_fails() {
        let schema = LogicalSchema::new(IdGenerator::shared());
        let catalog = AllocationCatalog::new(IdGenerator::shared());
        let ctx = CatalogContext::new(&schema, &catalog);
        let err = SingleStoreMinimal
            .get_data_stores_for_new_rel_field(&ctx, &registry(&[(1, "a")]), &column(TableId(4)))
            .unwrap_err();
        assert!(matches!(err, PlacementError::NoPlacementForTable(4)));
    }

    #[test]
    fn test_kind_parse_and_build() {
        let kind: PlacementStrategyKind = "single_store".parse().unwrap();
        assert_eq!(kind.build().kind(), PlacementStrategyKind::SingleStore);
        assert!("everywhere".parse::<PlacementStrategyKind>().is_err());
    }
}
