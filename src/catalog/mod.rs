//! Allocation catalog subsystem
//!
//! Records how each logical table is decomposed into horizontal
//! partitions (row subsets) and vertical partitions (column subsets), and
//! which adapters hold which pieces.
//!
//! # Invariants
//!
//! - Partition, group and allocation ids come from one `IdGenerator` and
//!   are unique and increasing across every kind
//! - A table's partition count only changes through `partition_table` or
//!   `merge_table`
//! - `AllocationCatalog::copy()` is a value: mutating the copy never
//!   affects the source and vice versa
//!
//! There are no process-wide singletons. Callers thread a
//! `CatalogContext` (logical schema + allocation catalog) through every
//! placement and routing call.

mod allocation;
mod entities;
mod errors;
mod handle;
mod ids;
mod logical;

pub use allocation::AllocationCatalog;
pub use entities::{
    AllocationPlacement, ColumnPlacement, DataPlacement, HorizontalPartition, PartitionGroup,
    PartitionPlacement, PartitionProperty, PartitionType, PlacementType, VerticalPartition,
};
pub use errors::{CatalogError, CatalogErrorCode, CatalogResult, Severity};
pub use handle::{CatalogHandle, CatalogTransaction};
pub use ids::{
    AdapterId, AllocationId, ColumnId, IdGenerator, PartitionGroupId, PartitionId, TableId,
};
pub use logical::{ColumnType, LogicalCatalog, LogicalColumn, LogicalSchema, LogicalTable};

/// Explicit catalog handle passed to partition managers and placement
/// strategies.
#[derive(Clone, Copy)]
pub struct CatalogContext<'a> {
    pub logical: &'a dyn LogicalCatalog,
    pub allocation: &'a AllocationCatalog,
}

impl<'a> CatalogContext<'a> {
    pub fn new(logical: &'a dyn LogicalCatalog, allocation: &'a AllocationCatalog) -> Self {
        Self {
            logical,
            allocation,
        }
    }
}
