//! # Placement Errors

use thiserror::Error;

use crate::catalog::CatalogError;

/// Result type for placement operations
pub type PlacementResult<T> = Result<T, PlacementError>;

/// Placement errors
///
/// `NoStoreAvailable` and `NoPlacementForTable` are configuration errors:
/// the caller must not proceed with the DDL statement.
#[derive(Debug, Clone, Error)]
pub enum PlacementError {
    #[error("No data store is available to place a new entity")]
    NoStoreAvailable,

    #[error("Table {0} has no placement to extend with a new column")]
    NoPlacementForTable(u64),

    #[error("Adapter {0} is already registered")]
    DuplicateAdapter(u64),

    #[error("Adapter name '{0}' is already registered")]
    DuplicateAdapterName(String),

    #[error("Unknown adapter: {0}")]
    UnknownAdapter(u64),

    #[error("Unknown table: {0}")]
    UnknownTable(u64),

    #[error("Unknown column: {0}")]
    UnknownColumn(u64),

    #[error("Unknown placement strategy: {0}")]
    UnknownStrategy(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl PlacementError {
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            PlacementError::NoStoreAvailable
                | PlacementError::NoPlacementForTable(_)
                | PlacementError::UnknownStrategy(_)
        )
    }
}
