//! # Partitioning Errors

use thiserror::Error;

use crate::catalog::{CatalogError, ColumnType, PartitionType};

/// Result type for partition operations
pub type PartitionResult<T> = Result<T, PartitionError>;

/// Partition manager errors
///
/// Everything except `Catalog` is a configuration error surfaced to the
/// DDL caller.
#[derive(Debug, Clone, Error)]
pub enum PartitionError {
    // Setup errors
    #[error("Partitioning failed: a table cannot be partitioned into fewer than 2 partitions (got {0})")]
    TooFewPartitions(usize),

    #[error("Invalid partition qualifiers: {0}")]
    InvalidQualifiers(String),

    #[error("Partition function {partition_type} does not support columns of type {column_type:?}")]
    UnsupportedColumnType {
        partition_type: PartitionType,
        column_type: ColumnType,
    },

    #[error("Unknown partition scheme: {0}")]
    UnknownScheme(String),

    #[error("Partition names are not unique: '{0}' appears more than once")]
    DuplicatePartitionName(String),

    #[error("Column {column_id} is not a column of table {table_id}")]
    UnknownColumn { table_id: u64, column_id: u64 },

    #[error("Table {0} is already partitioned; merge it first")]
    AlreadyPartitioned(u64),

    // Settings errors
    #[error("Unknown partition setting: {0}")]
    UnknownSetting(String),

    #[error("Invalid value '{value}' for partition setting {name}: {reason}")]
    InvalidSetting {
        name: String,
        value: String,
        reason: String,
    },

    // Lookup errors
    #[error("Table {0} has no partition property")]
    MissingPartitionProperty(u64),

    #[error("Table {0} has no partitions")]
    NoPartitions(u64),

    #[error("Value '{value}' matches no partition of table {table_id} and no unbound partition exists")]
    NoMatchingPartition { table_id: u64, value: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl PartitionError {
    /// Whether the error stems from a bad partitioning configuration
    pub fn is_configuration_error(&self) -> bool {
        !matches!(
            self,
            PartitionError::Catalog(_)
                | PartitionError::MissingPartitionProperty(_)
                | PartitionError::NoPartitions(_)
                | PartitionError::NoMatchingPartition { .. }
        )
    }

    pub(crate) fn invalid_setting(
        name: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        PartitionError::InvalidSetting {
            name: name.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}
