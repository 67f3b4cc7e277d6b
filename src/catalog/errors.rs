//! Allocation catalog error types
//!
//! Error codes:
//! - POLY_CATALOG_UNKNOWN_TABLE (REJECT)
//! - POLY_CATALOG_UNKNOWN_ALLOCATION (REJECT)
//! - POLY_CATALOG_UNKNOWN_PARTITION (REJECT)
//! - POLY_CATALOG_UNKNOWN_PARTITION_GROUP (REJECT)
//! - POLY_CATALOG_UNKNOWN_COLUMN_PLACEMENT (REJECT)
//! - POLY_CATALOG_DUPLICATE_PLACEMENT (REJECT)
//! - POLY_CATALOG_SNAPSHOT_FAILED (FATAL)

use std::fmt;

/// Severity levels for catalog errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The DDL request is rejected, catalog state is untouched
    Reject,
    /// The catalog could not produce a consistent copy of itself
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Catalog-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogErrorCode {
    /// Logical table has no allocation state
    UnknownTable,
    /// No allocation for the (adapter, table) pair
    UnknownAllocation,
    /// Partition id not found
    UnknownPartition,
    /// Partition group id not found
    UnknownPartitionGroup,
    /// Column has no placement on the adapter
    UnknownColumnPlacement,
    /// Placement already exists
    DuplicatePlacement,
    /// Serialize/deserialize round-trip failed
    SnapshotFailed,
}

impl CatalogErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            CatalogErrorCode::UnknownTable => "POLY_CATALOG_UNKNOWN_TABLE",
            CatalogErrorCode::UnknownAllocation => "POLY_CATALOG_UNKNOWN_ALLOCATION",
            CatalogErrorCode::UnknownPartition => "POLY_CATALOG_UNKNOWN_PARTITION",
            CatalogErrorCode::UnknownPartitionGroup => "POLY_CATALOG_UNKNOWN_PARTITION_GROUP",
            CatalogErrorCode::UnknownColumnPlacement => "POLY_CATALOG_UNKNOWN_COLUMN_PLACEMENT",
            CatalogErrorCode::DuplicatePlacement => "POLY_CATALOG_DUPLICATE_PLACEMENT",
            CatalogErrorCode::SnapshotFailed => "POLY_CATALOG_SNAPSHOT_FAILED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            CatalogErrorCode::SnapshotFailed => Severity::Fatal,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for CatalogErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Catalog error with code and message
#[derive(Debug, Clone)]
pub struct CatalogError {
    code: CatalogErrorCode,
    message: String,
}

impl CatalogError {
    fn new(code: CatalogErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn unknown_table(table_id: u64) -> Self {
        Self::new(
            CatalogErrorCode::UnknownTable,
            format!("Logical table {} not found", table_id),
        )
    }

    pub fn unknown_allocation(adapter_id: u64, table_id: u64) -> Self {
        Self::new(
            CatalogErrorCode::UnknownAllocation,
            format!(
                "No allocation of table {} on adapter {}",
                table_id, adapter_id
            ),
        )
    }

    pub fn unknown_allocation_id(allocation_id: u64) -> Self {
        Self::new(
            CatalogErrorCode::UnknownAllocation,
            format!("Allocation {} not found", allocation_id),
        )
    }

    pub fn unknown_partition(partition_id: u64) -> Self {
        Self::new(
            CatalogErrorCode::UnknownPartition,
            format!("Partition {} not found", partition_id),
        )
    }

    pub fn unknown_partition_group(group_id: u64) -> Self {
        Self::new(
            CatalogErrorCode::UnknownPartitionGroup,
            format!("Partition group {} not found", group_id),
        )
    }

    pub fn unknown_column_placement(adapter_id: u64, column_id: u64) -> Self {
        Self::new(
            CatalogErrorCode::UnknownColumnPlacement,
            format!(
                "Column {} has no placement on adapter {}",
                column_id, adapter_id
            ),
        )
    }

    pub fn duplicate_placement(what: impl Into<String>) -> Self {
        Self::new(CatalogErrorCode::DuplicatePlacement, what)
    }

    pub fn snapshot_failed(reason: impl fmt::Display) -> Self {
        Self::new(
            CatalogErrorCode::SnapshotFailed,
            format!("Catalog copy failed: {}", reason),
        )
    }

    /// Returns the error code
    pub fn code(&self) -> CatalogErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.code.severity() == Severity::Fatal
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for CatalogError {}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
