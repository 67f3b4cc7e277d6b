//! Allocation entities
//!
//! Plain data records stored by the allocation catalog. None of them own
//! behavior beyond construction and simple accessors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ids::{AdapterId, AllocationId, ColumnId, PartitionGroupId, PartitionId, TableId};
use crate::partition::TemperatureProperty;

/// Partitioning scheme of a logical table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PartitionType {
    /// Not partitioned: one group holding one partition
    None,
    Hash,
    Range,
    List,
    /// HOT/COLD classification by access frequency
    Temperature,
}

impl PartitionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartitionType::None => "NONE",
            PartitionType::Hash => "HASH",
            PartitionType::Range => "RANGE",
            PartitionType::List => "LIST",
            PartitionType::Temperature => "TEMPERATURE",
        }
    }
}

impl fmt::Display for PartitionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PartitionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NONE" => Ok(PartitionType::None),
            "HASH" => Ok(PartitionType::Hash),
            "RANGE" => Ok(PartitionType::Range),
            "LIST" => Ok(PartitionType::List),
            "TEMPERATURE" => Ok(PartitionType::Temperature),
            other => Err(format!("unknown partition type '{}'", other)),
        }
    }
}

/// How a placement came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlacementType {
    /// Requested explicitly by DDL
    Manual,
    /// Chosen by a placement strategy
    Automatic,
}

/// An adapter holds some physical representation of a logical table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationPlacement {
    pub id: AllocationId,
    pub logical_table_id: TableId,
    pub adapter_id: AdapterId,
}

/// A column stored on an adapter as part of an allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPlacement {
    pub allocation_id: AllocationId,
    pub adapter_id: AdapterId,
    pub table_id: TableId,
    pub column_id: ColumnId,
    pub placement_type: PlacementType,
    /// Ordinal of the column in the physical layout of the allocation
    pub physical_position: u64,
    pub physical_name: Option<String>,
}

/// A disjoint subset of a table's rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HorizontalPartition {
    pub id: PartitionId,
    pub logical_table_id: TableId,
    pub partition_group_id: Option<PartitionGroupId>,
    /// Scheme-specific qualifiers (range bounds, list values)
    pub qualifiers: Vec<String>,
    /// Catch-all partition for values no qualifier matches
    pub is_unbound: bool,
}

/// A subset of a table's columns stored together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerticalPartition {
    pub id: PartitionId,
    pub logical_table_id: TableId,
    pub column_ids: Vec<ColumnId>,
}

/// Named cluster of partitions sharing a classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionGroup {
    pub id: PartitionGroupId,
    pub logical_table_id: TableId,
    pub name: String,
    pub partition_type: PartitionType,
    /// Number of internal partitions (chunks) the group was created with
    pub internal_partition_count: u64,
    pub qualifiers: Vec<String>,
    pub is_unbound: bool,
    pub partition_ids: Vec<PartitionId>,
}

/// An adapter physically stores a horizontal partition of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionPlacement {
    pub adapter_id: AdapterId,
    pub table_id: TableId,
    pub partition_id: PartitionId,
    pub placement_type: PlacementType,
}

/// Partitioning configuration of a table.
///
/// `partition_ids` follows the partitions of the table's groups: it is
/// replaced by `partition_table` / `merge_table` and tracks single
/// partitions added to or deleted from those groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionProperty {
    pub partition_type: PartitionType,
    pub partition_column_id: Option<ColumnId>,
    pub partition_group_ids: Vec<PartitionGroupId>,
    pub partition_ids: Vec<PartitionId>,
    #[serde(default)]
    pub temperature: Option<TemperatureProperty>,
}

impl PartitionProperty {
    /// Total number of partitions of the table.
    pub fn total_partitions(&self) -> usize {
        self.partition_ids.len()
    }

    pub fn is_partitioned(&self) -> bool {
        self.partition_type != PartitionType::None
    }
}

/// Everything one adapter holds of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPlacement {
    pub adapter_id: AdapterId,
    pub table_id: TableId,
    pub column_ids: Vec<ColumnId>,
    pub partition_ids: Vec<PartitionId>,
}
