//! RANGE partitioning
//!
//! Each named group carries two qualifiers, an inclusive lower and upper
//! numeric bound. Values no range covers land in the implicit unbound
//! group.

use super::errors::{PartitionError, PartitionResult};
use super::manager::{property_of, validate_base_setup, PartitionManager};
use crate::catalog::{
    CatalogContext, ColumnType, LogicalColumn, PartitionGroup, PartitionId, PartitionType, TableId,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct RangePartitionManager;

/// Inclusive numeric bounds of one RANGE group
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeBounds {
    pub lower: f64,
    pub upper: f64,
}

impl RangeBounds {
    /// Parse `[lower, upper]` qualifiers.
    pub fn parse(qualifiers: &[String]) -> PartitionResult<Self> {
        let [lower, upper] = qualifiers else {
            return Err(PartitionError::InvalidQualifiers(format!(
                "RANGE partitions need exactly two bounds, got {}",
                qualifiers.len()
            )));
        };
        let lower = parse_bound(lower)?;
        let upper = parse_bound(upper)?;
        if lower > upper {
            return Err(PartitionError::InvalidQualifiers(format!(
                "lower bound {} exceeds upper bound {}",
                lower, upper
            )));
        }
        Ok(Self { lower, upper })
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    fn overlaps(&self, other: &RangeBounds) -> bool {
        self.lower <= other.upper && other.lower <= self.upper
    }
}

fn parse_bound(raw: &str) -> PartitionResult<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| PartitionError::InvalidQualifiers(format!("'{}' is not a numeric bound", raw)))
}

/// First partition of the unbound group among `groups`.
pub(crate) fn unbound_partition(groups: &[&PartitionGroup]) -> Option<PartitionId> {
    groups
        .iter()
        .find(|g| g.is_unbound)
        .and_then(|g| g.partition_ids.first().copied())
}

/// Groups of the table's current partitioning, in partitioning order.
pub(crate) fn property_groups<'a>(
    ctx: &CatalogContext<'a>,
    table_id: TableId,
) -> PartitionResult<Vec<&'a PartitionGroup>> {
    let property = property_of(ctx, table_id)?;
    Ok(property
        .partition_group_ids
        .iter()
        .filter_map(|id| ctx.allocation.get_partition_group(*id))
        .collect())
}

impl PartitionManager for RangePartitionManager {
    fn partition_type(&self) -> PartitionType {
        PartitionType::Range
    }

    fn get_target_partition_id(
        &self,
        ctx: &CatalogContext<'_>,
        table_id: TableId,
        column_value: &str,
    ) -> PartitionResult<PartitionId> {
        let groups = property_groups(ctx, table_id)?;

        if let Ok(value) = column_value.trim().parse::<f64>() {
            for group in groups.iter().filter(|g| !g.is_unbound) {
                let Ok(bounds) = RangeBounds::parse(&group.qualifiers) else {
                    continue;
                };
                if bounds.contains(value) {
                    if let Some(partition_id) = group.partition_ids.first() {
                        return Ok(*partition_id);
                    }
                }
            }
        }

        unbound_partition(&groups).ok_or_else(|| PartitionError::NoMatchingPartition {
            table_id: table_id.value(),
            value: column_value.to_string(),
        })
    }

    fn validate_partition_setup(
        &self,
        qualifiers: &[Vec<String>],
        number_of_partitions: usize,
        names: &[String],
        column: &LogicalColumn,
    ) -> PartitionResult<()> {
        validate_base_setup(self, number_of_partitions, names, column)?;

        if qualifiers.is_empty() {
            return Err(PartitionError::InvalidQualifiers(
                "RANGE partitioning requires bounds for every partition".to_string(),
            ));
        }
        if qualifiers.len() != names.len() {
            return Err(PartitionError::InvalidQualifiers(format!(
                "{} partition names but {} bound pairs",
                names.len(),
                qualifiers.len()
            )));
        }

        let mut seen: Vec<RangeBounds> = Vec::with_capacity(qualifiers.len());
        for q in qualifiers {
            let bounds = RangeBounds::parse(q)?;
            if let Some(other) = seen.iter().find(|other| other.overlaps(&bounds)) {
                return Err(PartitionError::InvalidQualifiers(format!(
                    "range [{}, {}] overlaps [{}, {}]",
                    bounds.lower, bounds.upper, other.lower, other.upper
                )));
            }
            seen.push(bounds);
        }
        Ok(())
    }

    fn requires_unbound_partition_group(&self) -> bool {
        true
    }

    fn supports_column_of_type(&self, column_type: ColumnType) -> bool {
        column_type.is_numeric()
    }
}
