//! HASH partitioning
//!
//! Rows are spread by a CRC32 of the value's UTF-8 bytes, so the mapping
//! is identical in every process and on every platform.

use super::errors::{PartitionError, PartitionResult};
use super::manager::{property_of, validate_base_setup, PartitionManager};
use crate::catalog::{CatalogContext, LogicalColumn, PartitionId, PartitionType, TableId};

#[derive(Debug, Default, Clone, Copy)]
pub struct HashPartitionManager;

impl HashPartitionManager {
    /// Index of the bucket `column_value` hashes to among `partition_count`.
    pub fn bucket(column_value: &str, partition_count: usize) -> usize {
        debug_assert!(partition_count > 0);
        (crc32fast::hash(column_value.as_bytes()) as usize) % partition_count
    }

    /// Pick a partition out of `partition_ids` for `column_value`.
    pub(crate) fn hash_into(
        table_id: TableId,
        partition_ids: &[PartitionId],
        column_value: &str,
    ) -> PartitionResult<PartitionId> {
        if partition_ids.is_empty() {
            return Err(PartitionError::NoPartitions(table_id.value()));
        }
        Ok(partition_ids[Self::bucket(column_value, partition_ids.len())])
    }
}

impl PartitionManager for HashPartitionManager {
    fn partition_type(&self) -> PartitionType {
        PartitionType::Hash
    }

    fn get_target_partition_id(
        &self,
        ctx: &CatalogContext<'_>,
        table_id: TableId,
        column_value: &str,
    ) -> PartitionResult<PartitionId> {
        let property = property_of(ctx, table_id)?;
        Self::hash_into(table_id, &property.partition_ids, column_value)
    }

    fn validate_partition_setup(
        &self,
        qualifiers: &[Vec<String>],
        number_of_partitions: usize,
        names: &[String],
        column: &LogicalColumn,
    ) -> PartitionResult<()> {
        if qualifiers.iter().any(|q| !q.is_empty()) {
            return Err(PartitionError::InvalidQualifiers(
                "HASH partitioning does not accept partition qualifiers".to_string(),
            ));
        }
        validate_base_setup(self, number_of_partitions, names, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ColumnId, ColumnType};

    fn column() -> LogicalColumn {
        LogicalColumn {
            id: ColumnId(1),
            table_id: TableId(1),
            name: "id".to_string(),
            column_type: ColumnType::Integer,
            position: 1,
        }
    }

    #[test]
    fn test_bucket_is_stable() {
        assert_eq!(HashPartitionManager::bucket("42", 4), HashPartitionManager::bucket("42", 4));
        // crc32("42") is fixed, so the bucket is fixed across processes
        assert_eq!(
            HashPartitionManager::bucket("42", 7),
            (crc32fast::hash(b"42") % 7) as usize
        );
    }

    #[test]
    fn test_hash_into_empty_fails() {
        let err = HashPartitionManager::hash_into(TableId(3), &[], "x").unwrap_err();
        assert!(matches!(err, PartitionError::NoPartitions(3)));
    }

    #[test]
    fn test_setup_rejects_qualifiers() {
        let err = HashPartitionManager
            .validate_partition_setup(&[vec!["1".to_string()]], 4, &[], &column())
            .unwrap_err();
        assert!(matches!(err, PartitionError::InvalidQualifiers(_)));
    }

    #[test]
    fn test_setup_rejects_single_partition() {
        let err = HashPartitionManager
            .validate_partition_setup(&[], 1, &[], &column())
            .unwrap_err();
        assert!(matches!(err, PartitionError::TooFewPartitions(1)));

        let names = vec!["only".to_string()];
        let err = HashPartitionManager
            .validate_partition_setup(&[], 0, &names, &column())
            .unwrap_err();
        assert!(matches!(err, PartitionError::TooFewPartitions(1)));
    }

    #[test]
    fn test_setup_accepts_names() {
        let names = vec!["a".to_string(), "b".to_string()];
        assert!(HashPartitionManager
            .validate_partition_setup(&[], 0, &names, &column())
            .is_ok());
    }
}
