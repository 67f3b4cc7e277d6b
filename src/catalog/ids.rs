//! Identity types and the process-wide id generator
//!
//! Every id handed out by the catalog (tables, columns, allocations,
//! partitions, partition groups) comes from one `IdGenerator`, so ids are
//! unique across kinds and strictly increasing in issue order.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

macro_rules! catalog_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Returns the underlying value.
            #[inline]
            pub fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}:{}", $label, self.0)
            }
        }
    };
}

catalog_id!(
    /// Logical table identity.
    TableId,
    "table"
);
catalog_id!(
    /// Logical column identity.
    ColumnId,
    "column"
);
catalog_id!(
    /// Registered adapter (store or source) identity.
    AdapterId,
    "adapter"
);
catalog_id!(
    /// Horizontal or vertical partition identity.
    PartitionId,
    "partition"
);
catalog_id!(
    /// Partition group identity.
    PartitionGroupId,
    "partition_group"
);
catalog_id!(
    /// Allocation placement identity: one per (table, adapter) pair.
    AllocationId,
    "allocation"
);

/// Monotonic id source shared by every catalog instance of a process.
///
/// A catalog copy keeps a handle to the same generator, so a transaction
/// working on its private copy can never issue an id the committed
/// catalog (or another transaction) already issued.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    /// Create a generator whose first id is 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator that continues after `last_issued`.
    ///
    /// Used when rebuilding a catalog from persisted state.
    pub fn starting_after(last_issued: u64) -> Self {
        Self {
            last: AtomicU64::new(last_issued),
        }
    }

    /// Create a new shared generator.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Issue the next id.
    pub fn next_id(&self) -> u64 {
        self.last.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Highest id issued so far (0 if none).
    pub fn last_issued(&self) -> u64 {
        self.last.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let ids = IdGenerator::new();
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
        assert_eq!(ids.last_issued(), 2);
    }

    #[test]
    fn test_starting_after_continues_sequence() {
        let ids = IdGenerator::starting_after(41);
        assert_eq!(ids.next_id(), 42);
    }

    #[test]
    fn test_concurrent_issue_is_unique() {
        let ids = IdGenerator::shared();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ids = Arc::clone(&ids);
                thread::spawn(move || (0..250).map(|_| ids.next_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "id {} issued twice", id);
            }
        }
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn test_id_display() {
        assert_eq!(PartitionId(7).to_string(), "partition:7");
        assert_eq!(AdapterId(2).to_string(), "adapter:2");
    }
}
