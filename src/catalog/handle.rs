//! Committed catalog state and transactional working copies
//!
//! Readers take an `Arc` snapshot of the committed catalog and read it
//! without holding any lock. A DDL transaction works on a private
//! `copy()` and publishes it with a single pointer swap on commit.

use std::sync::{Arc, RwLock};

use super::allocation::AllocationCatalog;
use super::errors::CatalogResult;
use crate::observability::{log_event_with_fields, Event};

/// Owner of the committed allocation catalog
#[derive(Debug)]
pub struct CatalogHandle {
    committed: RwLock<Arc<AllocationCatalog>>,
}

impl CatalogHandle {
    pub fn new(catalog: AllocationCatalog) -> Self {
        Self {
            committed: RwLock::new(Arc::new(catalog)),
        }
    }

    /// Current committed catalog.
    ///
    /// The returned snapshot never changes; later commits install a new one.
    pub fn snapshot(&self) -> Arc<AllocationCatalog> {
        let guard = self
            .committed
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    /// Start a transaction on a private copy of the committed catalog.
    ///
    /// Concurrent transactions are not arbitrated here: the caller must
    /// hold exclusive DDL access, otherwise the last commit wins.
    pub fn begin(&self) -> CatalogResult<CatalogTransaction<'_>> {
        let working = self.snapshot().copy()?;
        log_event_with_fields(Event::CatalogTransactionBegin, &[]);
        Ok(CatalogTransaction {
            handle: self,
            working,
        })
    }

    fn install(&self, catalog: AllocationCatalog) -> Arc<AllocationCatalog> {
        let installed = Arc::new(catalog);
        let mut guard = self
            .committed
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::clone(&installed);
        installed
    }
}

/// A transaction's isolated working copy
///
/// Dropping the transaction without `commit()` discards every change.
#[derive(Debug)]
pub struct CatalogTransaction<'a> {
    handle: &'a CatalogHandle,
    working: AllocationCatalog,
}

impl<'a> CatalogTransaction<'a> {
    pub fn catalog(&self) -> &AllocationCatalog {
        &self.working
    }

    pub fn catalog_mut(&mut self) -> &mut AllocationCatalog {
        &mut self.working
    }

    /// Publish the working copy as the committed catalog.
    pub fn commit(mut self) -> Arc<AllocationCatalog> {
        self.working.commit();
        let installed = self.handle.install(self.working);
        log_event_with_fields(Event::CatalogCommit, &[]);
        installed
    }

    /// Discard the working copy.
    pub fn rollback(mut self) {
        self.working.rollback();
        log_event_with_fields(Event::CatalogRollback, &[]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{IdGenerator, TableId};

    #[test]
    fn test_commit_publishes_changes() {
        let handle = CatalogHandle::new(AllocationCatalog::new(IdGenerator::shared()));
        let before = handle.snapshot();

        let mut tx = handle.begin().unwrap();
        let partition = tx.catalog_mut().add_horizontal_placement(TableId(1));
        tx.commit();

        assert!(before.get_horizontal_partition(partition).is_none());
        assert!(handle.snapshot().get_horizontal_partition(partition).is_some());
    }

    #[test]
    fn test_rollback_discards_changes() {
        let handle = CatalogHandle::new(AllocationCatalog::new(IdGenerator::shared()));

        let mut tx = handle.begin().unwrap();
        let partition = tx.catalog_mut().add_horizontal_placement(TableId(1));
        tx.rollback();

        assert!(handle.snapshot().get_horizontal_partition(partition).is_none());
    }

    #[test]
    fn test_dropped_transaction_discards_changes() {
        let handle = CatalogHandle::new(AllocationCatalog::new(IdGenerator::shared()));
        {
            let mut tx = handle.begin().unwrap();
            tx.catalog_mut().add_vertical_placement(TableId(1));
        }
        assert!(handle.snapshot().get_vertical_partitions_by_table(TableId(1)).is_empty());
    }
}
