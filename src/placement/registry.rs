//! Adapter registry
//!
//! The adapters themselves live outside this crate. The registry only
//! records their identity and capability flags, in registration order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::errors::{PlacementError, PlacementResult};
use crate::catalog::AdapterId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AdapterKind {
    /// Writable store, eligible for placements
    Store,
    /// Read-only data source
    Source,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterCapabilities {
    /// Survives restarts
    pub persistent: bool,
    /// Can hold individual horizontal partitions
    pub supports_partitioning: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adapter {
    pub id: AdapterId,
    pub unique_name: String,
    pub kind: AdapterKind,
    #[serde(default)]
    pub capabilities: AdapterCapabilities,
}

impl Adapter {
    pub fn store(id: u64, unique_name: impl Into<String>) -> Self {
        Self {
            id: AdapterId(id),
            unique_name: unique_name.into(),
            kind: AdapterKind::Store,
            capabilities: AdapterCapabilities {
                persistent: true,
                supports_partitioning: true,
            },
        }
    }

    pub fn source(id: u64, unique_name: impl Into<String>) -> Self {
        Self {
            id: AdapterId(id),
            unique_name: unique_name.into(),
            kind: AdapterKind::Source,
            capabilities: AdapterCapabilities::default(),
        }
    }

    pub fn is_store(&self) -> bool {
        self.kind == AdapterKind::Store
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdapterRegistry {
    adapters: BTreeMap<AdapterId, Adapter>,
    order: Vec<AdapterId>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, adapter: Adapter) -> PlacementResult<AdapterId> {
        if self.adapters.contains_key(&adapter.id) {
            return Err(PlacementError::DuplicateAdapter(adapter.id.value()));
        }
        if self.get_by_name(&adapter.unique_name).is_some() {
            return Err(PlacementError::DuplicateAdapterName(adapter.unique_name));
        }
        let id = adapter.id;
        self.order.push(id);
        self.adapters.insert(id, adapter);
        Ok(id)
    }

    pub fn deregister(&mut self, id: AdapterId) -> PlacementResult<Adapter> {
        let adapter = self
            .adapters
            .remove(&id)
            .ok_or(PlacementError::UnknownAdapter(id.value()))?;
        self.order.retain(|a| *a != id);
        Ok(adapter)
    }

    pub fn get(&self, id: AdapterId) -> Option<&Adapter> {
        self.adapters.get(&id)
    }

    pub fn get_by_name(&self, unique_name: &str) -> Option<&Adapter> {
        self.adapters
            .values()
            .find(|a| a.unique_name.eq_ignore_ascii_case(unique_name))
    }

    /// Registered stores, in registration order.
    pub fn stores(&self) -> Vec<&Adapter> {
        self.order
            .iter()
            .filter_map(|id| self.adapters.get(id))
            .filter(|a| a.is_store())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stores_in_registration_order() {
        let mut registry = AdapterRegistry::new();
        registry.register(Adapter::store(9, "hsqldb")).unwrap();
        registry.register(Adapter::source(2, "csv")).unwrap();
        registry.register(Adapter::store(4, "postgres")).unwrap();

        let stores: Vec<u64> = registry.stores().iter().map(|a| a.id.value()).collect();
        assert_eq!(stores, vec![9, 4]);
    }

    #[test]
    fn test_duplicates_rejected() {
        let mut registry = AdapterRegistry::new();
        registry.register(Adapter::store(1, "hsqldb")).unwrap();
        assert!(matches!(
            registry.register(Adapter::store(1, "other")),
            Err(PlacementError::DuplicateAdapter(1))
        ));
        assert!(matches!(
            registry.register(Adapter::store(2, "HSQLDB")),
            Err(PlacementError::DuplicateAdapterName(_))
        ));
    }

    #[test]
    fn test_deregister() {
        let mut registry = AdapterRegistry::new();
        registry.register(Adapter::store(1, "a")).unwrap();
        registry.deregister(AdapterId(1)).unwrap();
        assert!(registry.stores().is_empty());
        assert!(registry.deregister(AdapterId(1)).is_err());
    }
}
