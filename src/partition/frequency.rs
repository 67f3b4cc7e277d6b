//! HOT/COLD reclassification for temperature partitioned tables
//!
//! # Policy
//!
//! - Accesses per chunk are counted over the table's frequency window,
//!   filtered by its cost indication
//! - Chunks are ranked by access count (descending, ties by id)
//! - The top `in%` become HOT; a HOT chunk stays HOT while it is in the
//!   top `out%`; every other HOT chunk is demoted to COLD
//! - Chunks without accesses are never ranked into HOT. Ranking only
//!   accessed chunks replaces a walk over every counted chunk that
//!   would let untouched chunks fill the HOT quota on ties at zero
//!
//! # Atomicity
//!
//! All moves of one table happen in one catalog transaction: concurrent
//! readers see either the old or the new classification, never a mix.
//! Cadence is up to the caller (`process_all(now)`); nothing here spawns
//! threads.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::errors::{PartitionError, PartitionResult};
use super::temperature::{CostIndication, TemperatureProperty};
use crate::catalog::{
    AdapterId, AllocationCatalog, CatalogHandle, PartitionId, PartitionType, PlacementType, TableId,
};
use crate::observability::{log_event_with_fields, Event, Logger, MetricsRegistry, ObservationScope};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccessKind {
    Read,
    Write,
}

impl AccessKind {
    fn counts_for(&self, indication: CostIndication) -> bool {
        match indication {
            CostIndication::All => true,
            CostIndication::Read => *self == AccessKind::Read,
            CostIndication::Write => *self == AccessKind::Write,
        }
    }
}

/// One monitored query or DML statement and the partitions it touched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessEvent {
    pub timestamp: DateTime<Utc>,
    pub kind: AccessKind,
    pub partition_ids: Vec<PartitionId>,
}

/// Source of monitored partition accesses
pub trait AccessFrequencySource: Send + Sync {
    /// Events with a timestamp at or after `since`.
    fn accesses_since(&self, since: DateTime<Utc>) -> Vec<AccessEvent>;
}

/// In-memory access log
#[derive(Debug, Default)]
pub struct AccessLog {
    events: Mutex<Vec<AccessEvent>>,
}

impl AccessLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: AccessEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }

    pub fn record_read(&self, timestamp: DateTime<Utc>, partition_ids: Vec<PartitionId>) {
        self.record(AccessEvent {
            timestamp,
            kind: AccessKind::Read,
            partition_ids,
        });
    }

    pub fn record_write(&self, timestamp: DateTime<Utc>, partition_ids: Vec<PartitionId>) {
        self.record(AccessEvent {
            timestamp,
            kind: AccessKind::Write,
            partition_ids,
        });
    }

    /// Drop events older than `cutoff`. Returns how many were dropped.
    pub fn prune_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut events = self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let before = events.len();
        events.retain(|e| e.timestamp >= cutoff);
        before - events.len()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AccessFrequencySource for AccessLog {
    fn accesses_since(&self, since: DateTime<Utc>) -> Vec<AccessEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|e| e.timestamp >= since)
            .cloned()
            .collect()
    }
}

/// Chunk moves decided for one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redistribution {
    pub table_id: TableId,
    pub cold_to_hot: Vec<PartitionId>,
    pub hot_to_cold: Vec<PartitionId>,
}

impl Redistribution {
    pub fn is_empty(&self) -> bool {
        self.cold_to_hot.is_empty() && self.hot_to_cold.is_empty()
    }

    pub fn moved(&self) -> usize {
        self.cold_to_hot.len() + self.hot_to_cold.len()
    }
}

/// Access-frequency driven reclassifier
pub struct FrequencyMap<S: AccessFrequencySource> {
    source: S,
    metrics: Arc<MetricsRegistry>,
}

impl<S: AccessFrequencySource> FrequencyMap<S> {
    pub fn new(source: S) -> Self {
        Self::with_metrics(source, Arc::new(MetricsRegistry::new()))
    }

    pub fn with_metrics(source: S, metrics: Arc<MetricsRegistry>) -> Self {
        Self { source, metrics }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Reclassify every temperature partitioned table.
    ///
    /// A failing table is logged and skipped; the others still commit.
    pub fn process_all(&self, handle: &CatalogHandle, now: DateTime<Utc>) -> Vec<Redistribution> {
        let scope = ObservationScope::new("RECLASSIFICATION");
        let tables = handle
            .snapshot()
            .get_tables_by_partition_type(PartitionType::Temperature);

        let mut applied = Vec::new();
        for table_id in tables {
            match self.process_table(handle, table_id, now) {
                Ok(redistribution) if !redistribution.is_empty() => applied.push(redistribution),
                Ok(_) => {}
                Err(err) => Logger::error(
                    "RECLASSIFICATION_TABLE_FAILED",
                    &[
                        ("reason", err.to_string().as_str()),
                        ("table_id", table_id.value().to_string().as_str()),
                    ],
                ),
            }
        }
        self.metrics.increment_reclassification_runs();
        scope.complete_with_fields(&[("tables_changed", applied.len().to_string().as_str())]);
        applied
    }

    /// Reclassify one table and commit the result.
    pub fn process_table(
        &self,
        handle: &CatalogHandle,
        table_id: TableId,
        now: DateTime<Utc>,
    ) -> PartitionResult<Redistribution> {
        let mut tx = handle.begin()?;
        let (partition_ids, temperature) = temperature_of(tx.catalog(), table_id)?;

        let counts = self.determine_partition_frequency(&partition_ids, &temperature, now);
        let redistribution = determine_redistribution(tx.catalog(), table_id, &temperature, &counts);

        if redistribution.is_empty() {
            tx.rollback();
            return Ok(redistribution);
        }

        apply(tx.catalog_mut(), &temperature, &redistribution)?;
        tx.commit();

        self.metrics
            .add_partitions_reclassified(redistribution.moved() as u64);
        log_event_with_fields(
            Event::PartitionReclassified,
            &[
                ("cold_to_hot", redistribution.cold_to_hot.len().to_string().as_str()),
                ("hot_to_cold", redistribution.hot_to_cold.len().to_string().as_str()),
                ("table_id", table_id.value().to_string().as_str()),
            ],
        );
        Ok(redistribution)
    }

    /// Access count of every chunk over the table's window.
    ///
    /// Accesses to partitions of other tables are ignored.
    pub fn determine_partition_frequency(
        &self,
        partition_ids: &[PartitionId],
        temperature: &TemperatureProperty,
        now: DateTime<Utc>,
    ) -> BTreeMap<PartitionId, u64> {
        let mut counts: BTreeMap<PartitionId, u64> =
            partition_ids.iter().map(|id| (*id, 0)).collect();
        let since = now - temperature.frequency_window.duration();

        for event in self.source.accesses_since(since) {
            if !event.kind.counts_for(temperature.cost_indication) {
                continue;
            }
            for partition_id in &event.partition_ids {
                if let Some(count) = counts.get_mut(partition_id) {
                    *count += 1;
                }
            }
        }
        counts
    }
}

fn temperature_of(
    catalog: &AllocationCatalog,
    table_id: TableId,
) -> PartitionResult<(Vec<PartitionId>, TemperatureProperty)> {
    let property = catalog
        .get_partition_property(table_id)
        .ok_or(PartitionError::MissingPartitionProperty(table_id.value()))?;
    let temperature = property
        .temperature
        .clone()
        .ok_or(PartitionError::MissingPartitionProperty(table_id.value()))?;
    Ok((property.partition_ids.clone(), temperature))
}

/// Decide which chunks change group given their access counts.
pub fn determine_redistribution(
    catalog: &AllocationCatalog,
    table_id: TableId,
    temperature: &TemperatureProperty,
    counts: &BTreeMap<PartitionId, u64>,
) -> Redistribution {
    let total = counts.len() as u64;
    let promote = (total * u64::from(temperature.hot_access_percentage_in) / 100) as usize;
    let allowed = (total * u64::from(temperature.hot_access_percentage_out) / 100) as usize;

    let mut ranked: Vec<(PartitionId, u64)> = counts
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(id, count)| (*id, *count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let candidates: Vec<PartitionId> = ranked.iter().take(promote).map(|(id, _)| *id).collect();
    let allowed_in_hot: BTreeSet<PartitionId> =
        ranked.iter().take(allowed.max(promote)).map(|(id, _)| *id).collect();

    let current_hot: BTreeSet<PartitionId> = catalog
        .get_partitions(temperature.hot_partition_group_id)
        .into_iter()
        .map(|p| p.id)
        .collect();

    Redistribution {
        table_id,
        cold_to_hot: candidates
            .into_iter()
            .filter(|id| !current_hot.contains(id))
            .collect(),
        hot_to_cold: current_hot
            .into_iter()
            .filter(|id| !allowed_in_hot.contains(id))
            .collect(),
    }
}

/// Move chunks between the groups and their adapters.
///
/// Adapters holding both groups already store every chunk and are left
/// alone. A HOT-only adapter gains the promoted chunks and loses the
/// demoted ones; a COLD-only adapter the reverse.
pub fn apply(
    catalog: &mut AllocationCatalog,
    temperature: &TemperatureProperty,
    redistribution: &Redistribution,
) -> PartitionResult<()> {
    let table_id = redistribution.table_id;
    let with_hot: BTreeSet<AdapterId> = catalog
        .get_adapters_by_partition_group(table_id, temperature.hot_partition_group_id)
        .into_iter()
        .collect();
    let with_cold: BTreeSet<AdapterId> = catalog
        .get_adapters_by_partition_group(table_id, temperature.cold_partition_group_id)
        .into_iter()
        .collect();

    for adapter_id in with_hot.difference(&with_cold) {
        move_placements(
            catalog,
            *adapter_id,
            table_id,
            &redistribution.cold_to_hot,
            &redistribution.hot_to_cold,
        )?;
    }
    for adapter_id in with_cold.difference(&with_hot) {
        move_placements(
            catalog,
            *adapter_id,
            table_id,
            &redistribution.hot_to_cold,
            &redistribution.cold_to_hot,
        )?;
    }

    for partition_id in &redistribution.cold_to_hot {
        catalog.update_partition(*partition_id, temperature.hot_partition_group_id)?;
    }
    for partition_id in &redistribution.hot_to_cold {
        catalog.update_partition(*partition_id, temperature.cold_partition_group_id)?;
    }
    Ok(())
}

fn move_placements(
    catalog: &mut AllocationCatalog,
    adapter_id: AdapterId,
    table_id: TableId,
    incoming: &[PartitionId],
    outgoing: &[PartitionId],
) -> PartitionResult<()> {
    for partition_id in incoming {
        catalog.add_partition_placement(adapter_id, table_id, *partition_id, PlacementType::Automatic)?;
    }
    for partition_id in outgoing {
        catalog.delete_partition_placement(adapter_id, *partition_id);
    }
    Ok(())
}
