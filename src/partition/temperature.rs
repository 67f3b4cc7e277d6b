//! Temperature-aware partitioning
//!
//! A table is split into internal partitions (chunks) that live in one of
//! two groups, HOT or COLD. Rows are hashed across all chunks, so a row
//! never changes chunk when its chunk is reclassified. Reclassification
//! itself is driven by `FrequencyMap`.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::errors::{PartitionError, PartitionResult};
use super::hash::HashPartitionManager;
use super::manager::{property_of, validate_base_setup, PartitionManager};
use super::settings::{PartitionSetting, PartitionSettingsSchema, ResolvedSettings};
use crate::catalog::{
    CatalogContext, LogicalColumn, PartitionGroupId, PartitionId, PartitionType, TableId,
};

pub const DEFAULT_CHUNKS: u64 = 20;
pub const DEFAULT_HOT_ACCESS_PERCENTAGE_IN: u32 = 10;
pub const DEFAULT_HOT_ACCESS_PERCENTAGE_OUT: u32 = 15;

/// Which accesses count toward a chunk's temperature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CostIndication {
    /// Reads and writes
    All,
    Read,
    Write,
}

impl CostIndication {
    pub fn as_str(&self) -> &'static str {
        match self {
            CostIndication::All => "ALL",
            CostIndication::Read => "READ",
            CostIndication::Write => "WRITE",
        }
    }
}

impl FromStr for CostIndication {
    type Err = PartitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ALL" => Ok(CostIndication::All),
            "READ" => Ok(CostIndication::Read),
            "WRITE" => Ok(CostIndication::Write),
            _ => Err(PartitionError::invalid_setting("cost_model", s, "expected ALL, READ or WRITE")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeUnit {
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeUnit::Minutes => "MINUTES",
            TimeUnit::Hours => "HOURS",
            TimeUnit::Days => "DAYS",
        }
    }
}

impl FromStr for TimeUnit {
    type Err = PartitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MINUTES" => Ok(TimeUnit::Minutes),
            "HOURS" => Ok(TimeUnit::Hours),
            "DAYS" => Ok(TimeUnit::Days),
            _ => Err(PartitionError::invalid_setting(
                "window_unit",
                s,
                "expected MINUTES, HOURS or DAYS",
            )),
        }
    }
}

/// Sliding window over which accesses are counted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyWindow {
    pub length: u64,
    pub unit: TimeUnit,
}

impl FrequencyWindow {
    pub fn duration(&self) -> Duration {
        let length = i64::try_from(self.length).unwrap_or(i64::MAX);
        let seconds = match self.unit {
            TimeUnit::Minutes => length.saturating_mul(60),
            TimeUnit::Hours => length.saturating_mul(60 * 60),
            TimeUnit::Days => length.saturating_mul(60 * 60 * 24),
        };
        // Duration::seconds panics beyond ~2.9e11 years
        Duration::seconds(seconds.min(i64::MAX / 1000))
    }
}

impl fmt::Display for FrequencyWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.length, self.unit.as_str())
    }
}

/// Temperature configuration stored with the table's partition property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureProperty {
    pub hot_partition_group_id: PartitionGroupId,
    pub cold_partition_group_id: PartitionGroupId,
    /// Share of chunks (percent) promoted to HOT
    pub hot_access_percentage_in: u32,
    /// Share of chunks (percent) allowed to stay in HOT
    pub hot_access_percentage_out: u32,
    pub cost_indication: CostIndication,
    pub frequency_window: FrequencyWindow,
    pub internal_partition_function: PartitionType,
    pub chunks: u64,
}

/// Validated temperature settings, before any group exists
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureSetup {
    pub hot_label: String,
    pub cold_label: String,
    pub chunks: u64,
    pub hot_access_percentage_in: u32,
    pub hot_access_percentage_out: u32,
    pub cost_indication: CostIndication,
    pub frequency_window: FrequencyWindow,
    pub internal_partition_function: PartitionType,
}

impl TemperatureSetup {
    /// Build from settings already validated against
    /// `TemperaturePartitionManager::settings()`.
    pub fn from_settings(settings: &ResolvedSettings) -> PartitionResult<Self> {
        let text = |name: &str| {
            settings
                .get_str(name)
                .map(str::to_string)
                .ok_or_else(|| PartitionError::invalid_setting(name, "", "missing"))
        };
        let integer = |name: &str| {
            settings
                .get_u64(name)
                .ok_or_else(|| PartitionError::invalid_setting(name, "", "missing"))
        };

        let hot_access_percentage_in = integer("hot_access_percentage_in")? as u32;
        let hot_access_percentage_out = integer("hot_access_percentage_out")? as u32;
        if hot_access_percentage_out < hot_access_percentage_in {
            return Err(PartitionError::invalid_setting(
                "hot_access_percentage_out",
                hot_access_percentage_out.to_string(),
                "must not be lower than hot_access_percentage_in",
            ));
        }

        let hot_label = text("hot_label")?;
        let cold_label = text("cold_label")?;
        if hot_label.eq_ignore_ascii_case(&cold_label) {
            return Err(PartitionError::invalid_setting(
                "cold_label",
                cold_label,
                "HOT and COLD labels must differ",
            ));
        }

        let internal_partition_function = text("internal_partition_function")?
            .parse::<PartitionType>()
            .map_err(|reason| PartitionError::invalid_setting("internal_partition_function", "", reason))?;

        Ok(Self {
            hot_label,
            cold_label,
            chunks: integer("chunks")?,
            hot_access_percentage_in,
            hot_access_percentage_out,
            cost_indication: text("cost_model")?.parse()?,
            frequency_window: FrequencyWindow {
                length: integer("window_length")?,
                unit: text("window_unit")?.parse()?,
            },
            internal_partition_function,
        })
    }

    /// Chunks initially placed in HOT: `in%` of all chunks, at least one.
    pub fn initial_hot_chunks(&self) -> u64 {
        (self.chunks * u64::from(self.hot_access_percentage_in) / 100)
            .max(1)
            .min(self.chunks.saturating_sub(1).max(1))
    }

    pub fn initial_cold_chunks(&self) -> u64 {
        self.chunks.saturating_sub(self.initial_hot_chunks()).max(1)
    }

    pub fn into_property(
        self,
        hot_partition_group_id: PartitionGroupId,
        cold_partition_group_id: PartitionGroupId,
    ) -> TemperatureProperty {
        TemperatureProperty {
            hot_partition_group_id,
            cold_partition_group_id,
            hot_access_percentage_in: self.hot_access_percentage_in,
            hot_access_percentage_out: self.hot_access_percentage_out,
            cost_indication: self.cost_indication,
            frequency_window: self.frequency_window,
            internal_partition_function: self.internal_partition_function,
            chunks: self.chunks,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TemperaturePartitionManager;

impl PartitionManager for TemperaturePartitionManager {
    fn partition_type(&self) -> PartitionType {
        PartitionType::Temperature
    }

    /// Hash over every chunk of the table, regardless of its group.
    fn get_target_partition_id(
        &self,
        ctx: &CatalogContext<'_>,
        table_id: TableId,
        column_value: &str,
    ) -> PartitionResult<PartitionId> {
        let property = property_of(ctx, table_id)?;
        HashPartitionManager::hash_into(table_id, &property.partition_ids, column_value)
    }

    /// The two groups are created from settings; explicit qualifiers are
    /// not accepted and at most the two group labels may be named.
    fn validate_partition_setup(
        &self,
        qualifiers: &[Vec<String>],
        number_of_partitions: usize,
        names: &[String],
        column: &LogicalColumn,
    ) -> PartitionResult<()> {
        if qualifiers.iter().any(|q| !q.is_empty()) {
            return Err(PartitionError::InvalidQualifiers(
                "TEMPERATURE partitioning does not accept partition qualifiers".to_string(),
            ));
        }
        if names.len() > 2 {
            return Err(PartitionError::InvalidQualifiers(format!(
                "TEMPERATURE partitioning has exactly two groups, got {} names",
                names.len()
            )));
        }
        validate_base_setup(self, number_of_partitions, names, column)
    }

    fn number_of_partitions_per_group(&self, number_of_partitions: u64) -> u64 {
        if number_of_partitions == 0 {
            DEFAULT_CHUNKS
        } else {
            number_of_partitions
        }
    }

    fn settings(&self) -> PartitionSettingsSchema {
        PartitionSettingsSchema::new(
            PartitionType::Temperature,
            vec![
                PartitionSetting::text("hot_label", "Name of the HOT partition group", "HOT"),
                PartitionSetting::text("cold_label", "Name of the COLD partition group", "COLD"),
                PartitionSetting::integer(
                    "chunks",
                    "Number of internal partitions across HOT and COLD",
                    2,
                    10_000,
                    DEFAULT_CHUNKS,
                ),
                PartitionSetting::integer(
                    "hot_access_percentage_in",
                    "Percent of most accessed chunks promoted to HOT",
                    0,
                    100,
                    u64::from(DEFAULT_HOT_ACCESS_PERCENTAGE_IN),
                ),
                PartitionSetting::integer(
                    "hot_access_percentage_out",
                    "Percent of most accessed chunks allowed to stay in HOT",
                    0,
                    100,
                    u64::from(DEFAULT_HOT_ACCESS_PERCENTAGE_OUT),
                ),
                PartitionSetting::choice(
                    "cost_model",
                    "Accesses counted toward temperature",
                    &["ALL", "READ", "WRITE"],
                    "ALL",
                ),
                PartitionSetting::integer("window_length", "Length of the access window", 1, 100_000, 1),
                PartitionSetting::choice(
                    "window_unit",
                    "Unit of the access window",
                    &["MINUTES", "HOURS", "DAYS"],
                    "HOURS",
                ),
                PartitionSetting::choice(
                    "internal_partition_function",
                    "Function distributing rows across chunks",
                    &["HASH"],
                    "HASH",
                ),
            ],
        )
    }
}
