//! Engine configuration
//!
//! A single JSON file. Every field is optional:
//!
//! ```json
//! {
//!   "pre_cost_post_cost_ratio": 0.3,
//!   "plan_selection_strategy": "PROBABILITY",
//!   "placement_strategy": "SINGLE_STORE",
//!   "rng_seed": 42,
//!   "log_level": "INFO"
//! }
//! ```
//!
//! `plan_selection_strategy: null` is accepted and leaves routing
//! unconfigured; every selection then fails with
//! `POLY_ROUTING_STRATEGY_NOT_CONFIGURED`.

mod errors;

pub use errors::{ConfigError, ConfigErrorCode, ConfigResult};

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::observability::{log_event_with_fields, Event, Severity};
use crate::placement::{PlacementStrategy, PlacementStrategyKind};
use crate::routing::{PlanSelectionStrategy, RoutingConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolystoreConfig {
    /// Weight of observed execution time against the static estimate
    #[serde(default)]
    pub pre_cost_post_cost_ratio: f64,

    #[serde(default = "default_plan_selection_strategy")]
    pub plan_selection_strategy: Option<String>,

    #[serde(default = "default_placement_strategy")]
    pub placement_strategy: String,

    /// Seed for PROBABILITY selection; entropy when absent
    #[serde(default)]
    pub rng_seed: Option<u64>,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_plan_selection_strategy() -> Option<String> {
    Some(PlanSelectionStrategy::Best.as_str().to_string())
}

fn default_placement_strategy() -> String {
    PlacementStrategyKind::default().as_str().to_string()
}

fn default_log_level() -> String {
    Severity::Info.as_str().to_string()
}

impl Default for PolystoreConfig {
    fn default() -> Self {
        Self {
            pre_cost_post_cost_ratio: 0.0,
            plan_selection_strategy: default_plan_selection_strategy(),
            placement_strategy: default_placement_strategy(),
            rng_seed: None,
            log_level: default_log_level(),
        }
    }
}

impl PolystoreConfig {
    /// Read, parse and validate a config file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::unreadable(&path.display().to_string(), e))?;
        let config = Self::from_json(&content)?;

        log_event_with_fields(
            Event::ConfigLoaded,
            &[
                ("path", path.display().to_string().as_str()),
                ("placement_strategy", config.placement_strategy.as_str()),
                (
                    "plan_selection_strategy",
                    config.plan_selection_strategy.as_deref().unwrap_or("NONE"),
                ),
            ],
        );
        Ok(config)
    }

    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: PolystoreConfig =
            serde_json::from_str(content).map_err(ConfigError::invalid_json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let ratio = self.pre_cost_post_cost_ratio;
        if !(0.0..=1.0).contains(&ratio) {
            return Err(ConfigError::invalid_value(
                "pre_cost_post_cost_ratio",
                format!("{} is outside [0, 1]", ratio),
            ));
        }
        self.plan_selection_strategy()?;
        self.placement_strategy_kind()?;
        self.log_severity()?;
        Ok(())
    }

    pub fn plan_selection_strategy(&self) -> ConfigResult<Option<PlanSelectionStrategy>> {
        self.plan_selection_strategy
            .as_deref()
            .map(|name| {
                name.parse::<PlanSelectionStrategy>().map_err(|_| {
                    ConfigError::invalid_value(
                        "plan_selection_strategy",
                        format!("unknown strategy '{}'", name),
                    )
                })
            })
            .transpose()
    }

    pub fn placement_strategy_kind(&self) -> ConfigResult<PlacementStrategyKind> {
        self.placement_strategy.parse().map_err(|_| {
            ConfigError::invalid_value(
                "placement_strategy",
                format!("unknown strategy '{}'", self.placement_strategy),
            )
        })
    }

    pub fn log_severity(&self) -> ConfigResult<Severity> {
        self.log_level
            .parse()
            .map_err(|reason: String| ConfigError::invalid_value("log_level", reason))
    }

    pub fn routing_config(&self) -> ConfigResult<RoutingConfig> {
        Ok(RoutingConfig {
            pre_cost_post_cost_ratio: self.pre_cost_post_cost_ratio,
            plan_selection_strategy: self.plan_selection_strategy()?,
        })
    }

    pub fn placement_strategy(&self) -> ConfigResult<Box<dyn PlacementStrategy>> {
        Ok(self.placement_strategy_kind()?.build())
    }
}
