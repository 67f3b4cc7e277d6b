//! Declarative partition settings
//!
//! Each scheme publishes the tunables it accepts so a DDL front end can
//! render them and validate user input before any catalog change.

use std::collections::BTreeMap;

use serde::Serialize;

use super::errors::{PartitionError, PartitionResult};
use crate::catalog::PartitionType;

/// Value domain of a setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SettingKind {
    /// Free text
    Text,
    /// Integer within `[min, max]`
    Integer { min: u64, max: u64 },
    /// One of a fixed list of options (case-insensitive on input)
    Choice { options: Vec<String> },
}

/// A single tunable of a partition scheme
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionSetting {
    pub name: String,
    pub description: String,
    #[serde(flatten)]
    pub kind: SettingKind,
    pub default_value: String,
    pub required: bool,
}

impl PartitionSetting {
    pub fn text(name: &str, description: &str, default_value: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            kind: SettingKind::Text,
            default_value: default_value.to_string(),
            required: false,
        }
    }

    pub fn integer(name: &str, description: &str, min: u64, max: u64, default_value: u64) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            kind: SettingKind::Integer { min, max },
            default_value: default_value.to_string(),
            required: false,
        }
    }

    pub fn choice(name: &str, description: &str, options: &[&str], default_value: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            kind: SettingKind::Choice {
                options: options.iter().map(|o| o.to_string()).collect(),
            },
            default_value: default_value.to_string(),
            required: false,
        }
    }

    /// Normalize and check one user supplied value.
    fn resolve(&self, raw: &str) -> PartitionResult<String> {
        let value = raw.trim();
        match &self.kind {
            SettingKind::Text => {
                if value.is_empty() {
                    return Err(PartitionError::invalid_setting(&self.name, raw, "must not be empty"));
                }
                Ok(value.to_string())
            }
            SettingKind::Integer { min, max } => {
                let parsed: u64 = value
                    .parse()
                    .map_err(|_| PartitionError::invalid_setting(&self.name, raw, "not an integer"))?;
                if parsed < *min || parsed > *max {
                    return Err(PartitionError::invalid_setting(
                        &self.name,
                        raw,
                        format!("must be between {} and {}", min, max),
                    ));
                }
                Ok(parsed.to_string())
            }
            SettingKind::Choice { options } => options
                .iter()
                .find(|option| option.eq_ignore_ascii_case(value))
                .cloned()
                .ok_or_else(|| {
                    PartitionError::invalid_setting(
                        &self.name,
                        raw,
                        format!("expected one of {}", options.join(", ")),
                    )
                }),
        }
    }
}

/// Settings a partition scheme accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionSettingsSchema {
    pub partition_type: PartitionType,
    pub settings: Vec<PartitionSetting>,
}

impl PartitionSettingsSchema {
    /// Schema of a scheme without tunables.
    pub fn empty(partition_type: PartitionType) -> Self {
        Self {
            partition_type,
            settings: Vec::new(),
        }
    }

    pub fn new(partition_type: PartitionType, settings: Vec<PartitionSetting>) -> Self {
        Self {
            partition_type,
            settings,
        }
    }

    pub fn get(&self, name: &str) -> Option<&PartitionSetting> {
        self.settings.iter().find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Validate user supplied values and fill in defaults.
    ///
    /// Unknown names and out-of-domain values are rejected. Missing
    /// required settings are rejected, other missing settings take their
    /// default.
    pub fn validate(&self, values: &BTreeMap<String, String>) -> PartitionResult<ResolvedSettings> {
        for name in values.keys() {
            if self.get(name).is_none() {
                return Err(PartitionError::UnknownSetting(name.clone()));
            }
        }

        let mut resolved = BTreeMap::new();
        for setting in &self.settings {
            let supplied = values
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(&setting.name))
                .map(|(_, value)| value);

            let value = match supplied {
                Some(raw) => setting.resolve(raw)?,
                None if setting.required => {
                    return Err(PartitionError::invalid_setting(&setting.name, "", "required"));
                }
                None => setting.default_value.clone(),
            };
            resolved.insert(setting.name.clone(), value);
        }
        Ok(ResolvedSettings { values: resolved })
    }
}

/// Validated settings with defaults applied
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResolvedSettings {
    values: BTreeMap<String, String>,
}

impl ResolvedSettings {
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn get_u64(&self, name: &str) -> Option<u64> {
        self.get_str(name).and_then(|v| v.parse().ok())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> PartitionSettingsSchema {
        PartitionSettingsSchema::new(
            PartitionType::Temperature,
            vec![
                PartitionSetting::integer("chunks", "internal partitions", 2, 100, 20),
                PartitionSetting::choice("unit", "window unit", &["MINUTES", "HOURS"], "HOURS"),
                PartitionSetting::text("hot_label", "name of the hot group", "HOT"),
            ],
        )
    }

    fn values(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_applied() {
        let resolved = schema().validate(&BTreeMap::new()).unwrap();
        assert_eq!(resolved.get_u64("chunks"), Some(20));
        assert_eq!(resolved.get_str("unit"), Some("HOURS"));
        assert_eq!(resolved.get_str("hot_label"), Some("HOT"));
    }

    #[test]
    fn test_choice_is_case_insensitive() {
        let resolved = schema().validate(&values(&[("unit", "minutes")])).unwrap();
        assert_eq!(resolved.get_str("unit"), Some("MINUTES"));
    }

    #[test]
    fn test_integer_out_of_range_rejected() {
        let err = schema().validate(&values(&[("chunks", "1")])).unwrap_err();
        assert!(matches!(err, PartitionError::InvalidSetting { .. }));
    }

    #[test]
    fn test_unknown_setting_rejected() {
        let err = schema().validate(&values(&[("colour", "red")])).unwrap_err();
        assert!(matches!(err, PartitionError::UnknownSetting(_)));
    }

    #[test]
    fn test_schema_serializes_kind_inline() {
        let json = serde_json::to_value(schema()).unwrap();
        assert_eq!(json["partition_type"], "TEMPERATURE");
        assert_eq!(json["settings"][0]["kind"], "integer");
        assert_eq!(json["settings"][0]["min"], 2);
    }
}
