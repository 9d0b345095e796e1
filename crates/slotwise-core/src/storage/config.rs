//! TOML-based application configuration.
//!
//! Stores:
//! - Working-day bounds, UTC offset and minimum slot length
//! - Duration estimator policy
//! - Target calendar identity and API endpoint
//! - Reminders list to read tasks from
//!
//! Configuration is stored at `~/.config/slotwise/config.toml`.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::planner::PlannerConfig;
use crate::task::estimate::MAX_PRIORITY_MULTIPLIER;
use crate::task::EstimatorConfig;
use crate::timeline::WorkingDay;

/// Working-day window configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayConfig {
    /// Local start time, `HH:MM`
    #[serde(default = "default_day_start")]
    pub start: String,
    /// Local end time, `HH:MM`
    #[serde(default = "default_day_end")]
    pub end: String,
    /// Offset the bounds are expressed in, `±HH:MM`
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
    #[serde(default = "default_min_slot_minutes")]
    pub min_slot_minutes: u32,
}

/// Calendar sink/source configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Calendar that receives new events and is read for busy periods
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    /// Tried once when inserting into `calendar_id` fails; empty disables it
    #[serde(default = "default_fallback_calendar_id")]
    pub fallback_calendar_id: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

/// Reminders task source configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemindersConfig {
    #[serde(default = "default_list_name")]
    pub list_name: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/slotwise/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub day: DayConfig,
    #[serde(default)]
    pub estimator: EstimatorConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub reminders: RemindersConfig,
}

// Default functions
fn default_day_start() -> String {
    "09:00".into()
}
fn default_day_end() -> String {
    "17:00".into()
}
fn default_utc_offset() -> String {
    "+10:00".into()
}
fn default_min_slot_minutes() -> u32 {
    15
}
fn default_calendar_id() -> String {
    "primary".into()
}
fn default_fallback_calendar_id() -> String {
    "primary".into()
}
fn default_api_base() -> String {
    "https://www.googleapis.com/calendar/v3".into()
}
fn default_list_name() -> String {
    "ToDo".into()
}

impl Default for DayConfig {
    fn default() -> Self {
        Self {
            start: default_day_start(),
            end: default_day_end(),
            utc_offset: default_utc_offset(),
            min_slot_minutes: default_min_slot_minutes(),
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            calendar_id: default_calendar_id(),
            fallback_calendar_id: default_fallback_calendar_id(),
            api_base: default_api_base(),
        }
    }
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            list_name: default_list_name(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<i64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location of the config file.
    pub fn default_path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load from `path`, writing defaults there if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path()?)
    }

    /// Persist to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting config does not validate. `self` is left unchanged
    /// on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check values serde cannot check on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.working_day()?;
        let multiplier = self.estimator.high_priority_multiplier;
        // written so NaN fails too
        if !(multiplier > 0.0 && multiplier <= MAX_PRIORITY_MULTIPLIER) {
            return Err(ConfigError::InvalidValue {
                key: "estimator.high_priority_multiplier".to_string(),
                message: format!("must be in (0, {MAX_PRIORITY_MULTIPLIER}], got {multiplier}"),
            });
        }
        if self.calendar.calendar_id.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "calendar.calendar_id".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn working_day(&self) -> Result<WorkingDay, ConfigError> {
        WorkingDay::parse(&self.day.start, &self.day.end, &self.day.utc_offset).map_err(|e| {
            ConfigError::InvalidValue {
                key: "day".to_string(),
                message: e.to_string(),
            }
        })
    }

    /// Fallback calendar, unless disabled or identical to the primary target.
    pub fn fallback_calendar(&self) -> Option<&str> {
        let fallback = self.calendar.fallback_calendar_id.trim();
        if fallback.is_empty() || fallback == self.calendar.calendar_id {
            None
        } else {
            Some(fallback)
        }
    }

    pub fn planner_config(&self) -> PlannerConfig {
        PlannerConfig {
            min_slot: Duration::minutes(i64::from(self.day.min_slot_minutes)),
            estimator: self.estimator.clone(),
        }
    }
}
