//! Tracker configuration.
//!
//! Defaults can be overridden with builder methods or from the environment
//! (a `.env` file is honored):
//!
//! | Variable | Meaning |
//! |---|---|
//! | `TRACKER_DATA_DIR` | directory holding the storage file |
//! | `TRACKER_STORAGE_KEY` | key of the roster slot |
//! | `TRACKER_MAX_STAT` | ceiling for max hp/armor/mana |
//! | `TRACKER_MAX_RESISTANCE` | ceiling for resistances |

use crate::character::StatLimits;
use directories::ProjectDirs;
use std::path::PathBuf;
use thiserror::Error;

/// Key the roster is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "rpg-character-manager";

/// File name of the key-value store inside the data directory.
pub const STORAGE_FILE_NAME: &str = "storage.json";

/// Errors from reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

/// Configuration for a [`CharacterTracker`](crate::CharacterTracker).
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Key of the persisted roster slot.
    pub storage_key: String,

    /// Directory of the file-backed store.
    pub data_dir: PathBuf,

    /// Ceilings for stats and resistances.
    pub limits: StatLimits,
}

impl TrackerConfig {
    pub fn new() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            data_dir: default_data_dir(),
            limits: StatLimits::default(),
        }
    }

    /// Load `.env` (if present) and apply environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::new();

        if let Some(dir) = lookup("TRACKER_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(key) = lookup("TRACKER_STORAGE_KEY") {
            config.storage_key = key;
        }
        if let Some(value) = lookup("TRACKER_MAX_STAT") {
            config.limits.max_stat = parse_number("TRACKER_MAX_STAT", &value)?;
        }
        if let Some(value) = lookup("TRACKER_MAX_RESISTANCE") {
            config.limits.max_resistance = parse_number("TRACKER_MAX_RESISTANCE", &value)?;
        }

        Ok(config)
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_limits(mut self, limits: StatLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Path of the storage file inside the data directory.
    pub fn storage_file(&self) -> PathBuf {
        self.data_dir.join(STORAGE_FILE_NAME)
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Platform data directory, or the working directory when there is none.
pub fn default_data_dir() -> PathBuf {
    ProjectDirs::from("", "", "rpg-character-tracker")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn parse_number(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = TrackerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.limits, StatLimits::default());
        assert!(config.storage_file().ends_with(STORAGE_FILE_NAME));
    }

    #[test]
    fn test_overrides() {
        let config = TrackerConfig::from_lookup(lookup_from(&[
            ("TRACKER_DATA_DIR", "/tmp/tracker"),
            ("TRACKER_STORAGE_KEY", "campaign-2"),
            ("TRACKER_MAX_STAT", "9999"),
            ("TRACKER_MAX_RESISTANCE", " 300 "),
        ]))
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/tracker"));
        assert_eq!(config.storage_key, "campaign-2");
        assert_eq!(config.limits.max_stat, 9999);
        assert_eq!(config.limits.max_resistance, 300);
        assert_eq!(config.limits.max_regeneration, 100);
    }

    #[test]
    fn test_invalid_number() {
        let err = TrackerConfig::from_lookup(lookup_from(&[("TRACKER_MAX_STAT", "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains("TRACKER_MAX_STAT"));
    }

    #[test]
    fn test_builder() {
        let config = TrackerConfig::new()
            .with_storage_key("slot")
            .with_data_dir("/data")
            .with_limits(StatLimits {
                max_stat: 50,
                ..StatLimits::default()
            });
        assert_eq!(config.storage_key, "slot");
        assert_eq!(config.storage_file(), PathBuf::from("/data").join(STORAGE_FILE_NAME));
        assert_eq!(config.limits.max_stat, 50);
    }
}
