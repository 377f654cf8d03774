//! Global agendir configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("agendir"))
        .unwrap_or_else(|| PathBuf::from(".agendir"))
}

fn default_remote_dir() -> PathBuf {
    default_data_dir().join("remote")
}

fn default_reminder_minutes() -> i64 {
    15
}

fn default_max_item_age_days() -> i64 {
    14
}

/// Global configuration at ~/.config/agendir/config.toml
///
/// Everything has a default, so a missing config file just means stock
/// behavior.
#[derive(Deserialize, Clone)]
pub struct GlobalConfig {
    /// Where records, the outbox and the connectivity flag live.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory standing in for the remote store.
    #[serde(default = "default_remote_dir")]
    pub remote_dir: PathBuf,

    /// Lead time for events created without an explicit --reminder.
    #[serde(default = "default_reminder_minutes")]
    pub default_reminder_minutes: i64,

    /// Outbox items older than this are dead-lettered instead of retried.
    #[serde(default = "default_max_item_age_days")]
    pub max_item_age_days: i64,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        GlobalConfig {
            data_dir: default_data_dir(),
            remote_dir: default_remote_dir(),
            default_reminder_minutes: default_reminder_minutes(),
            max_item_age_days: default_max_item_age_days(),
        }
    }
}

impl GlobalConfig {
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("agendir");
        Ok(config_dir.join("config.toml"))
    }

    /// Load the global config, falling back to defaults when the file does
    /// not exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(GlobalConfig::default());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("Invalid config at {}", path.display()))
    }

    /// Where record files live.
    pub fn records_dir(&self) -> PathBuf {
        self.data_dir.join("records")
    }

    /// Where the outbox state is persisted.
    pub fn outbox_path(&self) -> PathBuf {
        self.data_dir.join("outbox.json")
    }

    /// Marker file whose presence means "offline".
    pub fn offline_marker(&self) -> PathBuf {
        self.data_dir.join("offline")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: GlobalConfig = toml::from_str("").unwrap();
        assert_eq!(config.default_reminder_minutes, 15);
        assert_eq!(config.max_item_age_days, 14);
        assert_eq!(config.records_dir(), config.data_dir.join("records"));
    }

    #[test]
    fn partial_config_overrides_only_named_fields() {
        let config: GlobalConfig = toml::from_str(
            r#"
            data_dir = "/tmp/agendir-test"
            default_reminder_minutes = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/agendir-test"));
        assert_eq!(config.default_reminder_minutes, 30);
        assert_eq!(config.max_item_age_days, 14);
        assert_eq!(config.outbox_path(), PathBuf::from("/tmp/agendir-test/outbox.json"));
    }
}
