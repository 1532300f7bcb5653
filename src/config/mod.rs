use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    core::{GroupMode, WeekStart},
    errors::{Result, TrackerError},
    storage::STORAGE_KEY,
    utils::paths::{self, ensure_dir},
};

/// User preferences for the tracker. Labels and dates always use en-US
/// formatting; unknown keys in the file are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub currency_symbol: String,
    pub week_start: WeekStart,
    pub default_view: GroupMode,
    pub storage_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Directory for stored data. Defaults to `<app dir>/data`.
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency_symbol: "$".into(),
            week_start: WeekStart::Sunday,
            default_view: GroupMode::Day,
            storage_key: STORAGE_KEY.into(),
            data_dir: None,
        }
    }
}

impl Config {
    pub fn resolve_data_dir(&self, base: &Path) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| paths::data_dir_in(base))
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage_key.trim().is_empty() {
            return Err(TrackerError::Config("storage_key must not be empty".into()));
        }
        Ok(())
    }
}

/// Loads and saves [`Config`] as pretty JSON.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(paths::app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        Ok(Self {
            path: paths::config_file_in(&base),
            base,
        })
    }

    /// Missing file means defaults.
    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        let config: Config = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)?;
        paths::write_atomic(&self.path, &json)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        assert_eq!(manager.load().unwrap(), Config::default());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let config = Config {
            currency_symbol: "€".into(),
            week_start: WeekStart::Monday,
            default_view: GroupMode::Week,
            ..Config::default()
        };
        manager.save(&config).unwrap();
        assert_eq!(manager.load().unwrap(), config);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{"week_start": "monday"}"#).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.week_start, WeekStart::Monday);
        assert_eq!(config.storage_key, STORAGE_KEY);
    }

    #[test]
    fn files_from_older_versions_still_load() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{"locale": "en-US", "currency_symbol": "£"}"#).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.currency_symbol, "£");
        manager.save(&config).unwrap();
        assert!(!fs::read_to_string(manager.path()).unwrap().contains("locale"));
    }

    #[test]
    fn blank_storage_key_is_rejected() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{"storage_key": " "}"#).unwrap();
        assert!(matches!(manager.load(), Err(TrackerError::Config(_))));
    }

    #[test]
    fn data_dir_defaults_under_base() {
        let base = PathBuf::from("/srv/tracker");
        assert_eq!(Config::default().resolve_data_dir(&base), base.join("data"));
    }
}
