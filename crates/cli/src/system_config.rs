//! System-wide configuration
//!
//! Stored as TOML at `<config dir>/footprints/config.toml`. Every field has
//! a default, so a missing file or a partial file both load. Set
//! `FOOTPRINTS_CONFIG` to use a different file.

use anyhow::{Context, Result};
use footprints_watcher::WatcherConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "FOOTPRINTS_CONFIG";

pub const BUSY_TIMEOUT_RANGE: std::ops::RangeInclusive<u64> = 1..=600;
pub const POLL_INTERVAL_RANGE: std::ops::RangeInclusive<u64> = 1..=3600;
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub watcher: WatcherConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database file; next to the executable when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Longest wait for the write lock before a visit is dropped (default: 30)
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_secs: u64,
}

impl StoreConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_secs(self.busy_timeout_secs)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_secs: default_busy_timeout(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter level when `RUST_LOG` is unset (default: info)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Write a daily log file while `fp start` runs (default: true)
    #[serde(default = "default_true")]
    pub file_enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_enabled: true,
        }
    }
}

fn default_busy_timeout() -> u64 {
    footprints_store::DEFAULT_BUSY_TIMEOUT.as_secs()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("store.busy_timeout_secs must be between 1 and 600 (got {0})")]
    BusyTimeout(u64),

    #[error("watcher.poll_interval_secs must be between 1 and 3600 (got {0})")]
    PollInterval(u64),

    #[error("logging.level must be one of trace, debug, info, warn, error (got {0:?})")]
    LogLevel(String),

    #[error("store.path must not be empty")]
    EmptyStorePath,
}

impl SystemConfig {
    /// Check every field against its allowed range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !BUSY_TIMEOUT_RANGE.contains(&self.store.busy_timeout_secs) {
            return Err(ConfigError::BusyTimeout(self.store.busy_timeout_secs));
        }
        if !POLL_INTERVAL_RANGE.contains(&self.watcher.poll_interval_secs) {
            return Err(ConfigError::PollInterval(self.watcher.poll_interval_secs));
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::LogLevel(self.logging.level.clone()));
        }
        if matches!(&self.store.path, Some(p) if p.as_os_str().is_empty()) {
            return Err(ConfigError::EmptyStorePath);
        }
        Ok(())
    }
}

/// Location of the config file
pub fn config_file_path() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }
    let dir = dirs::config_dir().context("No configuration directory on this system")?;
    Ok(dir.join("footprints").join("config.toml"))
}

/// Load from the default location; defaults when the file is missing
pub fn load() -> Result<SystemConfig> {
    load_from(&config_file_path()?)
}

pub fn load_from(path: &Path) -> Result<SystemConfig> {
    if !path.exists() {
        return Ok(SystemConfig::default());
    }

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: SystemConfig = toml::from_str(&text)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config file {}", path.display()))?;

    Ok(config)
}

/// Save to the default location
pub fn save(config: &SystemConfig) -> Result<()> {
    save_to(config, &config_file_path()?)
}

pub fn save_to(config: &SystemConfig, path: &Path) -> Result<()> {
    config.validate().context("Refusing to save invalid configuration")?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let text = toml::to_string_pretty(config).context("Failed to serialize configuration")?;

    // Write then rename so a crash never leaves half a file behind.
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, text).with_context(|| format!("Failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;

    Ok(())
}

/// Write the defaults if no config file exists yet
pub fn init_if_missing() -> Result<PathBuf> {
    let path = config_file_path()?;
    if !path.exists() {
        save_to(&SystemConfig::default(), &path)?;
        tracing::info!("Created default config at {}", path.display());
    }
    Ok(path)
}

/// Commented example for `fp config example`
pub fn example_config() -> &'static str {
    r#"# Footprints configuration

[store]
# Database file. Defaults to data/footprints.db next to the fp executable.
# path = "/home/me/.local/share/footprints/footprints.db"

# Seconds a write waits for the lock before the visit is dropped (1-600)
busy_timeout_secs = 30

[watcher]
# Seconds between polls of each watcher (1-3600)
poll_interval_secs = 2

# Track open file-manager windows
windows_enabled = true

# Track the recent-items folder
recent_enabled = true

# Recent-items folder. Defaults to %APPDATA%\Microsoft\Windows\Recent on
# Windows; other platforms have no default.
# recent_dir = "/home/me/recent-links"

[logging]
# trace, debug, info, warn or error; RUST_LOG takes precedence
level = "info"

# Daily log file under <database dir>/logs while `fp start` runs
file_enabled = true
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();

        let config = load_from(&temp.path().join("absent.toml")).unwrap();

        assert_eq!(config, SystemConfig::default());
        assert_eq!(config.watcher.poll_interval_secs, 2);
        assert_eq!(config.store.busy_timeout_secs, 30);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[watcher]\npoll_interval_secs = 5\n").unwrap();

        let config = load_from(&path).unwrap();

        assert_eq!(config.watcher.poll_interval_secs, 5);
        assert!(config.watcher.windows_enabled);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_save_and_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");
        let mut config = SystemConfig::default();
        config.store.path = Some(temp.path().join("fp.db"));
        config.watcher.recent_dir = Some(temp.path().join("Recent"));
        config.logging.level = "debug".to_string();

        save_to(&config, &path).unwrap();

        assert_eq!(load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_validation_ranges() {
        let mut config = SystemConfig::default();
        config.store.busy_timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::BusyTimeout(0))));

        let mut config = SystemConfig::default();
        config.watcher.poll_interval_secs = 3601;
        assert!(matches!(config.validate(), Err(ConfigError::PollInterval(3601))));

        let mut config = SystemConfig::default();
        config.logging.level = "loud".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::LogLevel(_))));

        let mut config = SystemConfig::default();
        config.store.path = Some(PathBuf::new());
        assert!(matches!(config.validate(), Err(ConfigError::EmptyStorePath)));
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[store]\nbusy_timeout_secs = 0\n").unwrap();

        assert!(load_from(&path).is_err());
    }

    #[test]
    fn test_example_parses() {
        let config: SystemConfig = toml::from_str(example_config()).unwrap();

        config.validate().unwrap();
        assert_eq!(config, SystemConfig::default());
    }
}
