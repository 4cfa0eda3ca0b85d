//! Configuration management command
//!
//! Provides CLI interface to view and edit system configuration.

use crate::system_config::{self, SystemConfig};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::PathBuf;

/// Every key `get` and `set` understand
pub const KEYS: [&str; 8] = [
    "store.path",
    "store.busy_timeout_secs",
    "watcher.poll_interval_secs",
    "watcher.windows_enabled",
    "watcher.recent_enabled",
    "watcher.recent_dir",
    "logging.level",
    "logging.file_enabled",
];

/// List all configuration values
pub async fn run_list() -> Result<()> {
    let config = system_config::load()?;
    let config_path =
        system_config::config_file_path().context("Could not determine config file path")?;

    println!("{}", "System Configuration".bold());
    println!("{}: {}\n", "Location".dimmed(), config_path.display().dimmed());

    let mut section = "";
    for key in KEYS {
        let (head, field) = key.split_once('.').unwrap_or(("", key));
        if head != section {
            if !section.is_empty() {
                println!();
            }
            println!("{}", format!("[{head}]").yellow());
            section = head;
        }
        let value = get_value(&config, key)?;
        let shown = if value.is_empty() {
            "(default)".dimmed().to_string()
        } else {
            value
        };
        println!("  {} = {}", field.cyan(), shown);
    }

    println!("\n{}", "Valid Ranges:".bold());
    println!("  busy_timeout_secs: 1-600");
    println!("  poll_interval_secs: 1-3600");
    println!("  level: trace, debug, info, warn, error");

    Ok(())
}

/// Get a single configuration value
pub async fn run_get(key: &str) -> Result<()> {
    let config = system_config::load()?;
    println!("{}", get_value(&config, key)?);
    Ok(())
}

/// Set a configuration value
pub async fn run_set(key: &str, value: &str) -> Result<()> {
    let mut config = system_config::load()?;

    set_value(&mut config, key, value)?;
    config.validate().context("Invalid configuration value")?;
    system_config::save(&config)?;

    println!("{} {} = {}", "✓".green(), key.cyan(), value);
    println!(
        "{}",
        "Note: restart `fp start` for changes to take effect".yellow()
    );

    Ok(())
}

/// Show the config file path and optionally create it
pub async fn run_path(create: bool) -> Result<()> {
    let config_path =
        system_config::config_file_path().context("Could not determine config file path")?;

    if create && !config_path.exists() {
        system_config::init_if_missing()?;
        println!("{} Created config file at: {}", "✓".green(), config_path.display());
    } else if config_path.exists() {
        println!("{}", config_path.display());
    } else {
        println!("{}", config_path.display());
        println!("{}", "File does not exist. Use --create to create it.".yellow());
    }

    Ok(())
}

/// Show example configuration
pub async fn run_example() -> Result<()> {
    println!("{}", system_config::example_config());
    Ok(())
}

/// Text form of one key; unset optional paths print as empty
pub fn get_value(config: &SystemConfig, key: &str) -> Result<String> {
    let optional_path = |p: &Option<PathBuf>| {
        p.as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    };

    Ok(match key {
        "store.path" => optional_path(&config.store.path),
        "store.busy_timeout_secs" => config.store.busy_timeout_secs.to_string(),
        "watcher.poll_interval_secs" => config.watcher.poll_interval_secs.to_string(),
        "watcher.windows_enabled" => config.watcher.windows_enabled.to_string(),
        "watcher.recent_enabled" => config.watcher.recent_enabled.to_string(),
        "watcher.recent_dir" => optional_path(&config.watcher.recent_dir),
        "logging.level" => config.logging.level.clone(),
        "logging.file_enabled" => config.logging.file_enabled.to_string(),
        _ => anyhow::bail!(
            "Unknown config key: {}. Use 'fp config list' to see available keys.",
            key
        ),
    })
}

/// Parse `value` into the field named by `key`; an empty path unsets it
pub fn set_value(config: &mut SystemConfig, key: &str, value: &str) -> Result<()> {
    let optional_path = |v: &str| (!v.trim().is_empty()).then(|| PathBuf::from(v.trim()));
    let seconds = |v: &str| -> Result<u64> {
        v.trim()
            .parse()
            .context("Invalid value: must be a positive integer")
    };
    let flag = |v: &str| -> Result<bool> {
        v.trim()
            .parse()
            .context("Invalid value: must be 'true' or 'false'")
    };

    match key {
        "store.path" => config.store.path = optional_path(value),
        "store.busy_timeout_secs" => config.store.busy_timeout_secs = seconds(value)?,
        "watcher.poll_interval_secs" => config.watcher.poll_interval_secs = seconds(value)?,
        "watcher.windows_enabled" => config.watcher.windows_enabled = flag(value)?,
        "watcher.recent_enabled" => config.watcher.recent_enabled = flag(value)?,
        "watcher.recent_dir" => config.watcher.recent_dir = optional_path(value),
        "logging.level" => config.logging.level = value.trim().to_ascii_lowercase(),
        "logging.file_enabled" => config.logging.file_enabled = flag(value)?,
        _ => anyhow::bail!(
            "Unknown config key: {}. Use 'fp config list' to see available keys.",
            key
        ),
    }
    Ok(())
}
