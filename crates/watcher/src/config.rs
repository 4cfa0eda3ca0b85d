//! Watcher settings

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default delay between two polls of the same watcher
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;

/// Watcher configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Seconds between polls (default: 2)
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Track open file-manager windows (default: true)
    #[serde(default = "default_true")]
    pub windows_enabled: bool,

    /// Track the recent-items folder (default: true)
    #[serde(default = "default_true")]
    pub recent_enabled: bool,

    /// Override for the recent-items folder; the platform default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_dir: Option<PathBuf>,
}

impl WatcherConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            windows_enabled: true,
            recent_enabled: true,
            recent_dir: None,
        }
    }
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_true() -> bool {
    true
}
