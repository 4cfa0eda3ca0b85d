//! Shared utilities for CLI commands

use crate::system_config::SystemConfig;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use footprints_store::FootprintStore;
use std::path::{Path, PathBuf};

/// Database path: `--db`, then `store.path`, then next to the executable
pub fn resolve_db_path(cli_override: Option<&Path>, config: &SystemConfig) -> Result<PathBuf> {
    if let Some(path) = cli_override {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = &config.store.path {
        return Ok(path.clone());
    }
    footprints_store::default_db_path().context("Failed to determine default database location")
}

/// Open the store with the configured busy timeout
pub fn open_store(db_path: &Path, config: &SystemConfig) -> Result<FootprintStore> {
    FootprintStore::open_with_timeout(db_path, config.store.busy_timeout())
        .with_context(|| format!("Failed to open footprint store at {}", db_path.display()))
}

/// Format a timestamp as relative time ("2 hours ago")
pub fn format_relative_time(at: DateTime<Utc>) -> String {
    format_relative_to(at, Utc::now())
}

fn format_relative_to(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - at).num_seconds();
    if seconds < 0 {
        return "in the future".to_string();
    }

    let (value, unit) = if seconds < 60 {
        (seconds, "second")
    } else if seconds < 3600 {
        (seconds / 60, "minute")
    } else if seconds < 86400 {
        (seconds / 3600, "hour")
    } else if seconds < 604800 {
        (seconds / 86400, "day")
    } else {
        (seconds / 604800, "week")
    };

    if value == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", value, unit)
    }
}

/// Shorten `text` to `width` characters, eliding the middle
pub fn elide_middle(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len <= width || width < 5 {
        return text.to_string();
    }

    let keep = width - 3;
    let head = keep / 2;
    let tail = keep - head;
    let start: String = text.chars().take(head).collect();
    let end: String = text.chars().skip(len - tail).collect();
    format!("{start}...{end}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_relative_time() {
        let now = Utc::now();

        assert_eq!(format_relative_to(now, now), "0 seconds ago");
        assert_eq!(format_relative_to(now - Duration::seconds(1), now), "1 second ago");
        assert_eq!(format_relative_to(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(format_relative_to(now - Duration::hours(1), now), "1 hour ago");
        assert_eq!(format_relative_to(now - Duration::days(3), now), "3 days ago");
        assert_eq!(format_relative_to(now - Duration::weeks(10), now), "10 weeks ago");
        assert_eq!(format_relative_to(now + Duration::hours(1), now), "in the future");
    }

    #[test]
    fn test_resolve_db_path_precedence() {
        let mut config = SystemConfig::default();
        config.store.path = Some(PathBuf::from("/from/config.db"));

        assert_eq!(
            resolve_db_path(Some(Path::new("/from/cli.db")), &config).unwrap(),
            PathBuf::from("/from/cli.db")
        );
        assert_eq!(
            resolve_db_path(None, &config).unwrap(),
            PathBuf::from("/from/config.db")
        );

        let default = resolve_db_path(None, &SystemConfig::default()).unwrap();
        assert!(default.ends_with(Path::new("data").join("footprints.db")));
    }

    #[test]
    fn test_elide_middle() {
        assert_eq!(elide_middle("short", 10), "short");
        assert_eq!(elide_middle("abcdefghijkl", 9), "abc...jkl");
        assert_eq!(elide_middle("ÄÖÜäöüßéè", 7), "ÄÖ...éè");
    }
}
