//! Footprint rows, visit classification and sort keys

use crate::path::CanonicalPath;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a visited path was at the time of the visit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FootprintKind {
    /// Directory
    Folder,
    /// Anything that is not one of the other kinds
    File,
    /// Windows shell link (`.lnk`)
    Shortcut,
    /// Internet shortcut (`.url`)
    WebShortcut,
}

impl FootprintKind {
    /// Persisted text form
    pub fn as_str(&self) -> &'static str {
        match self {
            FootprintKind::Folder => "Folder",
            FootprintKind::File => "File",
            FootprintKind::Shortcut => "Shortcut",
            FootprintKind::WebShortcut => "WebShortcut",
        }
    }
}

impl fmt::Display for FootprintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored kind string is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown footprint kind: {0}")]
pub struct UnknownKind(pub String);

impl FromStr for FootprintKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Folder" => Ok(FootprintKind::Folder),
            "File" => Ok(FootprintKind::File),
            "Shortcut" => Ok(FootprintKind::Shortcut),
            "WebShortcut" => Ok(FootprintKind::WebShortcut),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// One row of visit history, keyed by canonical path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Footprint {
    /// Canonical absolute path (unique key)
    pub path: String,
    /// Display name (basename, or the full path for roots)
    pub name: String,
    /// Classification at the most recent visit
    #[serde(rename = "type")]
    pub kind: FootprintKind,
    /// Total recorded visits (>= 1)
    pub visit_count: u64,
    /// Time of the most recent visit
    pub last_visit: DateTime<Utc>,
}

/// Ordering applied to search results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Case-insensitive name, ascending
    Name,
    /// Kind text, ascending
    Kind,
    /// Visit count, most visited first
    VisitCount,
    /// Most recent visit first
    #[default]
    LastVisit,
    /// Path, ascending
    Path,
}

impl SortKey {
    /// Parse a user-supplied key
    ///
    /// Unrecognized keys fall back to `LastVisit`.
    pub fn parse(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "name" => SortKey::Name,
            "type" | "kind" => SortKey::Kind,
            "visit_count" | "count" | "visits" => SortKey::VisitCount,
            "last_visit" | "lastvisit" | "last-visit" => SortKey::LastVisit,
            "path" => SortKey::Path,
            _ => SortKey::LastVisit,
        }
    }

    /// Canonical spelling of the key
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Kind => "type",
            SortKey::VisitCount => "visit_count",
            SortKey::LastVisit => "last_visit",
            SortKey::Path => "path",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which signal source observed a visit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitSource {
    /// An open file-manager window navigated to the path
    Window,
    /// A new entry appeared in the recent-items log
    RecentItems,
    /// Recorded explicitly by the user
    Manual,
}

/// A path observed as visited "now"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitEvent {
    /// Normalized path to record
    pub path: CanonicalPath,
    /// Signal source
    pub source: VisitSource,
}

impl VisitEvent {
    pub fn new(path: CanonicalPath, source: VisitSource) -> Self {
        Self { path, source }
    }
}
