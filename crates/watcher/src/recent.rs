//! Recent-items folder following
//!
//! The OS drops a shortcut into the recent-items folder whenever the user
//! opens something. Each poll finds the newest entry; when it is newer than
//! the last one seen, its target is recorded as a visit. Only the single
//! newest entry is considered per poll, so several entries landing between
//! two polls yield one visit.

use crate::{WatchError, Watcher};
use footprints_core::{normalize, VisitEvent, VisitSource};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// Turns a recent-items entry into the path it points at
pub trait ShortcutResolver: Send {
    /// Whether `entry` is part of the recent-items log at all
    fn is_entry(&self, entry: &Path) -> bool {
        has_extension(entry, &["lnk", "url"])
    }

    /// Whether `entry` points at a file-system target
    ///
    /// Entries that are not resolvable still advance the baseline.
    fn is_resolvable(&self, entry: &Path) -> bool {
        has_extension(entry, &["lnk"])
    }

    fn resolve(&mut self, shortcut: &Path) -> Result<PathBuf, WatchError>;
}

/// Newest entry observed in the recent-items folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentEntry {
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// Emits a visit for each new newest entry of the recent-items folder
pub struct RecentItemsWatcher<R> {
    dir: Option<PathBuf>,
    resolver: R,
    baseline: Option<RecentEntry>,
}

impl<R: ShortcutResolver> RecentItemsWatcher<R> {
    /// Create a watcher and prime its baseline from the current folder
    ///
    /// Entries that already exist are history, not visits. With no folder,
    /// or one that does not exist, the watcher is inert.
    pub fn new(dir: Option<PathBuf>, resolver: R) -> Self {
        match &dir {
            None => info!("No recent-items folder on this platform; recent watcher is inert"),
            Some(d) if !d.is_dir() => {
                warn!("Recent-items folder {} not found; recent watcher is inert", d.display())
            }
            Some(d) => info!("Following recent items in {}", d.display()),
        }

        let mut watcher = Self {
            dir,
            resolver,
            baseline: None,
        };
        watcher.baseline = watcher.newest_entry();
        watcher
    }

    pub fn baseline(&self) -> Option<&RecentEntry> {
        self.baseline.as_ref()
    }

    /// Newest shortcut-like entry, or None when the folder has none
    fn newest_entry(&self) -> Option<RecentEntry> {
        let dir = self.dir.as_ref()?;
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Cannot list {}: {}", dir.display(), e);
                return None;
            }
        };

        let mut newest: Option<RecentEntry> = None;
        for entry in entries {
            let Ok(entry) = entry else { continue };
            let path = entry.path();
            if !self.resolver.is_entry(&path) {
                continue;
            }

            // DirEntry metadata does not follow links, so this is the entry's own time.
            let modified = match entry.metadata().and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(e) => {
                    debug!("No modification time for {}: {}", path.display(), e);
                    continue;
                }
            };

            if newest.as_ref().map_or(true, |n| modified > n.modified) {
                newest = Some(RecentEntry { path, modified });
            }
        }
        newest
    }

    fn poll_recent(&mut self) -> Result<Vec<VisitEvent>, WatchError> {
        let Some(newest) = self.newest_entry() else {
            return Ok(Vec::new());
        };

        let advanced = self
            .baseline
            .as_ref()
            .map_or(true, |b| newest.modified > b.modified);
        if !advanced {
            return Ok(Vec::new());
        }

        let event = self.visit_for(&newest.path);
        // No retry: the baseline moves even when the entry yields nothing.
        self.baseline = Some(newest);
        Ok(event.into_iter().collect())
    }

    fn visit_for(&mut self, entry: &Path) -> Option<VisitEvent> {
        if !self.resolver.is_resolvable(entry) {
            debug!("Recent entry {} has no file target", entry.display());
            return None;
        }

        let target = match self.resolver.resolve(entry) {
            Ok(target) => target,
            Err(e) => {
                debug!("Skipping recent entry: {}", e);
                return None;
            }
        };

        if !target.exists() {
            debug!(
                "Target {} of {} no longer exists",
                target.display(),
                entry.display()
            );
            return None;
        }

        let raw = target.to_str()?;
        match normalize(raw) {
            Ok(canonical) => Some(VisitEvent::new(canonical, VisitSource::RecentItems)),
            Err(e) => {
                debug!("Cannot normalize {}: {}", target.display(), e);
                None
            }
        }
    }
}

impl<R: ShortcutResolver> Watcher for RecentItemsWatcher<R> {
    fn name(&self) -> &'static str {
        "recent"
    }

    fn poll(&mut self) -> Result<Vec<VisitEvent>, WatchError> {
        self.poll_recent()
    }
}

/// Resolver for folders of symbolic links
///
/// Used where the OS keeps no shell links: any symlink in the folder is an
/// entry, and relative link targets are taken from the link's directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymlinkResolver;

impl ShortcutResolver for SymlinkResolver {
    fn is_entry(&self, entry: &Path) -> bool {
        entry.is_symlink()
    }

    fn is_resolvable(&self, entry: &Path) -> bool {
        entry.is_symlink()
    }

    fn resolve(&mut self, shortcut: &Path) -> Result<PathBuf, WatchError> {
        let target = fs::read_link(shortcut).map_err(|e| WatchError::Resolve {
            path: shortcut.to_path_buf(),
            reason: e.to_string(),
        })?;

        if target.is_absolute() {
            return Ok(target);
        }
        Ok(shortcut
            .parent()
            .map(|dir| dir.join(&target))
            .unwrap_or(target))
    }
}

fn has_extension(path: &Path, wanted: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| wanted.iter().any(|w| ext.eq_ignore_ascii_case(w)))
        .unwrap_or(false)
}
