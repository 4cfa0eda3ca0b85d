//! Platform window enumerators, shortcut resolvers and watcher selection

pub mod finder;

#[cfg(windows)]
pub mod windows;

use crate::recent::RecentItemsWatcher;
use crate::window::WindowWatcher;
use crate::{Watcher, WatcherConfig};
use std::path::PathBuf;

#[cfg(windows)]
type NativeWindows = self::windows::ExplorerWindows;
#[cfg(target_os = "macos")]
type NativeWindows = finder::FinderWindows;
#[cfg(not(any(windows, target_os = "macos")))]
type NativeWindows = crate::window::NoWindows;

#[cfg(windows)]
type NativeResolver = self::windows::ShellLinkResolver;
#[cfg(not(windows))]
type NativeResolver = crate::recent::SymlinkResolver;

/// Recent-items folder the OS maintains, if it has one
pub fn default_recent_dir() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        self::windows::recent_dir()
    }
    #[cfg(not(windows))]
    {
        None
    }
}

/// Drive-rooted (`C:\dir`) or UNC (`\\host\share`) path
///
/// Virtual shell folders report names like `::{GUID}` and fail both checks.
#[cfg_attr(not(windows), allow(dead_code))]
pub(crate) fn is_windows_fs_path(path: &str) -> bool {
    let bytes = path.as_bytes();
    let drive_rooted = bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && matches!(bytes[2], b'\\' | b'/');
    drive_rooted || path.starts_with(r"\\")
}

/// Build the enabled watchers for this platform
///
/// Watchers that have nothing to observe on this platform are still built;
/// they stay inert rather than failing startup.
pub fn default_watchers(config: &WatcherConfig) -> Vec<Box<dyn Watcher>> {
    let mut watchers: Vec<Box<dyn Watcher>> = Vec::new();

    if config.windows_enabled {
        watchers.push(Box::new(WindowWatcher::new(NativeWindows::default())));
    }

    if config.recent_enabled {
        let dir = config.recent_dir.clone().or_else(default_recent_dir);
        watchers.push(Box::new(RecentItemsWatcher::new(
            dir,
            NativeResolver::default(),
        )));
    }

    watchers
}
