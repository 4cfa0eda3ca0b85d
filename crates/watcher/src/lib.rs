//! Visit watchers for Footprints
//!
//! This crate turns desktop activity into visit events:
//! - `WindowWatcher` diffs the open file-manager windows between polls
//! - `RecentItemsWatcher` follows the newest entry in the OS recent-items folder
//! - `driver` runs each watcher on its own thread until told to stop
//! - `StoreSink` persists every event through the footprint store

pub mod config;
pub mod driver;
pub mod error;
pub mod platform;
pub mod recent;
pub mod sink;
pub mod window;

pub use config::WatcherConfig;
pub use driver::{spawn, LoopStats, WatcherHandle};
pub use error::WatchError;
pub use recent::{RecentEntry, RecentItemsWatcher, ShortcutResolver, SymlinkResolver};
pub use sink::{StoreSink, VisitSink};
pub use window::{WindowEnumerator, WindowId, WindowWatcher};

use footprints_core::VisitEvent;

/// One source of visits, polled on a fixed interval
///
/// A failed poll is reported and the watcher is polled again on the next
/// cycle; implementations keep their baseline intact across failures.
pub trait Watcher: Send {
    /// Short name used in thread names and log lines
    fn name(&self) -> &'static str;

    /// Run one detection cycle
    fn poll(&mut self) -> Result<Vec<VisitEvent>, WatchError>;
}
