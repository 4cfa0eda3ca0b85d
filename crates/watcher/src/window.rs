//! Open-window diffing
//!
//! Each poll asks the enumerator for every open file-manager window and the
//! folder it shows. A visit is emitted for a window that is new since the
//! last poll or whose folder changed; a window showing the same folder as
//! before emits nothing.

use crate::{WatchError, Watcher};
use footprints_core::{normalize, VisitEvent, VisitSource};
use std::collections::BTreeMap;
use tracing::debug;

/// Stable identity of an open window for as long as it stays open
pub type WindowId = u64;

/// Lists open file-manager windows and the raw location each one shows
///
/// Locations are returned as the OS reports them (native paths or file
/// URLs); the watcher normalizes them. Windows whose location cannot be
/// read should be left out rather than failing the whole listing.
pub trait WindowEnumerator: Send {
    fn enumerate(&mut self) -> Result<BTreeMap<WindowId, String>, WatchError>;
}

/// Emits a visit whenever a window appears or navigates
pub struct WindowWatcher<E> {
    enumerator: E,
    /// Canonical path per window as of the last successful poll
    last_seen: BTreeMap<WindowId, String>,
}

impl<E: WindowEnumerator> WindowWatcher<E> {
    pub fn new(enumerator: E) -> Self {
        Self {
            enumerator,
            last_seen: BTreeMap::new(),
        }
    }

    /// Windows tracked after the last successful poll
    pub fn tracked(&self) -> &BTreeMap<WindowId, String> {
        &self.last_seen
    }

    fn poll_windows(&mut self) -> Result<Vec<VisitEvent>, WatchError> {
        let listing = self.enumerator.enumerate()?;

        let mut current = BTreeMap::new();
        let mut events = Vec::new();

        for (id, raw) in listing {
            let canonical = match normalize(&raw) {
                Ok(canonical) => canonical,
                Err(e) => {
                    debug!("Skipping window {} at {:?}: {}", id, raw, e);
                    continue;
                }
            };

            if self.last_seen.get(&id) != Some(&canonical.path) {
                current.insert(id, canonical.path.clone());
                events.push(VisitEvent::new(canonical, VisitSource::Window));
            } else {
                current.insert(id, canonical.path);
            }
        }

        // Closed windows drop out here; reopening one counts as a new visit.
        self.last_seen = current;
        Ok(events)
    }
}

impl<E: WindowEnumerator> Watcher for WindowWatcher<E> {
    fn name(&self) -> &'static str {
        "windows"
    }

    fn poll(&mut self) -> Result<Vec<VisitEvent>, WatchError> {
        self.poll_windows()
    }
}

/// Enumerator for platforms without a supported file manager
#[derive(Debug, Default, Clone, Copy)]
pub struct NoWindows;

impl WindowEnumerator for NoWindows {
    fn enumerate(&mut self) -> Result<BTreeMap<WindowId, String>, WatchError> {
        Ok(BTreeMap::new())
    }
}
