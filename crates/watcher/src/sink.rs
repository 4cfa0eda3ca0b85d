//! Where watchers deliver their visits

use crate::WatchError;
use footprints_core::VisitEvent;
use footprints_store::FootprintStore;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error};

/// Receives visit events from every watcher thread
pub trait VisitSink: Send + Sync {
    fn record(&self, event: &VisitEvent) -> Result<(), WatchError>;
}

/// Persists visits into the footprint store
///
/// Once the store reports corruption, every later visit is refused with
/// `PersistenceDisabled` until the process restarts. Busy failures only
/// lose the one visit.
#[derive(Debug)]
pub struct StoreSink {
    store: FootprintStore,
    disabled: AtomicBool,
}

impl StoreSink {
    pub fn new(store: FootprintStore) -> Self {
        Self {
            store,
            disabled: AtomicBool::new(false),
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Acquire)
    }

    pub fn store(&self) -> &FootprintStore {
        &self.store
    }
}

impl VisitSink for StoreSink {
    fn record(&self, event: &VisitEvent) -> Result<(), WatchError> {
        if self.is_disabled() {
            return Err(WatchError::PersistenceDisabled);
        }

        match self.store.record_visit(&event.path) {
            Ok(row) => {
                debug!(
                    "Recorded {:?} visit to {} (visits: {})",
                    event.source, row.path, row.visit_count
                );
                Ok(())
            }
            Err(e) => {
                if e.is_corrupt() && !self.disabled.swap(true, Ordering::AcqRel) {
                    error!(
                        "Store at {} is corrupt; persistence disabled until restart: {}",
                        self.store.db_path().display(),
                        e
                    );
                }
                Err(e.into())
            }
        }
    }
}
