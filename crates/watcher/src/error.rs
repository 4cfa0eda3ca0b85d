//! Watcher error taxonomy

use footprints_core::NormalizationError;
use footprints_store::StoreError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// The OS refused to list windows or recent items this cycle
    #[error("enumeration failed: {0}")]
    Enumeration(String),

    #[error("cannot resolve shortcut {}: {reason}", path.display())]
    Resolve { path: PathBuf, reason: String },

    #[error(transparent)]
    Normalization(#[from] NormalizationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The sink stopped writing after the store reported corruption
    #[error("persistence disabled after store corruption")]
    PersistenceDisabled,

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
