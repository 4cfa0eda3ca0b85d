//! Store error taxonomy

use rusqlite::ErrorCode;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Another writer held the lock for longer than the busy timeout
    #[error("store busy: lock not acquired within {timeout:?}")]
    Busy { timeout: Duration },

    /// The database file or its rows cannot be trusted
    #[error("store corrupt: {0}")]
    Corrupt(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("sqlite: {0}")]
    Sql(rusqlite::Error),
}

impl StoreError {
    pub fn is_busy(&self) -> bool {
        matches!(self, StoreError::Busy { .. })
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, StoreError::Corrupt(_))
    }

    /// Sort a SQLite failure into the taxonomy
    ///
    /// `timeout` is the busy timeout the failing connection was using.
    pub(crate) fn from_sql(err: rusqlite::Error, timeout: Duration) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _) => match code.code {
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => StoreError::Busy { timeout },
                ErrorCode::DatabaseCorrupt | ErrorCode::NotADatabase => {
                    StoreError::Corrupt(err.to_string())
                }
                _ => StoreError::Sql(err),
            },
            rusqlite::Error::FromSqlConversionFailure(..)
            | rusqlite::Error::InvalidColumnType(..)
            | rusqlite::Error::IntegralValueOutOfRange(..) => StoreError::Corrupt(err.to_string()),
            _ => StoreError::Sql(err),
        }
    }
}
