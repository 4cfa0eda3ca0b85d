//! Durable visit history for Footprints
//!
//! This crate provides:
//! - `FootprintStore`: SQLite-backed upsert store keyed by canonical path
//! - `SearchIndex`: substring search with sort keys and a hard row cap
//! - Bounded-wait writes (busy timeout) with typed busy/corrupt errors

pub mod error;
mod schema;
pub mod search;
pub mod store;

// Re-exports
pub use error::StoreError;
pub use search::{SearchIndex, SEARCH_LIMIT};
pub use store::{default_db_path, FootprintStore, DEFAULT_BUSY_TIMEOUT};

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
