//! Read-only search over the footprint store

use crate::{FootprintStore, StoreError};
use footprints_core::{Footprint, SortKey};

/// Hard ceiling on rows returned by a search
pub const SEARCH_LIMIT: usize = 300;

/// Substring search with a fixed row cap
///
/// Failures are returned, never flattened into an empty result, so callers
/// can tell "no matches" from "query failed".
#[derive(Debug, Clone)]
pub struct SearchIndex {
    store: FootprintStore,
}

impl SearchIndex {
    pub fn new(store: FootprintStore) -> Self {
        Self { store }
    }

    /// Rows whose name or path contains `text`; empty text matches all
    pub fn search(&self, text: &str, sort: SortKey) -> Result<Vec<Footprint>, StoreError> {
        let rows = self.store.query(text, sort, SEARCH_LIMIT)?;
        tracing::debug!(
            "search {:?} sorted by {} returned {} rows",
            text,
            sort,
            rows.len()
        );
        Ok(rows)
    }

    /// Same as [`search`](Self::search) with a textual sort key
    pub fn search_by(&self, text: &str, sort_key: &str) -> Result<Vec<Footprint>, StoreError> {
        self.search(text, SortKey::parse(sort_key))
    }

    /// Total rows in the store
    pub fn count(&self) -> Result<u64, StoreError> {
        self.store.count()
    }

    pub fn store(&self) -> &FootprintStore {
        &self.store
    }
}
