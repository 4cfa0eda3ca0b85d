//! Core types for Footprints
//!
//! This crate provides the pieces every other crate agrees on:
//! - Path canonicalization and visit classification
//! - The `Footprint` row model and its closed `FootprintKind`
//! - Sort keys understood by the search layer
//! - Visit events produced by watchers

pub mod footprint;
pub mod path;

// Re-export main types for convenience
pub use footprint::{Footprint, FootprintKind, SortKey, VisitEvent, VisitSource};
pub use path::{file_url_to_path, normalize, CanonicalPath, NormalizationError};
