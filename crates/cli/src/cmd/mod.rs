//! CLI command implementations

pub mod config;
pub mod count;
pub mod record;
pub mod search;
pub mod start;
