//! Print the number of recorded footprints

use crate::system_config::SystemConfig;
use crate::util;
use anyhow::{Context, Result};
use footprints_store::SearchIndex;
use std::path::Path;

pub async fn run(config: &SystemConfig, db_path: &Path) -> Result<()> {
    let index = SearchIndex::new(util::open_store(db_path, config)?);
    let count = index.count().context("Failed to count footprints")?;
    println!("{}", count);
    Ok(())
}
