//! Record visits by hand

use crate::system_config::SystemConfig;
use crate::util;
use anyhow::Result;
use footprints_core::normalize;
use owo_colors::OwoColorize;
use std::path::Path;

/// Normalize and record each path; bad paths are reported and skipped
pub async fn run(config: &SystemConfig, db_path: &Path, paths: &[String]) -> Result<()> {
    let store = util::open_store(db_path, config)?;
    let mut failed = 0usize;

    for raw in paths {
        let canonical = match normalize(raw) {
            Ok(canonical) => canonical,
            Err(e) => {
                eprintln!("{} {:?}: {}", "✗".red(), raw, e);
                failed += 1;
                continue;
            }
        };

        match store.record_visit(&canonical) {
            Ok(row) => println!(
                "{} {} {}",
                "✓".green(),
                row.path,
                format!("({}, visits: {})", row.kind, row.visit_count).dimmed()
            ),
            Err(e) => {
                eprintln!("{} {}: {}", "✗".red(), canonical.path, e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} paths could not be recorded", failed, paths.len());
    }
    Ok(())
}
