//! Search recorded footprints

use crate::system_config::SystemConfig;
use crate::util;
use anyhow::{Context, Result};
use footprints_core::{Footprint, FootprintKind, SortKey};
use footprints_store::{SearchIndex, SEARCH_LIMIT};
use owo_colors::OwoColorize;
use std::path::Path;

const NAME_WIDTH: usize = 32;
const PATH_WIDTH: usize = 60;

pub async fn run(
    config: &SystemConfig,
    db_path: &Path,
    text: &str,
    sort: &str,
    json: bool,
) -> Result<()> {
    let index = SearchIndex::new(util::open_store(db_path, config)?);
    let sort_key = SortKey::parse(sort);
    let rows = index.search(text, sort_key).context("Search failed")?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&rows).context("Failed to encode results")?
        );
        return Ok(());
    }

    if rows.is_empty() {
        println!("{}", "No footprints found".dimmed());
        return Ok(());
    }

    println!(
        "{:<name_w$}  {:<11}  {:>6}  {:<16}  {}",
        "NAME".bold(),
        "TYPE".bold(),
        "VISITS".bold(),
        "LAST VISIT".bold(),
        "PATH".bold(),
        name_w = NAME_WIDTH
    );
    for row in &rows {
        print_row(row);
    }

    let footer = format!(
        "Displaying {} items (sorted by {})",
        rows.len(),
        sort_key
    );
    println!("\n{}", footer.dimmed());
    if rows.len() == SEARCH_LIMIT {
        println!(
            "{}",
            format!("Showing the first {SEARCH_LIMIT}; refine the search to see more").yellow()
        );
    }

    Ok(())
}

fn print_row(row: &Footprint) {
    let name = util::elide_middle(&row.name, NAME_WIDTH);
    let name = match row.kind {
        FootprintKind::Folder => format!("{:<w$}", name, w = NAME_WIDTH).blue().to_string(),
        _ => format!("{:<w$}", name, w = NAME_WIDTH),
    };

    println!(
        "{}  {:<11}  {:>6}  {:<16}  {}",
        name,
        row.kind.as_str(),
        row.visit_count,
        util::format_relative_time(row.last_visit),
        util::elide_middle(&row.path, PATH_WIDTH).dimmed()
    );
}
