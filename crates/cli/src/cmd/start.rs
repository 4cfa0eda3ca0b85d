//! Run the watchers in the foreground

use crate::locks::InstanceLock;
use crate::system_config::SystemConfig;
use crate::util;
use anyhow::{Context, Result};
use footprints_watcher::{platform, StoreSink, VisitSink, WatcherHandle};
use owo_colors::OwoColorize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub async fn run(config: &SystemConfig, db_path: &Path) -> Result<()> {
    // 1. One watcher process per database
    let lock = InstanceLock::acquire(db_path)?;
    info!("Holding instance lock {}", lock.path().display());

    // 2. Open (and if needed create) the store
    let store = util::open_store(db_path, config)?;
    let sink: Arc<dyn VisitSink> = Arc::new(StoreSink::new(store));

    // 3. Spawn one thread per enabled watcher
    let interval = config.watcher.poll_interval();
    let watchers = platform::default_watchers(&config.watcher);
    if watchers.is_empty() {
        anyhow::bail!("All watchers are disabled (see `fp config list`)");
    }

    let mut handles: Vec<WatcherHandle> = Vec::with_capacity(watchers.len());
    for watcher in watchers {
        let name = watcher.name();
        let handle = footprints_watcher::spawn(watcher, Arc::clone(&sink), interval)
            .with_context(|| format!("Failed to start {name} watcher"))?;
        handles.push(handle);
    }

    let names: Vec<_> = handles.iter().map(|h| h.name()).collect();
    info!("Watching {} every {:?}", names.join(", "), interval);
    println!(
        "{} Recording footprints into {}",
        "✓".green(),
        db_path.display().cyan()
    );
    println!("{}", "Press Ctrl-C to stop".dimmed());

    // 4. Wait for Ctrl-C
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    println!("Stopping...");

    // 5. Joining blocks, keep it off the runtime threads
    tokio::task::spawn_blocking(move || {
        for handle in handles {
            let name = handle.name();
            match handle.stop() {
                Some(stats) => info!(
                    "{} watcher: {} cycles, {} visits recorded",
                    name, stats.cycles, stats.recorded
                ),
                None => tracing::warn!("{} watcher did not shut down cleanly", name),
            }
        }
    })
    .await
    .context("Watcher shutdown task failed")?;

    drop(lock);
    println!("{} Stopped", "✓".green());
    Ok(())
}
