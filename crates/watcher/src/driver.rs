//! Poll loop and thread lifecycle
//!
//! Every watcher gets its own named thread. The loop polls, hands the
//! events to the sink, then waits on the stop channel for one interval;
//! a stop request (or a dropped handle) ends the wait early.

use crate::{VisitSink, WatchError, Watcher};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

/// Counters kept by one watcher loop
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoopStats {
    /// Completed poll cycles
    pub cycles: u64,
    /// Cycles whose poll failed
    pub failed_cycles: u64,
    /// Events the sink accepted
    pub recorded: u64,
    /// Events the sink refused
    pub dropped: u64,
}

/// Handle to a running watcher thread
pub struct WatcherHandle {
    name: &'static str,
    stop_tx: Sender<()>,
    thread: Option<JoinHandle<LoopStats>>,
}

impl WatcherHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Ask the loop to stop and wait for it
    ///
    /// Returns the loop's counters, or None if the thread panicked.
    pub fn stop(mut self) -> Option<LoopStats> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Option<LoopStats> {
        let _ = self.stop_tx.try_send(());
        let thread = self.thread.take()?;
        match thread.join() {
            Ok(stats) => Some(stats),
            Err(_) => {
                error!("{} watcher thread panicked", self.name);
                None
            }
        }
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Start `watcher` on its own thread, polling every `interval`
pub fn spawn(
    mut watcher: Box<dyn Watcher>,
    sink: Arc<dyn VisitSink>,
    interval: Duration,
) -> io::Result<WatcherHandle> {
    let name = watcher.name();
    let (stop_tx, stop_rx) = bounded(1);

    let thread = thread::Builder::new()
        .name(format!("fp-watch-{name}"))
        .spawn(move || run_loop(watcher.as_mut(), sink.as_ref(), interval, &stop_rx))?;

    Ok(WatcherHandle {
        name,
        stop_tx,
        thread: Some(thread),
    })
}

/// Poll until a stop request arrives or the sender is dropped
pub fn run_loop(
    watcher: &mut dyn Watcher,
    sink: &dyn VisitSink,
    interval: Duration,
    stop_rx: &Receiver<()>,
) -> LoopStats {
    let mut stats = LoopStats::default();
    info!("{} watcher started (interval: {:?})", watcher.name(), interval);

    loop {
        run_cycle(watcher, sink, &mut stats);

        match stop_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    info!(
        "{} watcher stopped after {} cycles ({} recorded, {} dropped, {} failed cycles)",
        watcher.name(),
        stats.cycles,
        stats.recorded,
        stats.dropped,
        stats.failed_cycles
    );
    stats
}

fn run_cycle(watcher: &mut dyn Watcher, sink: &dyn VisitSink, stats: &mut LoopStats) {
    stats.cycles += 1;

    let events = match watcher.poll() {
        Ok(events) => events,
        Err(e) => {
            stats.failed_cycles += 1;
            warn!("{} watcher cycle failed: {}", watcher.name(), e);
            return;
        }
    };

    if !events.is_empty() {
        debug!("{} watcher saw {} visits", watcher.name(), events.len());
    }

    for event in &events {
        match sink.record(event) {
            Ok(()) => stats.recorded += 1,
            Err(e) => {
                stats.dropped += 1;
                report_dropped(watcher.name(), &event.path.path, &e);
            }
        }
    }
}

fn report_dropped(watcher: &str, path: &str, err: &WatchError) {
    match err {
        WatchError::PersistenceDisabled => trace!("{}: visit to {} not persisted", watcher, path),
        WatchError::Store(e) if e.is_busy() => {
            warn!("{}: visit to {} lost: {}", watcher, path, e)
        }
        other => error!("{}: visit to {} lost: {}", watcher, path, other),
    }
}
