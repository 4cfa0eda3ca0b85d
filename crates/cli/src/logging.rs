//! Tracing setup
//!
//! Logs always go to stderr so command output on stdout stays clean.
//! When a log directory is given, a non-blocking daily-rolling file is
//! added; the returned guard flushes it and must live until exit.

use crate::system_config::LoggingConfig;
use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_FILE_PREFIX: &str = "footprints.log";

pub fn init(config: &LoggingConfig, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    // RUST_LOG wins over the configured level
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_ascii_lowercase()));
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let Some(dir) = log_dir.filter(|_| config.file_enabled) else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .try_init()
            .context("Failed to install log subscriber")?;
        return Ok(None);
    };

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .try_init()
        .context("Failed to install log subscriber")?;

    tracing::info!("Logging to {}", dir.join(LOG_FILE_PREFIX).display());
    Ok(Some(guard))
}
