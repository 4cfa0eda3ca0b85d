//! Footprints CLI - fp command

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;
mod locks;
mod logging;
mod system_config;
mod util;

/// Footprints - a searchable history of the folders and files you visit
#[derive(Parser)]
#[command(name = "fp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database file (overrides store.path from the config)
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the watchers in the foreground until Ctrl-C
    Start,
    /// Search recorded footprints
    Search {
        /// Case-insensitive substring of the name or path (empty matches all)
        #[arg(default_value = "")]
        text: String,
        /// Sort key: name, type, visit_count, last_visit or path
        #[arg(short, long, default_value = "last_visit")]
        sort: String,
        /// Print rows as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the number of recorded footprints
    Count,
    /// Record a visit to each path
    Record {
        /// Paths or file:// URLs
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// List all configuration values
    List,
    /// Get a configuration value
    Get {
        /// Configuration key (e.g. watcher.poll_interval_secs)
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// New value
        value: String,
    },
    /// Show the config file path
    Path {
        /// Create the file with defaults if missing
        #[arg(long)]
        create: bool,
    },
    /// Show an example configuration
    Example,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config commands report a broken config file themselves.
    let config = match &cli.command {
        Commands::Config(_) => system_config::load().unwrap_or_default(),
        _ => system_config::load()?,
    };
    let db_path = util::resolve_db_path(cli.db.as_deref(), &config)?;

    // Only the long-running watcher writes a log file.
    let log_dir = match cli.command {
        Commands::Start => db_path.parent().map(|dir| dir.join("logs")),
        _ => None,
    };
    let _log_guard = logging::init(&config.logging, log_dir.as_deref())?;

    match cli.command {
        Commands::Start => cmd::start::run(&config, &db_path).await,
        Commands::Search { text, sort, json } => {
            cmd::search::run(&config, &db_path, &text, &sort, json).await
        }
        Commands::Count => cmd::count::run(&config, &db_path).await,
        Commands::Record { paths } => cmd::record::run(&config, &db_path, &paths).await,
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::List => cmd::config::run_list().await,
            ConfigCommands::Get { key } => cmd::config::run_get(&key).await,
            ConfigCommands::Set { key, value } => cmd::config::run_set(&key, &value).await,
            ConfigCommands::Path { create } => cmd::config::run_path(create).await,
            ConfigCommands::Example => cmd::config::run_example().await,
        },
    }
}
