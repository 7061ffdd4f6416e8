//! WhaleWave command line application.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::PathBuf;
use whalewave_config::{load_config, LoggingConfig};
use whalewave_monitor::setup_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging falls back to the config file; the load error itself is
    // reported after the subscriber is up.
    let loaded = load_config(&cli.config);
    let logging = loaded
        .as_ref()
        .map(|config| config.logging.clone())
        .unwrap_or_else(|_| LoggingConfig::default());

    let level = cli
        .log_level
        .as_ref()
        .map(|level| level.as_str().to_string())
        .unwrap_or(logging.level);
    let json = cli.json_logs || logging.format == "json";
    let log_file = cli.log_file.clone().or(logging.file.map(PathBuf::from));
    let _guard = setup_logging(&level, json, log_file.as_deref());

    let config = loaded
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    match cli.command {
        Commands::Replay(args) => cli::commands::replay::run(args, config).await,
        Commands::Score(args) => cli::commands::score::run(args, config).await,
        Commands::ValidateConfig(args) => cli::commands::validate::run(args, config, &cli.config),
    }
}
