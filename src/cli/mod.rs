//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "whalewave")]
#[command(author, version, about = "Weighted-score trading engine with an untrusted strategy oracle")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level (defaults to logging.level from the config)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    /// Also write JSON logs to this file, rotated daily
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay historical candles through the full cycle
    Replay(ReplayArgs),
    /// Score the latest snapshot and show the oracle decision
    Score(ScoreArgs),
    /// Validate configuration
    ValidateConfig(ValidateArgs),
}

/// Candle files for the three timeframes.
#[derive(clap::Args)]
pub struct DataArgs {
    /// Primary timeframe candles (CSV)
    #[arg(long)]
    pub primary: PathBuf,

    /// Trend timeframe candles (CSV)
    #[arg(long)]
    pub trend: PathBuf,

    /// Scalping timeframe candles (CSV)
    #[arg(long)]
    pub scalping: PathBuf,

    /// Symbol override
    #[arg(short = 'S', long)]
    pub symbol: Option<String>,
}

#[derive(clap::Args)]
pub struct ReplayArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Stop after this many completed cycles
    #[arg(long)]
    pub max_cycles: Option<u64>,

    /// Write every fill to this CSV file
    #[arg(long)]
    pub journal: Option<PathBuf>,

    /// Write the equity curve to this CSV file
    #[arg(long)]
    pub equity_csv: Option<PathBuf>,

    /// Log every cycle report as JSON at debug level
    #[arg(long)]
    pub json_reports: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Save session statistics to file (JSON)
    #[arg(long)]
    pub save: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct ScoreArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Gate this decision (JSON file) instead of asking the technical oracle
    #[arg(long)]
    pub decision: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Print the effective configuration as TOML
    #[arg(long)]
    pub show: bool,
}
