//! Error types for the WhaleWave engine.

use thiserror::Error;

/// Top-level engine error.
#[derive(Error, Debug)]
pub enum WhaleError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),

    #[error("Invalid snapshot: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for WhaleError {
    fn from(err: serde_json::Error) -> Self {
        WhaleError::Serialization(err.to_string())
    }
}

/// Data provider errors.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("No data available for the requested range")]
    NoDataAvailable,

    #[error("Data feed exhausted")]
    Exhausted,

    #[error("Invalid timeframe: {0}")]
    InvalidTimeframe(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Data source error: {0}")]
    Internal(String),
}

/// Strategy oracle errors.
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("Oracle unavailable: {0}")]
    Unavailable(String),

    #[error("Oracle timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    #[error("Malformed oracle response: {0}")]
    MalformedResponse(String),
}

/// Structural problems with a market snapshot.
///
/// A snapshot that fails validation is rejected before any indicator runs,
/// so the account is never touched by a malformed cycle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SnapshotError {
    #[error("{series} series is empty")]
    EmptySeries { series: &'static str },

    #[error("{series} series needs {required} candles, has {available}")]
    InsufficientHistory {
        series: &'static str,
        required: usize,
        available: usize,
    },

    #[error("{series} series is not strictly ascending at index {index}")]
    NotAscending { series: &'static str, index: usize },

    #[error("{series} series has a non-finite or negative value at index {index}")]
    InvalidCandle { series: &'static str, index: usize },

    #[error("{series} series has no candle at or before the snapshot time")]
    NoCandleAsOf { series: &'static str },

    #[error("Last price must be finite and positive, got {0}")]
    InvalidPrice(f64),

    #[error("Order book has a non-finite or negative level")]
    InvalidOrderBook,
}

/// Result type alias for engine operations.
pub type WhaleResult<T> = Result<T, WhaleError>;
