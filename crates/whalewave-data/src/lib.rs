//! Market data sources for WhaleWave.

mod csv_source;
mod replay;

pub use csv_source::CsvCandleSource;
pub use replay::{ReplayProvider, ReplaySeries, DEFAULT_LOOKBACK};

use std::path::Path;
use whalewave_core::error::DataError;
use whalewave_core::types::{Candle, Timeframe};

/// Load candles from a CSV file.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<Candle>, DataError> {
    CsvCandleSource::new(path)?.load()
}

/// Load a CSV file as a replay series of the given interval.
pub fn load_series(path: impl AsRef<Path>, timeframe: Timeframe) -> Result<ReplaySeries, DataError> {
    Ok(ReplaySeries::new(timeframe, load_csv(path)?))
}
