//! CSV candle source.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use whalewave_core::error::DataError;
use whalewave_core::types::Candle;

/// CSV record format.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(
        alias = "Date",
        alias = "date",
        alias = "timestamp",
        alias = "Timestamp",
        alias = "startTime",
        alias = "open_time"
    )]
    date: String,
    #[serde(alias = "Open", alias = "open")]
    open: f64,
    #[serde(alias = "High", alias = "high")]
    high: f64,
    #[serde(alias = "Low", alias = "low")]
    low: f64,
    #[serde(alias = "Close", alias = "close")]
    close: f64,
    #[serde(alias = "Volume", alias = "volume", default)]
    volume: f64,
}

/// Historical candles stored in a CSV file.
pub struct CsvCandleSource {
    path: PathBuf,
}

impl CsvCandleSource {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DataError::Internal(format!(
                "candle file not found: {}",
                path.display()
            )));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every candle, oldest first.
    ///
    /// Rows sharing a timestamp keep the last occurrence so the series is
    /// strictly ascending. Malformed candles are dropped with a warning.
    pub fn load(&self) -> Result<Vec<Candle>, DataError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| DataError::ParseError(e.to_string()))?;

        let mut candles = Vec::new();
        for (row, result) in reader.deserialize().enumerate() {
            let record: CsvRecord = result.map_err(|e| DataError::ParseError(e.to_string()))?;
            let timestamp = parse_timestamp(&record.date)?;

            let candle = Candle::new(
                timestamp,
                record.open,
                record.high,
                record.low,
                record.close,
                record.volume,
            );
            if !candle.is_well_formed() {
                warn!("Skipping malformed candle at row {} in {}", row + 1, self.path.display());
                continue;
            }
            candles.push(candle);
        }

        if candles.is_empty() {
            return Err(DataError::NoDataAvailable);
        }

        // Stable sort keeps file order among duplicates
        candles.sort_by_key(|c| c.timestamp);
        let before = candles.len();
        candles.reverse();
        candles.dedup_by_key(|c| c.timestamp);
        candles.reverse();
        if candles.len() != before {
            debug!(
                "Dropped {} duplicate timestamps from {}",
                before - candles.len(),
                self.path.display()
            );
        }

        Ok(candles)
    }
}

/// Parse a timestamp column into Unix milliseconds.
///
/// Accepts RFC 3339, a handful of date/datetime layouts (taken as UTC) and
/// raw Unix seconds or milliseconds.
pub(crate) fn parse_timestamp(value: &str) -> Result<i64, DataError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.timestamp_millis());
    }

    let datetime_formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
    for format in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }

    let date_formats = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
    for format in date_formats {
        if let Some(dt) = NaiveDate::parse_from_str(value, format)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
        {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }

    if let Ok(ts) = value.parse::<i64>() {
        // More than 10 digits means milliseconds
        return Ok(if ts > 10_000_000_000 { ts } else { ts * 1000 });
    }

    Err(DataError::ParseError(format!("Could not parse date: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_timestamp() {
        assert_eq!(parse_timestamp("1970-01-02").unwrap(), 86_400_000);
        assert_eq!(parse_timestamp("1970-01-01 00:01:00").unwrap(), 60_000);
        assert_eq!(parse_timestamp("1970-01-01T00:00:01Z").unwrap(), 1_000);
        assert_eq!(parse_timestamp("1705312800000").unwrap(), 1_705_312_800_000);
        assert_eq!(parse_timestamp("1705312800").unwrap(), 1_705_312_800_000);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_load_sorts_and_dedups() {
        let file = write_csv(
            "timestamp,open,high,low,close,volume\n\
             120000,101,102,100,101.5,5\n\
             60000,100,101,99,100.5,4\n\
             120000,101,103,100,102,6\n",
        );
        let candles = CsvCandleSource::new(file.path()).unwrap().load().unwrap();

        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].timestamp, 60_000);
        // Last row for a duplicated timestamp wins
        assert_eq!(candles[1].close, 102.0);
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let file = write_csv(
            "Date,Open,High,Low,Close,Volume\n\
             2024-01-01,100,101,99,100,1\n\
             2024-01-02,0,101,99,100,1\n",
        );
        let candles = CsvCandleSource::new(file.path()).unwrap().load().unwrap();
        assert_eq!(candles.len(), 1);
    }

    #[test]
    fn test_missing_file_and_empty_file() {
        assert!(CsvCandleSource::new("/definitely/not/here.csv").is_err());

        let file = write_csv("timestamp,open,high,low,close,volume\n");
        assert!(matches!(
            CsvCandleSource::new(file.path()).unwrap().load(),
            Err(DataError::NoDataAvailable)
        ));
    }
}
