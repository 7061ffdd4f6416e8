//! OHLCV candle type and column helpers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV candle.
/// Uses f64 for fast indicator calculations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Candle {
    /// Unix timestamp in milliseconds (candle open time)
    pub timestamp: i64,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Traded volume
    pub volume: f64,
}

impl Candle {
    /// Create a new candle.
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Typical price (HLC average).
    #[inline]
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Mid price (HL average).
    #[inline]
    pub fn hl2(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    /// Candle range (high - low).
    #[inline]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Absolute body size.
    #[inline]
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Close above open.
    #[inline]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Close below open.
    #[inline]
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// +1 for a bullish body, -1 for bearish, 0 for a doji.
    #[inline]
    pub fn direction(&self) -> i8 {
        if self.is_bullish() {
            1
        } else if self.is_bearish() {
            -1
        } else {
            0
        }
    }

    /// Timestamp as a UTC datetime.
    pub fn datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp).unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// True range against the previous close.
    pub fn true_range(&self, prev_close: Option<f64>) -> f64 {
        match prev_close {
            Some(pc) => {
                let hl = self.high - self.low;
                let hc = (self.high - pc).abs();
                let lc = (self.low - pc).abs();
                hl.max(hc).max(lc)
            }
            None => self.high - self.low,
        }
    }

    /// All fields finite, prices positive, open and close inside
    /// `[low, high]` and volume non-negative.
    pub fn is_well_formed(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        let range = self.low..=self.high;
        prices.iter().all(|p| p.is_finite() && *p > 0.0)
            && range.contains(&self.open)
            && range.contains(&self.close)
            && self.volume.is_finite()
            && self.volume >= 0.0
    }
}

/// Column extraction over a candle slice.
pub trait CandleColumns {
    fn opens(&self) -> Vec<f64>;
    fn highs(&self) -> Vec<f64>;
    fn lows(&self) -> Vec<f64>;
    fn closes(&self) -> Vec<f64>;
    fn volumes(&self) -> Vec<f64>;
    fn typical_prices(&self) -> Vec<f64>;
    fn hl2s(&self) -> Vec<f64>;
    /// True range per candle; the first candle uses its own high-low range.
    fn true_ranges(&self) -> Vec<f64>;
}

impl CandleColumns for [Candle] {
    fn opens(&self) -> Vec<f64> {
        self.iter().map(|c| c.open).collect()
    }

    fn highs(&self) -> Vec<f64> {
        self.iter().map(|c| c.high).collect()
    }

    fn lows(&self) -> Vec<f64> {
        self.iter().map(|c| c.low).collect()
    }

    fn closes(&self) -> Vec<f64> {
        self.iter().map(|c| c.close).collect()
    }

    fn volumes(&self) -> Vec<f64> {
        self.iter().map(|c| c.volume).collect()
    }

    fn typical_prices(&self) -> Vec<f64> {
        self.iter().map(Candle::typical_price).collect()
    }

    fn hl2s(&self) -> Vec<f64> {
        self.iter().map(Candle::hl2).collect()
    }

    fn true_ranges(&self) -> Vec<f64> {
        self.iter()
            .enumerate()
            .map(|(i, c)| c.true_range(i.checked_sub(1).map(|p| self[p].close)))
            .collect()
    }
}

/// Index of the last candle whose timestamp is at or before `timestamp`.
///
/// Requires ascending timestamps.
pub fn as_of_index(candles: &[Candle], timestamp: i64) -> Option<usize> {
    candles
        .partition_point(|c| c.timestamp <= timestamp)
        .checked_sub(1)
}
