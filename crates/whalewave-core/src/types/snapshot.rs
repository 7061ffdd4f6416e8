//! Immutable per-cycle market snapshot.

use serde::{Deserialize, Serialize};

use super::candle::as_of_index;
use super::{Candle, OrderBook};
use crate::error::SnapshotError;

/// Prior-period high, low and close used for pivot levels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DailyLevels {
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl DailyLevels {
    /// All zero means the provider had no prior day to report.
    pub fn is_available(&self) -> bool {
        self.high > 0.0 && self.low > 0.0 && self.close > 0.0 && self.high >= self.low
    }
}

/// Everything a data provider hands the engine for one cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub symbol: String,
    /// Evaluation time in Unix milliseconds
    pub timestamp: i64,
    /// Primary timeframe candles, oldest first
    pub primary: Vec<Candle>,
    /// Higher timeframe candles used for directional bias
    pub trend: Vec<Candle>,
    /// Fast timeframe candles used for scalping confluence
    pub scalping: Vec<Candle>,
    pub order_book: OrderBook,
    pub last_price: f64,
    pub prior_day: DailyLevels,
}

impl MarketSnapshot {
    /// Check structural soundness before any indicator runs.
    ///
    /// Each series must be non-empty, strictly ascending in time, made of
    /// well-formed candles, and have a candle at or before the snapshot time.
    /// The primary and scalping series must also carry `min_candles` of
    /// history up to that point.
    pub fn validate(&self, min_candles: usize) -> Result<(), SnapshotError> {
        if !self.last_price.is_finite() || self.last_price <= 0.0 {
            return Err(SnapshotError::InvalidPrice(self.last_price));
        }
        if !self.order_book.is_well_formed() {
            return Err(SnapshotError::InvalidOrderBook);
        }

        let series: [(&'static str, &[Candle], usize); 3] = [
            ("primary", &self.primary, min_candles),
            ("trend", &self.trend, 1),
            ("scalping", &self.scalping, min_candles),
        ];

        for (name, candles, required) in series {
            if candles.is_empty() {
                return Err(SnapshotError::EmptySeries { series: name });
            }
            if let Some(index) = candles.iter().position(|c| !c.is_well_formed()) {
                return Err(SnapshotError::InvalidCandle { series: name, index });
            }
            if let Some(index) = candles
                .windows(2)
                .position(|w| w[1].timestamp <= w[0].timestamp)
            {
                return Err(SnapshotError::NotAscending {
                    series: name,
                    index: index + 1,
                });
            }
            let available = match as_of_index(candles, self.timestamp) {
                Some(idx) => idx + 1,
                None => return Err(SnapshotError::NoCandleAsOf { series: name }),
            };
            if available < required {
                return Err(SnapshotError::InsufficientHistory {
                    series: name,
                    required,
                    available,
                });
            }
        }

        Ok(())
    }

    /// Primary candles up to and including the snapshot time.
    pub fn primary_as_of(&self) -> &[Candle] {
        Self::slice_as_of(&self.primary, self.timestamp)
    }

    /// Trend candles up to and including the snapshot time.
    pub fn trend_as_of(&self) -> &[Candle] {
        Self::slice_as_of(&self.trend, self.timestamp)
    }

    /// Scalping candles up to and including the snapshot time.
    pub fn scalping_as_of(&self) -> &[Candle] {
        Self::slice_as_of(&self.scalping, self.timestamp)
    }

    fn slice_as_of(candles: &[Candle], timestamp: i64) -> &[Candle] {
        match as_of_index(candles, timestamp) {
            Some(idx) => &candles[..=idx],
            None => &[],
        }
    }
}
