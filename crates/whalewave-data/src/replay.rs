//! Offline replay of historical candles as a [`DataProvider`].

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, info};
use whalewave_core::error::DataError;
use whalewave_core::traits::DataProvider;
use whalewave_core::types::{Candle, DailyLevels, MarketSnapshot, OrderBook, Timeframe};

/// Default number of candles handed out per series each cycle.
pub const DEFAULT_LOOKBACK: usize = 500;

/// A candle series and its interval.
#[derive(Debug, Clone)]
pub struct ReplaySeries {
    pub timeframe: Timeframe,
    pub candles: Vec<Candle>,
}

impl ReplaySeries {
    pub fn new(timeframe: Timeframe, candles: Vec<Candle>) -> Self {
        Self { timeframe, candles }
    }

    /// Candles fully closed by `at` (Unix ms).
    fn completed_by(&self, at: i64) -> usize {
        let span = self.timeframe.as_millis();
        self.candles.partition_point(|c| c.timestamp + span <= at)
    }
}

/// Steps through the primary series one closed candle at a time.
///
/// Each snapshot is taken at the close of the current primary candle and
/// only includes candles of every series that had closed by then, so no
/// cycle ever sees a still-forming higher timeframe bar. Replay has no
/// order book; walls are therefore empty.
pub struct ReplayProvider {
    symbol: String,
    primary: ReplaySeries,
    trend: ReplaySeries,
    scalping: ReplaySeries,
    lookback: usize,
    cursor: usize,
    daily: BTreeMap<NaiveDate, DailyLevels>,
}

impl ReplayProvider {
    pub fn new(
        symbol: impl Into<String>,
        primary: ReplaySeries,
        trend: ReplaySeries,
        scalping: ReplaySeries,
    ) -> Self {
        let daily = daily_levels(&primary.candles);
        Self {
            symbol: symbol.into(),
            primary,
            trend,
            scalping,
            lookback: DEFAULT_LOOKBACK,
            cursor: 0,
            daily,
        }
    }

    /// Cap the candles per series in each snapshot.
    pub fn with_lookback(mut self, lookback: usize) -> Self {
        self.lookback = lookback.max(1);
        self
    }

    /// Advance to the first cycle where primary and scalping carry
    /// `min_candles` closed candles and the trend series has at least one.
    pub fn skip_warmup(mut self, min_candles: usize) -> Self {
        self.lookback = self.lookback.max(min_candles);
        let start = (0..self.primary.candles.len()).find(|&i| {
            let at = self.close_time(i);
            self.primary.completed_by(at) >= min_candles
                && self.scalping.completed_by(at) >= min_candles
                && self.trend.completed_by(at) >= 1
        });
        self.cursor = start.unwrap_or(self.primary.candles.len());
        info!(
            "Replay for {} starts at candle {} of {}",
            self.symbol,
            self.cursor,
            self.primary.candles.len()
        );
        self
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Snapshots left before exhaustion.
    pub fn remaining(&self) -> usize {
        self.primary.candles.len().saturating_sub(self.cursor)
    }

    fn close_time(&self, index: usize) -> i64 {
        self.primary.candles[index].timestamp + self.primary.timeframe.as_millis()
    }

    fn window(&self, series: &ReplaySeries, at: i64) -> Vec<Candle> {
        let end = series.completed_by(at);
        let start = end.saturating_sub(self.lookback);
        series.candles[start..end].to_vec()
    }

    /// Snapshot at the close of primary candle `index`, if it exists.
    pub fn snapshot_at(&self, index: usize) -> Option<MarketSnapshot> {
        let current = self.primary.candles.get(index)?;
        let at = self.close_time(index);

        let prior_day = current
            .datetime()
            .date_naive()
            .pred_opt()
            .and_then(|day| self.daily.get(&day).copied())
            .unwrap_or_default();

        Some(MarketSnapshot {
            symbol: self.symbol.clone(),
            timestamp: at,
            primary: self.window(&self.primary, at),
            trend: self.window(&self.trend, at),
            scalping: self.window(&self.scalping, at),
            order_book: OrderBook::default(),
            last_price: current.close,
            prior_day,
        })
    }

    /// Snapshot at the close of the last primary candle.
    pub fn latest_snapshot(&self) -> Option<MarketSnapshot> {
        self.primary
            .candles
            .len()
            .checked_sub(1)
            .and_then(|index| self.snapshot_at(index))
    }
}

#[async_trait]
impl DataProvider for ReplayProvider {
    async fn fetch_snapshot(&mut self, symbol: &str) -> Result<MarketSnapshot, DataError> {
        if symbol != self.symbol {
            return Err(DataError::SymbolNotFound(symbol.to_string()));
        }

        let snapshot = self.snapshot_at(self.cursor).ok_or(DataError::Exhausted)?;
        self.cursor += 1;
        debug!(
            "Replay snapshot {} at {} ({} left)",
            self.cursor,
            snapshot.timestamp,
            self.remaining()
        );
        Ok(snapshot)
    }

    fn name(&self) -> &str {
        "replay"
    }
}

/// Per-UTC-day high, low and last close of a candle series.
fn daily_levels(candles: &[Candle]) -> BTreeMap<NaiveDate, DailyLevels> {
    let mut days: BTreeMap<NaiveDate, DailyLevels> = BTreeMap::new();
    for candle in candles {
        let day = candle.datetime().date_naive();
        days.entry(day)
            .and_modify(|level| {
                level.high = level.high.max(candle.high);
                level.low = level.low.min(candle.low);
                level.close = candle.close;
            })
            .or_insert(DailyLevels {
                high: candle.high,
                low: candle.low,
                close: candle.close,
            });
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: i64 = 60_000;
    const HOUR: i64 = 60 * MINUTE;

    fn series(timeframe: Timeframe, count: i64) -> ReplaySeries {
        let step = timeframe.as_millis();
        let candles = (0..count)
            .map(|i| {
                let base = 100.0 + i as f64;
                Candle::new(i * step, base, base + 2.0, base - 1.0, base + 1.0, 10.0)
            })
            .collect();
        ReplaySeries::new(timeframe, candles)
    }

    fn provider() -> ReplayProvider {
        ReplayProvider::new(
            "BTCUSDT",
            series(Timeframe::Minute15, 200),
            series(Timeframe::Hour1, 50),
            series(Timeframe::Minute5, 600),
        )
    }

    #[test]
    fn test_snapshot_only_contains_closed_candles() {
        let provider = provider();
        let snap = provider.snapshot_at(7).unwrap();

        // Close of the eighth 15m candle is 2h
        assert_eq!(snap.timestamp, 2 * HOUR);
        assert_eq!(snap.primary.len(), 8);
        assert_eq!(snap.trend.len(), 2);
        assert_eq!(snap.scalping.len(), 24);
        assert_eq!(snap.last_price, 108.0);
        assert!(snap.validate(8).is_ok());
    }

    #[test]
    fn test_lookback_limits_windows() {
        let provider = provider().with_lookback(10);
        let snap = provider.snapshot_at(50).unwrap();
        assert_eq!(snap.primary.len(), 10);
        assert_eq!(snap.scalping.len(), 10);
        assert_eq!(snap.primary.last().unwrap().timestamp, 50 * 15 * MINUTE);
    }

    #[test]
    fn test_skip_warmup() {
        let provider = provider().skip_warmup(20);
        // Needs 20 closed 15m candles and at least one closed hour
        assert_eq!(provider.remaining(), 181);
        let snap = provider.snapshot_at(19).unwrap();
        assert!(snap.validate(20).is_ok());
    }

    #[test]
    fn test_prior_day_levels() {
        // Two days of hourly primary candles
        let provider = ReplayProvider::new(
            "BTCUSDT",
            series(Timeframe::Hour1, 48),
            series(Timeframe::Hour4, 12),
            series(Timeframe::Minute15, 192),
        );

        assert!(!provider.snapshot_at(5).unwrap().prior_day.is_available());

        let levels = provider.snapshot_at(30).unwrap().prior_day;
        assert_eq!(levels.high, 125.0);
        assert_eq!(levels.low, 99.0);
        assert_eq!(levels.close, 124.0);
    }

    #[test]
    fn test_latest_snapshot() {
        let snap = provider().latest_snapshot().unwrap();
        assert_eq!(snap.timestamp, 200 * 15 * MINUTE);
        assert_eq!(snap.last_price, 300.0);
    }

    #[tokio::test]
    async fn test_fetch_until_exhausted() {
        let mut provider = ReplayProvider::new(
            "ETHUSDT",
            series(Timeframe::Minute15, 3),
            series(Timeframe::Hour1, 1),
            series(Timeframe::Minute5, 9),
        );

        assert!(matches!(
            provider.fetch_snapshot("BTCUSDT").await,
            Err(DataError::SymbolNotFound(_))
        ));
        for _ in 0..3 {
            assert!(provider.fetch_snapshot("ETHUSDT").await.is_ok());
        }
        assert!(matches!(
            provider.fetch_snapshot("ETHUSDT").await,
            Err(DataError::Exhausted)
        ));
    }
}
