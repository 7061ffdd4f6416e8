//! Price-action patterns: fair-value gaps, RSI divergence, pivot levels.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use whalewave_core::traits::{CandleIndicator, Indicator};
use whalewave_core::types::{Candle, CandleColumns};

use crate::momentum::Rsi;

/// Polarity of a fair-value gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GapKind {
    Bullish,
    Bearish,
}

impl GapKind {
    pub fn sign(&self) -> i8 {
        match self {
            GapKind::Bullish => 1,
            GapKind::Bearish => -1,
        }
    }
}

/// Three-candle imbalance zone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FairValueGap {
    /// Index of the third candle, where the gap is confirmed
    pub index: usize,
    pub kind: GapKind,
    pub bottom: f64,
    pub top: f64,
    /// A later candle traded back through the far edge
    pub filled: bool,
}

impl FairValueGap {
    pub fn contains(&self, price: f64) -> bool {
        price >= self.bottom && price <= self.top
    }
}

/// Fair-value gap detector.
///
/// For candles (a, b, c): bullish when `c.low > a.high` and b closes up,
/// bearish when `c.high < a.low` and b closes down.
#[derive(Debug, Clone, Default)]
pub struct FairValueGaps;

impl FairValueGaps {
    pub fn new() -> Self {
        Self
    }

    /// Every gap in the series, in formation order, with its fill state.
    pub fn detect(&self, candles: &[Candle]) -> Vec<FairValueGap> {
        let mut gaps = Vec::new();
        for i in 2..candles.len() {
            let (a, b, c) = (&candles[i - 2], &candles[i - 1], &candles[i]);
            let gap = if c.low > a.high && b.is_bullish() {
                Some((GapKind::Bullish, a.high, c.low))
            } else if c.high < a.low && b.is_bearish() {
                Some((GapKind::Bearish, c.high, a.low))
            } else {
                None
            };

            if let Some((kind, bottom, top)) = gap {
                let later = &candles[i + 1..];
                let filled = match kind {
                    GapKind::Bullish => later.iter().any(|k| k.low <= bottom),
                    GapKind::Bearish => later.iter().any(|k| k.high >= top),
                };
                gaps.push(FairValueGap {
                    index: i,
                    kind,
                    bottom,
                    top,
                    filled,
                });
            }
        }
        gaps
    }

    /// Most recent gap that has not been filled.
    pub fn active(&self, candles: &[Candle]) -> Option<FairValueGap> {
        self.detect(candles).into_iter().rev().find(|g| !g.filled)
    }
}

impl CandleIndicator for FairValueGaps {
    /// +1 / -1 at the index a bullish / bearish gap forms, else 0.
    type Output = i8;

    fn compute(&self, candles: &[Candle]) -> Vec<i8> {
        let mut result = vec![0; candles.len()];
        for gap in self.detect(candles) {
            result[gap.index] = gap.kind.sign();
        }
        result
    }

    fn period(&self) -> usize {
        3
    }

    fn name(&self) -> &str {
        "FVG"
    }
}

/// Regular RSI divergence over a lookback window.
///
/// The window is split into an older and a newer half. Bullish (+1) when the
/// newer half's lowest low undercuts the older one while RSI at that low is
/// higher; bearish (-1) mirrors this on highs. Both at once cancel to 0.
#[derive(Debug, Clone)]
pub struct Divergence {
    rsi_period: usize,
    lookback: usize,
}

impl Divergence {
    pub fn new(rsi_period: usize, lookback: usize) -> Self {
        Self {
            rsi_period,
            lookback,
        }
    }

    /// Divergence against a precomputed RSI series.
    pub fn from_rsi(candles: &[Candle], rsi: &[f64], lookback: usize) -> Vec<i8> {
        let n = candles.len().min(rsi.len());
        let mut result = vec![0; candles.len()];
        if lookback < 4 || n < lookback {
            return result;
        }

        let half = lookback / 2;
        for i in (lookback - 1)..n {
            let start = i + 1 - lookback;
            let older = start..start + half;
            let newer = start + half..=i;

            let older_low = extreme_index(candles, older.clone(), |c| c.low, |a, b| a < b);
            let newer_low = extreme_index(candles, newer.clone(), |c| c.low, |a, b| a < b);
            let older_high = extreme_index(candles, older, |c| c.high, |a, b| a > b);
            let newer_high = extreme_index(candles, newer, |c| c.high, |a, b| a > b);

            let warm = |j: usize| rsi[j] > 0.0;

            let bullish = warm(older_low)
                && warm(newer_low)
                && candles[newer_low].low < candles[older_low].low
                && rsi[newer_low] > rsi[older_low];
            let bearish = warm(older_high)
                && warm(newer_high)
                && candles[newer_high].high > candles[older_high].high
                && rsi[newer_high] < rsi[older_high];

            result[i] = match (bullish, bearish) {
                (true, false) => 1,
                (false, true) => -1,
                _ => 0,
            };
        }

        result
    }
}

fn extreme_index(
    candles: &[Candle],
    range: impl Iterator<Item = usize>,
    value: fn(&Candle) -> f64,
    better: fn(f64, f64) -> bool,
) -> usize {
    range
        .reduce(|best, j| {
            if better(value(&candles[j]), value(&candles[best])) {
                j
            } else {
                best
            }
        })
        .unwrap_or(0)
}

impl CandleIndicator for Divergence {
    type Output = i8;

    fn compute(&self, candles: &[Candle]) -> Vec<i8> {
        let rsi = Rsi::new(self.rsi_period).calculate(&candles.closes());
        Self::from_rsi(candles, &rsi, self.lookback)
    }

    fn period(&self) -> usize {
        self.lookback.max(self.rsi_period + 1)
    }

    fn name(&self) -> &str {
        "Divergence"
    }
}

/// Fibonacci pivot levels from a prior period's high, low and close.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PivotLevels {
    pub pivot: f64,
    pub r1: f64,
    pub r2: f64,
    pub r3: f64,
    pub s1: f64,
    pub s2: f64,
    pub s3: f64,
}

impl PivotLevels {
    /// P = (H + L + C) / 3, levels at 0.382, 0.618 and 1.0 of the range.
    pub fn fibonacci(high: f64, low: f64, close: f64) -> Self {
        let pivot = (high + low + close) / 3.0;
        let range = high - low;
        Self {
            pivot,
            r1: pivot + 0.382 * range,
            r2: pivot + 0.618 * range,
            r3: pivot + range,
            s1: pivot - 0.382 * range,
            s2: pivot - 0.618 * range,
            s3: pivot - range,
        }
    }

    /// Levels keyed by name.
    pub fn to_map(&self) -> BTreeMap<String, f64> {
        [
            ("P", self.pivot),
            ("R1", self.r1),
            ("R2", self.r2),
            ("R3", self.r3),
            ("S1", self.s1),
            ("S2", self.s2),
            ("S3", self.s3),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(i: i64, open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle::new(i, open, high, low, close, 1.0)
    }

    #[test]
    fn test_bullish_gap_detected() {
        let candles = vec![
            c(0, 100.0, 101.0, 99.0, 100.5),
            c(1, 100.5, 105.0, 100.4, 104.5),
            c(2, 104.5, 106.0, 102.0, 105.5),
        ];
        let gaps = FairValueGaps::new().detect(&candles);

        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].kind, GapKind::Bullish);
        assert_eq!((gaps[0].bottom, gaps[0].top), (101.0, 102.0));
        assert!(!gaps[0].filled);
        assert!(gaps[0].contains(101.5));
        assert_eq!(FairValueGaps::new().compute(&candles), vec![0, 0, 1]);
    }

    #[test]
    fn test_gap_needs_matching_middle_body() {
        let candles = vec![
            c(0, 100.0, 101.0, 99.0, 100.5),
            // bearish middle candle cannot confirm a bullish gap
            c(1, 104.5, 105.0, 100.4, 100.6),
            c(2, 104.5, 106.0, 102.0, 105.5),
        ];
        assert!(FairValueGaps::new().detect(&candles).is_empty());
    }

    #[test]
    fn test_bearish_gap_filled_later() {
        let candles = vec![
            c(0, 100.0, 101.0, 99.0, 99.5),
            c(1, 99.5, 99.6, 94.0, 94.5),
            c(2, 94.5, 97.0, 93.0, 95.0),
            c(3, 95.0, 99.5, 94.0, 99.0),
        ];
        let gaps = FairValueGaps::new().detect(&candles);

        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].kind, GapKind::Bearish);
        assert!(gaps[0].filled);
        assert!(FairValueGaps::new().active(&candles).is_none());
    }

    #[test]
    fn test_bullish_divergence() {
        // Lower low in the newer half with a stronger RSI reading there
        let candles: Vec<Candle> = (0..8)
            .map(|i| {
                let low = if i == 1 { 90.0 } else if i == 6 { 89.0 } else { 95.0 };
                c(i, 96.0, 98.0, low, 96.0)
            })
            .collect();
        let rsi = vec![30.0, 20.0, 30.0, 30.0, 30.0, 30.0, 35.0, 30.0];
        let result = Divergence::from_rsi(&candles, &rsi, 8);

        assert_eq!(result[7], 1);
        assert!(result[..7].iter().all(|v| *v == 0));
    }

    #[test]
    fn test_bearish_divergence() {
        let candles: Vec<Candle> = (0..8)
            .map(|i| {
                let high = if i == 2 { 110.0 } else if i == 5 { 111.0 } else { 100.0 };
                c(i, 99.0, high, 98.0, 99.0)
            })
            .collect();
        let rsi = vec![60.0, 60.0, 80.0, 60.0, 60.0, 70.0, 60.0, 60.0];
        assert_eq!(Divergence::from_rsi(&candles, &rsi, 8)[7], -1);
    }

    #[test]
    fn test_divergence_ignores_warmup_rsi() {
        let candles: Vec<Candle> = (0..8)
            .map(|i| c(i, 96.0, 98.0, if i == 6 { 89.0 } else { 95.0 }, 96.0))
            .collect();
        let rsi = vec![0.0; 8];
        assert_eq!(Divergence::from_rsi(&candles, &rsi, 8)[7], 0);
    }

    #[test]
    fn test_fibonacci_pivots() {
        let levels = PivotLevels::fibonacci(110.0, 90.0, 100.0);

        assert!((levels.pivot - 100.0).abs() < 1e-10);
        assert!((levels.r1 - 107.64).abs() < 1e-10);
        assert!((levels.s2 - 87.64).abs() < 1e-10);
        assert!((levels.r3 - 120.0).abs() < 1e-10);
        assert_eq!(levels.to_map().len(), 7);
    }
}
