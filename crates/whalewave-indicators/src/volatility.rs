//! Volatility indicators and bands.

use serde::{Deserialize, Serialize};
use whalewave_core::traits::{CandleIndicator, Indicator};
use whalewave_core::types::{Candle, CandleColumns};

use crate::simd::{rolling_std_dev_simd, sum_simd, sum_sq_dev_simd};
use crate::smoothing::{ema, sma, wilder};

/// Average True Range.
///
/// Wilder-smoothed true range; the first candle's true range is its own
/// high-low span. First value at index `period - 1`.
#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
}

impl Atr {
    /// Common period is 14.
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl CandleIndicator for Atr {
    type Output = f64;

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        wilder(&candles.true_ranges(), self.period)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "ATR"
    }
}

/// Bollinger Bands output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BollingerOutput {
    pub upper: f64,
    /// SMA
    pub middle: f64,
    pub lower: f64,
    /// (upper - lower) / middle
    pub bandwidth: f64,
    /// (price - lower) / (upper - lower)
    pub percent_b: f64,
}

/// Bollinger Bands: SMA +/- k population standard deviations.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    period: usize,
    std_dev_multiplier: f64,
}

impl BollingerBands {
    /// Default parameters (20, 2.0).
    pub fn new() -> Self {
        Self::with_params(20, 2.0)
    }

    pub fn with_params(period: usize, std_dev_multiplier: f64) -> Self {
        Self {
            period,
            std_dev_multiplier,
        }
    }
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self::new()
    }
}

impl Indicator for BollingerBands {
    type Output = BollingerOutput;

    fn calculate(&self, data: &[f64]) -> Vec<BollingerOutput> {
        let mut result = vec![BollingerOutput::default(); data.len()];
        if self.period == 0 || data.len() < self.period {
            return result;
        }

        let middle = sma(data, self.period);
        let std_dev = rolling_std_dev_simd(data, self.period);

        for i in (self.period - 1)..data.len() {
            let width = self.std_dev_multiplier * std_dev[i];
            let upper = middle[i] + width;
            let lower = middle[i] - width;
            let bandwidth = if middle[i] != 0.0 {
                (upper - lower) / middle[i]
            } else {
                0.0
            };
            let percent_b = if upper > lower {
                (data[i] - lower) / (upper - lower)
            } else {
                0.5
            };
            result[i] = BollingerOutput {
                upper,
                middle: middle[i],
                lower,
                bandwidth,
                percent_b,
            };
        }

        result
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "BollingerBands"
    }
}

/// Keltner Channel output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KeltnerOutput {
    pub upper: f64,
    /// EMA
    pub middle: f64,
    pub lower: f64,
}

/// Keltner Channel: EMA +/- multiplier x ATR, both over `period`.
#[derive(Debug, Clone)]
pub struct KeltnerChannel {
    period: usize,
    atr_multiplier: f64,
}

impl KeltnerChannel {
    /// Default parameters (20, 1.5).
    pub fn new() -> Self {
        Self::with_params(20, 1.5)
    }

    pub fn with_params(period: usize, atr_multiplier: f64) -> Self {
        Self {
            period,
            atr_multiplier,
        }
    }
}

impl Default for KeltnerChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl CandleIndicator for KeltnerChannel {
    type Output = KeltnerOutput;

    fn compute(&self, candles: &[Candle]) -> Vec<KeltnerOutput> {
        let mut result = vec![KeltnerOutput::default(); candles.len()];
        if self.period == 0 || candles.len() < self.period {
            return result;
        }

        let middle = ema(&candles.closes(), self.period);
        let atr = Atr::new(self.period).compute(candles);

        for i in (self.period - 1)..candles.len() {
            let width = self.atr_multiplier * atr[i];
            result[i] = KeltnerOutput {
                upper: middle[i] + width,
                middle: middle[i],
                lower: middle[i] - width,
            };
        }

        result
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "KeltnerChannel"
    }
}

/// Squeeze: Bollinger Bands strictly inside the Keltner Channel.
#[derive(Debug, Clone, Default)]
pub struct Squeeze {
    bollinger: BollingerBands,
    keltner: KeltnerChannel,
}

impl Squeeze {
    pub fn new(bollinger: BollingerBands, keltner: KeltnerChannel) -> Self {
        Self { bollinger, keltner }
    }

    /// Flag each index from precomputed bands.
    ///
    /// Indices before `warmup` are never in a squeeze.
    pub fn from_bands(
        bollinger: &[BollingerOutput],
        keltner: &[KeltnerOutput],
        warmup: usize,
    ) -> Vec<bool> {
        bollinger
            .iter()
            .zip(keltner)
            .enumerate()
            .map(|(i, (bb, kc))| i >= warmup && bb.upper < kc.upper && bb.lower > kc.lower)
            .collect()
    }
}

impl CandleIndicator for Squeeze {
    type Output = bool;

    fn compute(&self, candles: &[Candle]) -> Vec<bool> {
        let bb = self.bollinger.calculate(&candles.closes());
        let kc = self.keltner.compute(candles);
        Self::from_bands(&bb, &kc, self.period().saturating_sub(1))
    }

    fn period(&self) -> usize {
        Indicator::period(&self.bollinger).max(CandleIndicator::period(&self.keltner))
    }

    fn name(&self) -> &str {
        "Squeeze"
    }
}

/// Historical volatility: sample stdev of log returns, annualized.
///
/// First value at index `period`; needs `period >= 2`.
#[derive(Debug, Clone)]
pub struct HistoricalVolatility {
    period: usize,
    periods_per_year: f64,
}

impl HistoricalVolatility {
    pub fn new(period: usize, periods_per_year: f64) -> Self {
        Self {
            period,
            periods_per_year,
        }
    }
}

impl Indicator for HistoricalVolatility {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        let mut result = vec![0.0; data.len()];
        if self.period < 2 || data.len() <= self.period {
            return result;
        }

        let mut returns = vec![0.0; data.len()];
        for i in 1..data.len() {
            if data[i] > 0.0 && data[i - 1] > 0.0 {
                returns[i] = (data[i] / data[i - 1]).ln();
            }
        }

        let period_f64 = self.period as f64;
        let annualizer = self.periods_per_year.max(0.0).sqrt();
        for i in self.period..data.len() {
            let window = &returns[i + 1 - self.period..=i];
            let mean = sum_simd(window) / period_f64;
            let variance = sum_sq_dev_simd(window, mean) / (period_f64 - 1.0);
            result[i] = variance.sqrt() * annualizer;
        }

        result
    }

    fn period(&self) -> usize {
        self.period + 1
    }

    fn name(&self) -> &str {
        "HistoricalVolatility"
    }
}
