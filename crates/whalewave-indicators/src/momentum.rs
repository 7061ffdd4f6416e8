//! Momentum oscillators.

use serde::{Deserialize, Serialize};
use whalewave_core::traits::{CandleIndicator, Indicator};
use whalewave_core::types::{Candle, CandleColumns};

use crate::smoothing::{ema, rolling_max, rolling_min, sma, sma_from, wilder_from};

/// Relative Strength Index (RSI).
///
/// Wilder-smoothed average gain over average loss. The first value appears at
/// index `period`; earlier entries are 0. A window with no losses reads 100.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    /// Common periods are 14 (default) or 9.
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for Rsi {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        let mut result = vec![0.0; data.len()];
        if self.period == 0 || data.len() <= self.period {
            return result;
        }

        let mut gains = vec![0.0; data.len()];
        let mut losses = vec![0.0; data.len()];
        for i in 1..data.len() {
            let change = data[i] - data[i - 1];
            if change > 0.0 {
                gains[i] = change;
            } else {
                losses[i] = -change;
            }
        }

        let avg_gains = wilder_from(&gains, 1, self.period);
        let avg_losses = wilder_from(&losses, 1, self.period);

        for i in self.period..data.len() {
            let (gain, loss) = (avg_gains[i], avg_losses[i]);
            result[i] = if loss == 0.0 {
                100.0
            } else {
                100.0 - (100.0 / (1.0 + gain / loss))
            };
        }

        result
    }

    fn period(&self) -> usize {
        self.period + 1
    }

    fn name(&self) -> &str {
        "RSI"
    }
}

/// MACD output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacdOutput {
    /// Fast EMA - slow EMA
    pub macd: f64,
    /// EMA of the MACD line
    pub signal: f64,
    /// MACD - signal
    pub histogram: f64,
}

/// Moving Average Convergence Divergence.
#[derive(Debug, Clone)]
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Macd {
    /// MACD with default parameters (12, 26, 9).
    pub fn new() -> Self {
        Self::with_periods(12, 26, 9)
    }

    pub fn with_periods(fast: usize, slow: usize, signal: usize) -> Self {
        Self {
            fast_period: fast,
            slow_period: slow,
            signal_period: signal,
        }
    }
}

impl Default for Macd {
    fn default() -> Self {
        Self::new()
    }
}

impl Indicator for Macd {
    type Output = MacdOutput;

    fn calculate(&self, data: &[f64]) -> Vec<MacdOutput> {
        let fast = ema(data, self.fast_period);
        let slow = ema(data, self.slow_period);
        let macd_line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal_line = ema(&macd_line, self.signal_period);

        macd_line
            .iter()
            .zip(&signal_line)
            .map(|(&macd, &signal)| MacdOutput {
                macd,
                signal,
                histogram: macd - signal,
            })
            .collect()
    }

    fn period(&self) -> usize {
        self.slow_period + self.signal_period
    }

    fn name(&self) -> &str {
        "MACD"
    }
}

/// Stochastic oscillator output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StochasticOutput {
    /// Smoothed %K
    pub k: f64,
    /// %D (SMA of %K)
    pub d: f64,
}

/// Stochastic oscillator.
///
/// Raw %K is the close's position inside the `k_period` high-low range
/// (50 on a flat range), smoothed by an SMA; %D is an SMA of %K.
#[derive(Debug, Clone)]
pub struct Stochastic {
    k_period: usize,
    smooth_period: usize,
    d_period: usize,
}

impl Stochastic {
    /// Defaults (14, 3, 3).
    pub fn new() -> Self {
        Self::with_periods(14, 3, 3)
    }

    pub fn with_periods(k_period: usize, smooth_period: usize, d_period: usize) -> Self {
        Self {
            k_period,
            smooth_period,
            d_period,
        }
    }
}

impl Default for Stochastic {
    fn default() -> Self {
        Self::new()
    }
}

impl CandleIndicator for Stochastic {
    type Output = StochasticOutput;

    fn compute(&self, candles: &[Candle]) -> Vec<StochasticOutput> {
        let n = candles.len();
        if self.k_period == 0 || n < self.k_period {
            return vec![StochasticOutput::default(); n];
        }

        let highest = rolling_max(&candles.highs(), self.k_period);
        let lowest = rolling_min(&candles.lows(), self.k_period);

        let mut raw = vec![0.0; n];
        for i in (self.k_period - 1)..n {
            let range = highest[i] - lowest[i];
            raw[i] = if range == 0.0 {
                50.0
            } else {
                100.0 * (candles[i].close - lowest[i]) / range
            };
        }

        let k_start = self.k_period - 1;
        let k = sma_from(&raw, k_start, self.smooth_period);
        let d = sma_from(&k, k_start + self.smooth_period.saturating_sub(1), self.d_period);

        k.iter()
            .zip(&d)
            .map(|(&k, &d)| StochasticOutput { k, d })
            .collect()
    }

    fn period(&self) -> usize {
        (self.k_period + self.smooth_period + self.d_period).saturating_sub(2)
    }

    fn name(&self) -> &str {
        "Stochastic"
    }
}

/// Commodity Channel Index.
///
/// Reads 0 when the window's mean absolute deviation is 0.
#[derive(Debug, Clone)]
pub struct Cci {
    period: usize,
}

impl Cci {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl CandleIndicator for Cci {
    type Output = f64;

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let mut result = vec![0.0; candles.len()];
        if self.period == 0 || candles.len() < self.period {
            return result;
        }

        let typical = candles.typical_prices();
        let mean = sma(&typical, self.period);

        for i in (self.period - 1)..candles.len() {
            let window = &typical[i + 1 - self.period..=i];
            let mean_dev =
                window.iter().map(|tp| (tp - mean[i]).abs()).sum::<f64>() / self.period as f64;
            if mean_dev != 0.0 {
                result[i] = (typical[i] - mean[i]) / (0.015 * mean_dev);
            }
        }

        result
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "CCI"
    }
}

/// Money Flow Index.
///
/// Ratio of positive to negative typical-price money flow over the window;
/// 100 when there is no negative flow. First value at index `period`.
#[derive(Debug, Clone)]
pub struct Mfi {
    period: usize,
}

impl Mfi {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl CandleIndicator for Mfi {
    type Output = f64;

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let n = candles.len();
        let mut result = vec![0.0; n];
        if self.period == 0 || n <= self.period {
            return result;
        }

        let typical = candles.typical_prices();
        let mut positive = vec![0.0; n];
        let mut negative = vec![0.0; n];
        for i in 1..n {
            let flow = typical[i] * candles[i].volume;
            if typical[i] > typical[i - 1] {
                positive[i] = flow;
            } else if typical[i] < typical[i - 1] {
                negative[i] = flow;
            }
        }

        for i in self.period..n {
            let window = (i + 1 - self.period)..=i;
            let pos: f64 = positive[window.clone()].iter().sum();
            let neg: f64 = negative[window].iter().sum();
            result[i] = if neg == 0.0 {
                100.0
            } else {
                100.0 - 100.0 / (1.0 + pos / neg)
            };
        }

        result
    }

    fn period(&self) -> usize {
        self.period + 1
    }

    fn name(&self) -> &str {
        "MFI"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle::new(i as i64, c, c + 1.0, c - 1.0, c, 100.0))
            .collect()
    }

    #[test]
    fn test_rsi_all_gains() {
        let data: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let result = Rsi::new(14).calculate(&data);

        assert_eq!(result.len(), 20);
        assert_eq!(result[13], 0.0);
        assert!((result[14] - 100.0).abs() < 1e-10);
        assert!((result[19] - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_rsi_all_losses() {
        let data: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        let result = Rsi::new(14).calculate(&data);

        assert!(result[14].abs() < 1e-10);
    }

    #[test]
    fn test_rsi_bounds() {
        let data: Vec<f64> = (0..60)
            .map(|i| 100.0 + (i as f64 * 0.5).sin() * 5.0)
            .collect();
        for rsi in Rsi::new(14).calculate(&data) {
            assert!((0.0..=100.0).contains(&rsi));
        }
    }

    #[test]
    fn test_rsi_short_input() {
        assert_eq!(Rsi::new(14).calculate(&[1.0, 2.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_macd_uptrend_positive() {
        let data: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
        let result = Macd::new().calculate(&data);

        assert_eq!(result.len(), 50);
        assert_eq!(result[0].macd, 0.0);
        assert!(result[49].macd > 0.0);
        assert!((result[49].histogram - (result[49].macd - result[49].signal)).abs() < 1e-12);
    }

    #[test]
    fn test_stochastic_flat_range_is_fifty() {
        let candles: Vec<Candle> = (0..20)
            .map(|i| Candle::new(i, 10.0, 10.0, 10.0, 10.0, 1.0))
            .collect();
        let result = Stochastic::with_periods(5, 3, 3).compute(&candles);

        assert_eq!(result[5].k, 0.0);
        assert!((result[6].k - 50.0).abs() < 1e-10);
        assert!((result[8].d - 50.0).abs() < 1e-10);
    }

    #[test]
    fn test_stochastic_close_at_high() {
        let candles: Vec<Candle> = (0..20)
            .map(|i| {
                let c = 100.0 + i as f64;
                Candle::new(i, c - 0.5, c, c - 1.0, c, 1.0)
            })
            .collect();
        let result = Stochastic::with_periods(5, 1, 1).compute(&candles);

        assert!((result[10].k - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_cci_zero_deviation() {
        let candles = candles_from_closes(&[50.0; 30]);
        let result = Cci::new(20).compute(&candles);
        assert!(result.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_cci_rising_is_positive() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let result = Cci::new(20).compute(&candles_from_closes(&closes));
        assert!(result[29] > 0.0);
    }

    #[test]
    fn test_mfi_no_negative_flow() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let result = Mfi::new(14).compute(&candles_from_closes(&closes));

        assert_eq!(result[13], 0.0);
        assert!((result[14] - 100.0).abs() < 1e-10);
    }
}
