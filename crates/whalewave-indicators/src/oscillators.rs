//! Higher-order oscillators: Ehlers Fisher, Laguerre RSI, Ichimoku.

use serde::{Deserialize, Serialize};
use whalewave_core::traits::{CandleIndicator, Indicator};
use whalewave_core::types::{Candle, CandleColumns};

use crate::smoothing::{rolling_max, rolling_min};

/// Fisher transform output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FisherOutput {
    pub fisher: f64,
    /// Previous bar's fisher value
    pub trigger: f64,
}

/// Ehlers Fisher Transform over the HL2 mid price.
#[derive(Debug, Clone)]
pub struct FisherTransform {
    period: usize,
}

impl FisherTransform {
    /// Common period is 10.
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl CandleIndicator for FisherTransform {
    type Output = FisherOutput;

    fn compute(&self, candles: &[Candle]) -> Vec<FisherOutput> {
        let n = candles.len();
        let mut result = vec![FisherOutput::default(); n];
        if self.period == 0 || n < self.period {
            return result;
        }

        let mid = candles.hl2s();
        let highest = rolling_max(&mid, self.period);
        let lowest = rolling_min(&mid, self.period);

        let mut value = 0.0_f64;
        let mut fisher = 0.0_f64;
        for i in (self.period - 1)..n {
            let range = highest[i] - lowest[i];
            let normalized = if range > 0.0 {
                (mid[i] - lowest[i]) / range - 0.5
            } else {
                0.0
            };
            value = (0.33 * 2.0 * normalized + 0.67 * value).clamp(-0.999, 0.999);

            let trigger = fisher;
            fisher = 0.5 * ((1.0 + value) / (1.0 - value)).ln() + 0.5 * fisher;
            result[i] = FisherOutput { fisher, trigger };
        }

        result
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "Fisher"
    }
}

/// Laguerre RSI: four-stage Laguerre filter with damping `gamma`.
///
/// Output is in [0, 100]. A bar where the filter stages are all equal carries
/// the previous value forward, starting from 50.
#[derive(Debug, Clone)]
pub struct LaguerreRsi {
    gamma: f64,
}

impl LaguerreRsi {
    /// Common gamma is 0.5.
    pub fn new(gamma: f64) -> Self {
        Self {
            gamma: gamma.clamp(0.0, 1.0),
        }
    }
}

impl Indicator for LaguerreRsi {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        let mut result = Vec::with_capacity(data.len());
        let Some(&seed) = data.first() else {
            return result;
        };

        let g = self.gamma;
        let (mut l0, mut l1, mut l2, mut l3) = (seed, seed, seed, seed);
        let mut last = 50.0;

        for &price in data {
            let (p0, p1, p2, p3) = (l0, l1, l2, l3);
            l0 = (1.0 - g) * price + g * p0;
            l1 = -g * l0 + p0 + g * p1;
            l2 = -g * l1 + p1 + g * p2;
            l3 = -g * l2 + p2 + g * p3;

            let (mut up, mut down) = (0.0, 0.0);
            for diff in [l0 - l1, l1 - l2, l2 - l3] {
                if diff > 0.0 {
                    up += diff;
                } else {
                    down -= diff;
                }
            }

            if up + down > 0.0 {
                last = 100.0 * up / (up + down);
            }
            result.push(last);
        }

        result
    }

    fn period(&self) -> usize {
        4
    }

    fn name(&self) -> &str {
        "LaguerreRSI"
    }
}

/// Ichimoku lines at each bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IchimokuOutput {
    pub tenkan: f64,
    pub kijun: f64,
    /// Projected forward by the kijun period
    pub senkou_a: f64,
    /// Projected forward by the kijun period
    pub senkou_b: f64,
    /// Close from kijun bars later; 0 where that bar does not exist yet
    pub chikou: f64,
}

/// Ichimoku Kinko Hyo.
#[derive(Debug, Clone)]
pub struct Ichimoku {
    tenkan: usize,
    kijun: usize,
    senkou_b: usize,
}

impl Ichimoku {
    /// Default parameters (9, 26, 52).
    pub fn new() -> Self {
        Self::with_periods(9, 26, 52)
    }

    pub fn with_periods(tenkan: usize, kijun: usize, senkou_b: usize) -> Self {
        Self {
            tenkan,
            kijun,
            senkou_b,
        }
    }

    fn midpoints(highs: &[f64], lows: &[f64], period: usize) -> Vec<f64> {
        let mut result = vec![0.0; highs.len()];
        if period == 0 || highs.len() < period {
            return result;
        }
        let hh = rolling_max(highs, period);
        let ll = rolling_min(lows, period);
        for i in (period - 1)..highs.len() {
            result[i] = (hh[i] + ll[i]) / 2.0;
        }
        result
    }
}

impl Default for Ichimoku {
    fn default() -> Self {
        Self::new()
    }
}

impl CandleIndicator for Ichimoku {
    type Output = IchimokuOutput;

    fn compute(&self, candles: &[Candle]) -> Vec<IchimokuOutput> {
        let n = candles.len();
        let highs = candles.highs();
        let lows = candles.lows();

        let tenkan = Self::midpoints(&highs, &lows, self.tenkan);
        let kijun = Self::midpoints(&highs, &lows, self.kijun);
        let span_b = Self::midpoints(&highs, &lows, self.senkou_b);
        let span_a_start = self.tenkan.max(self.kijun).saturating_sub(1);

        (0..n)
            .map(|i| {
                let mut out = IchimokuOutput {
                    tenkan: tenkan[i],
                    kijun: kijun[i],
                    ..Default::default()
                };
                if let Some(src) = i.checked_sub(self.kijun) {
                    if src >= span_a_start && self.tenkan > 0 && self.kijun > 0 {
                        out.senkou_a = (tenkan[src] + kijun[src]) / 2.0;
                    }
                    out.senkou_b = span_b[src];
                }
                if let Some(later) = candles.get(i + self.kijun) {
                    out.chikou = later.close;
                }
                out
            })
            .collect()
    }

    fn period(&self) -> usize {
        self.senkou_b + self.kijun
    }

    fn name(&self) -> &str {
        "Ichimoku"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rising(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let c = 100.0 + i as f64;
                Candle::new(i as i64, c - 0.5, c + 0.5, c - 1.0, c, 1.0)
            })
            .collect()
    }

    #[test]
    fn test_fisher_positive_in_uptrend() {
        let result = FisherTransform::new(10).compute(&rising(40));

        assert_eq!(result[8], FisherOutput::default());
        assert!(result[39].fisher > 0.0);
        assert!((result[39].trigger - result[38].fisher).abs() < 1e-12);
    }

    #[test]
    fn test_fisher_finite_at_clamp() {
        let result = FisherTransform::new(5).compute(&rising(500));
        assert!(result.iter().all(|o| o.fisher.is_finite()));
    }

    #[test]
    fn test_laguerre_flat_carries_fifty() {
        let result = LaguerreRsi::new(0.5).calculate(&[10.0; 20]);
        assert!(result.iter().all(|v| (*v - 50.0).abs() < 1e-12));
    }

    #[test]
    fn test_laguerre_bounds_and_direction() {
        let up: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
        let down: Vec<f64> = (0..50).map(|i| 100.0 - i as f64).collect();
        let up_rsi = LaguerreRsi::new(0.5).calculate(&up);
        let down_rsi = LaguerreRsi::new(0.5).calculate(&down);

        assert!(up_rsi.iter().chain(&down_rsi).all(|v| (0.0..=100.0).contains(v)));
        assert!(up_rsi[49] > 90.0);
        assert!(down_rsi[49] < 10.0);
    }

    #[test]
    fn test_ichimoku_projection() {
        let candles = rising(120);
        let result = Ichimoku::new().compute(&candles);

        assert_eq!(result.len(), 120);
        // Tenkan over bars 2..=10: (110.5 + 101.0) / 2
        assert!((result[10].tenkan - 105.75).abs() < 1e-10);
        // Senkou A at 60 comes from bar 34
        let expected_a = (result[34].tenkan + result[34].kijun) / 2.0;
        assert!((result[60].senkou_a - expected_a).abs() < 1e-10);
        assert_eq!(result[30].senkou_b, 0.0);
        assert!(result[77].senkou_b > 0.0);
        assert!((result[0].chikou - candles[26].close).abs() < 1e-10);
        assert_eq!(result[100].chikou, 0.0);
    }
}
