//! Trend strength indicators.

use serde::{Deserialize, Serialize};
use whalewave_core::traits::{CandleIndicator, Indicator};
use whalewave_core::types::{Candle, CandleColumns};

use crate::simd::{dot_product_simd, minmax_simd, sum_simd, sum_sq_dev_simd};
use crate::smoothing::wilder_from;

/// ADX output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AdxOutput {
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
}

/// Average Directional Index.
///
/// DI lines appear at index `period`, ADX at `2 * period - 1`.
#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
}

impl Adx {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl CandleIndicator for Adx {
    type Output = AdxOutput;

    fn compute(&self, candles: &[Candle]) -> Vec<AdxOutput> {
        let n = candles.len();
        let mut result = vec![AdxOutput::default(); n];
        if self.period == 0 || n <= self.period {
            return result;
        }

        let mut tr = vec![0.0; n];
        let mut plus_dm = vec![0.0; n];
        let mut minus_dm = vec![0.0; n];
        for i in 1..n {
            let up = candles[i].high - candles[i - 1].high;
            let down = candles[i - 1].low - candles[i].low;
            tr[i] = candles[i].true_range(Some(candles[i - 1].close));
            if up > down && up > 0.0 {
                plus_dm[i] = up;
            }
            if down > up && down > 0.0 {
                minus_dm[i] = down;
            }
        }

        let smooth_tr = wilder_from(&tr, 1, self.period);
        let smooth_plus = wilder_from(&plus_dm, 1, self.period);
        let smooth_minus = wilder_from(&minus_dm, 1, self.period);

        let mut dx = vec![0.0; n];
        for i in self.period..n {
            if smooth_tr[i] > 0.0 {
                result[i].plus_di = 100.0 * smooth_plus[i] / smooth_tr[i];
                result[i].minus_di = 100.0 * smooth_minus[i] / smooth_tr[i];
            }
            let di_sum = result[i].plus_di + result[i].minus_di;
            if di_sum > 0.0 {
                dx[i] = 100.0 * (result[i].plus_di - result[i].minus_di).abs() / di_sum;
            }
        }

        let adx = wilder_from(&dx, self.period, self.period);
        for (out, value) in result.iter_mut().zip(adx) {
            out.adx = value;
        }

        result
    }

    fn period(&self) -> usize {
        2 * self.period
    }

    fn name(&self) -> &str {
        "ADX"
    }
}

/// Choppiness Index.
///
/// `100 * log10(sum(TR) / (HH - LL)) / log10(period)`; 0 on a flat range.
#[derive(Debug, Clone)]
pub struct Choppiness {
    period: usize,
}

impl Choppiness {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl CandleIndicator for Choppiness {
    type Output = f64;

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let mut result = vec![0.0; candles.len()];
        if self.period < 2 || candles.len() < self.period {
            return result;
        }

        let tr = candles.true_ranges();
        let highs = candles.highs();
        let lows = candles.lows();
        let norm = (self.period as f64).log10();

        for i in (self.period - 1)..candles.len() {
            let window = (i + 1 - self.period)..=i;
            let tr_sum = sum_simd(&tr[window.clone()]);
            let high = minmax_simd(&highs[window.clone()]).map_or(0.0, |(_, max)| max);
            let low = minmax_simd(&lows[window]).map_or(0.0, |(min, _)| min);
            let range = high - low;
            if range > 0.0 && tr_sum > 0.0 {
                result[i] = 100.0 * (tr_sum / range).log10() / norm;
            }
        }

        result
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "Choppiness"
    }
}

/// Rolling least-squares fit output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RegressionOutput {
    /// Price change per bar
    pub slope: f64,
    /// Coefficient of determination in [0, 1]
    pub r2: f64,
}

/// Rolling linear regression of a series against bar index.
///
/// R² is 0 when the window has no variance.
#[derive(Debug, Clone)]
pub struct LinearRegression {
    period: usize,
}

impl LinearRegression {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for LinearRegression {
    type Output = RegressionOutput;

    fn calculate(&self, data: &[f64]) -> Vec<RegressionOutput> {
        let mut result = vec![RegressionOutput::default(); data.len()];
        if self.period < 2 || data.len() < self.period {
            return result;
        }

        let period_f64 = self.period as f64;
        let x_mean = (period_f64 - 1.0) / 2.0;
        let x_centered: Vec<f64> = (0..self.period).map(|x| x as f64 - x_mean).collect();
        let sxx = sum_sq_dev_simd(&x_centered, 0.0);

        for (offset, window) in data.windows(self.period).enumerate() {
            let y_mean = sum_simd(window) / period_f64;
            let slope = dot_product_simd(&x_centered, window) / sxx;
            let ss_tot = sum_sq_dev_simd(window, y_mean);
            let r2 = if ss_tot > 0.0 {
                (slope * slope * sxx / ss_tot).clamp(0.0, 1.0)
            } else {
                0.0
            };
            result[offset + self.period - 1] = RegressionOutput { slope, r2 };
        }

        result
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "LinearRegression"
    }
}
