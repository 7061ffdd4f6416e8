//! Smoothing primitives and rolling-window helpers.
//!
//! Every function returns a vector the same length as its input. Indices
//! before the first full window hold 0.0. The `_from` variants treat indices
//! before `start` as unavailable, which lets smoothers chain over series that
//! have their own warm-up.

use std::collections::VecDeque;
use whalewave_core::traits::Indicator;

/// Simple moving average.
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    sma_from(values, 0, period)
}

/// Simple moving average whose first window starts at `start`.
pub fn sma_from(values: &[f64], start: usize, period: usize) -> Vec<f64> {
    let mut result = vec![0.0; values.len()];
    if period == 0 || start + period > values.len() {
        return result;
    }

    let period_f64 = period as f64;
    let first = start + period - 1;
    let mut sum: f64 = values[start..=first].iter().sum();
    result[first] = sum / period_f64;

    // Sliding window
    for i in (first + 1)..values.len() {
        sum = sum - values[i - period] + values[i];
        result[i] = sum / period_f64;
    }

    result
}

/// Exponential moving average seeded with the first value.
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    ema_from(values, 0, period)
}

/// Exponential moving average seeded with `values[start]`.
pub fn ema_from(values: &[f64], start: usize, period: usize) -> Vec<f64> {
    let mut result = vec![0.0; values.len()];
    if period == 0 || start >= values.len() {
        return result;
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let one_minus_mult = 1.0 - multiplier;

    let mut ema = values[start];
    result[start] = ema;
    for i in (start + 1)..values.len() {
        ema = values[i] * multiplier + ema * one_minus_mult;
        result[i] = ema;
    }

    result
}

/// Wilder smoothing: seeded with the first-window mean, then `1/period` blend.
pub fn wilder(values: &[f64], period: usize) -> Vec<f64> {
    wilder_from(values, 0, period)
}

/// Wilder smoothing whose seed window starts at `start`.
pub fn wilder_from(values: &[f64], start: usize, period: usize) -> Vec<f64> {
    let mut result = vec![0.0; values.len()];
    if period == 0 || start + period > values.len() {
        return result;
    }

    let period_f64 = period as f64;
    let first = start + period - 1;
    let mut avg: f64 = values[start..=first].iter().sum::<f64>() / period_f64;
    result[first] = avg;

    for i in (first + 1)..values.len() {
        avg += (values[i] - avg) / period_f64;
        result[i] = avg;
    }

    result
}

/// Rolling maximum over up to `period` trailing values.
///
/// The first `period - 1` entries cover the shorter prefix available.
pub fn rolling_max(values: &[f64], period: usize) -> Vec<f64> {
    rolling_extreme(values, period, |a, b| a >= b)
}

/// Rolling minimum over up to `period` trailing values.
pub fn rolling_min(values: &[f64], period: usize) -> Vec<f64> {
    rolling_extreme(values, period, |a, b| a <= b)
}

fn rolling_extreme(values: &[f64], period: usize, dominates: fn(f64, f64) -> bool) -> Vec<f64> {
    let mut result = vec![0.0; values.len()];
    if period == 0 {
        return result;
    }

    // Monotonic deque of indices; front is the current extreme.
    let mut window: VecDeque<usize> = VecDeque::with_capacity(period);
    for (i, &value) in values.iter().enumerate() {
        while window.back().is_some_and(|&j| dominates(value, values[j])) {
            window.pop_back();
        }
        window.push_back(i);
        if window.front().is_some_and(|&j| j + period <= i) {
            window.pop_front();
        }
        result[i] = window.front().map_or(value, |&j| values[j]);
    }

    result
}

/// Simple Moving Average.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for Sma {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        sma(data, self.period)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "SMA"
    }
}

/// Exponential Moving Average.
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for Ema {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        ema(data, self.period)
    }

    /// Seeded from the first value, so no warm-up.
    fn period(&self) -> usize {
        1
    }

    fn name(&self) -> &str {
        "EMA"
    }
}
