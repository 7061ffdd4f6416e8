//! Trend-following stop systems.
//!
//! Each produces a trend direction (+1 long, -1 short) and a stop level per
//! bar. The stop only moves in the trend's favour and the trend flips when
//! price closes through it. Warm-up bars read trend +1 with stop 0.

use serde::{Deserialize, Serialize};
use whalewave_core::traits::CandleIndicator;
use whalewave_core::types::{Candle, CandleColumns};

use crate::smoothing::{rolling_max, rolling_min};
use crate::volatility::Atr;

/// Trend direction and active stop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StopOutput {
    pub trend: i8,
    pub stop: f64,
}

impl Default for StopOutput {
    fn default() -> Self {
        Self { trend: 1, stop: 0.0 }
    }
}

/// SuperTrend: ATR bands around the HL2 mid price.
#[derive(Debug, Clone)]
pub struct SuperTrend {
    period: usize,
    factor: f64,
}

impl SuperTrend {
    /// Default parameters (10, 3.0).
    pub fn new() -> Self {
        Self::with_params(10, 3.0)
    }

    pub fn with_params(period: usize, factor: f64) -> Self {
        Self { period, factor }
    }
}

impl Default for SuperTrend {
    fn default() -> Self {
        Self::new()
    }
}

impl CandleIndicator for SuperTrend {
    type Output = StopOutput;

    fn compute(&self, candles: &[Candle]) -> Vec<StopOutput> {
        let n = candles.len();
        let mut result = vec![StopOutput::default(); n];
        if self.period == 0 || n < self.period {
            return result;
        }

        let atr = Atr::new(self.period).compute(candles);
        let first = self.period - 1;

        let mid = candles[first].hl2();
        let mut final_upper = mid + self.factor * atr[first];
        let mut final_lower = mid - self.factor * atr[first];
        let mut trend: i8 = 1;
        result[first] = StopOutput {
            trend,
            stop: final_lower,
        };

        for i in (first + 1)..n {
            let mid = candles[i].hl2();
            let basic_upper = mid + self.factor * atr[i];
            let basic_lower = mid - self.factor * atr[i];
            let prev_close = candles[i - 1].close;

            if basic_upper < final_upper || prev_close > final_upper {
                final_upper = basic_upper;
            }
            if basic_lower > final_lower || prev_close < final_lower {
                final_lower = basic_lower;
            }

            let close = candles[i].close;
            if trend == 1 && close < final_lower {
                trend = -1;
            } else if trend == -1 && close > final_upper {
                trend = 1;
            }

            let stop = if trend == 1 { final_lower } else { final_upper };
            result[i] = StopOutput { trend, stop };
        }

        result
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "SuperTrend"
    }
}

/// Chandelier Exit: ATR stops hung from the rolling extreme.
#[derive(Debug, Clone)]
pub struct ChandelierExit {
    period: usize,
    multiplier: f64,
}

impl ChandelierExit {
    /// Default parameters (22, 3.0).
    pub fn new() -> Self {
        Self::with_params(22, 3.0)
    }

    pub fn with_params(period: usize, multiplier: f64) -> Self {
        Self { period, multiplier }
    }
}

impl Default for ChandelierExit {
    fn default() -> Self {
        Self::new()
    }
}

impl CandleIndicator for ChandelierExit {
    type Output = StopOutput;

    fn compute(&self, candles: &[Candle]) -> Vec<StopOutput> {
        let n = candles.len();
        let mut result = vec![StopOutput::default(); n];
        if self.period == 0 || n < self.period {
            return result;
        }

        let atr = Atr::new(self.period).compute(candles);
        let highest = rolling_max(&candles.highs(), self.period);
        let lowest = rolling_min(&candles.lows(), self.period);
        let first = self.period - 1;

        let mut long_stop = highest[first] - self.multiplier * atr[first];
        let mut short_stop = lowest[first] + self.multiplier * atr[first];
        let mut trend: i8 = 1;
        result[first] = StopOutput {
            trend,
            stop: long_stop,
        };

        for i in (first + 1)..n {
            let raw_long = highest[i] - self.multiplier * atr[i];
            let raw_short = lowest[i] + self.multiplier * atr[i];
            let close = candles[i].close;

            // Only the active stop ratchets; the idle side follows its raw level
            if trend == 1 {
                if close < long_stop {
                    trend = -1;
                    long_stop = raw_long;
                    short_stop = raw_short;
                } else {
                    long_stop = raw_long.max(long_stop);
                    short_stop = raw_short;
                }
            } else if close > short_stop {
                trend = 1;
                long_stop = raw_long;
                short_stop = raw_short;
            } else {
                short_stop = raw_short.min(short_stop);
                long_stop = raw_long;
            }

            let stop = if trend == 1 { long_stop } else { short_stop };
            result[i] = StopOutput { trend, stop };
        }

        result
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "ChandelierExit"
    }
}

/// Parabolic SAR.
///
/// Acceleration starts at `start`, grows by `step` on each new extreme up to
/// `max`. When price crosses the SAR the trend reverses, the SAR jumps to the
/// prior extreme point and acceleration resets.
#[derive(Debug, Clone)]
pub struct ParabolicSar {
    start: f64,
    step: f64,
    max: f64,
}

impl ParabolicSar {
    /// Default parameters (0.02, 0.02, 0.2).
    pub fn new() -> Self {
        Self::with_params(0.02, 0.02, 0.2)
    }

    pub fn with_params(start: f64, step: f64, max: f64) -> Self {
        Self { start, step, max }
    }
}

impl Default for ParabolicSar {
    fn default() -> Self {
        Self::new()
    }
}

impl CandleIndicator for ParabolicSar {
    type Output = StopOutput;

    fn compute(&self, candles: &[Candle]) -> Vec<StopOutput> {
        let n = candles.len();
        let mut result = Vec::with_capacity(n);
        let Some(first) = candles.first() else {
            return result;
        };

        let mut rising = true;
        let mut af = self.start;
        let mut extreme = first.high;
        let mut sar = first.low;
        result.push(StopOutput { trend: 1, stop: sar });

        for i in 1..n {
            let candle = &candles[i];
            let mut next = sar + af * (extreme - sar);

            if rising {
                next = next.min(candles[i - 1].low);
                if i >= 2 {
                    next = next.min(candles[i - 2].low);
                }
                if candle.low < next {
                    rising = false;
                    next = extreme;
                    extreme = candle.low;
                    af = self.start;
                } else if candle.high > extreme {
                    extreme = candle.high;
                    af = (af + self.step).min(self.max);
                }
            } else {
                next = next.max(candles[i - 1].high);
                if i >= 2 {
                    next = next.max(candles[i - 2].high);
                }
                if candle.high > next {
                    rising = true;
                    next = extreme;
                    extreme = candle.high;
                    af = self.start;
                } else if candle.low < extreme {
                    extreme = candle.low;
                    af = (af + self.step).min(self.max);
                }
            }

            sar = next;
            result.push(StopOutput {
                trend: if rising { 1 } else { -1 },
                stop: sar,
            });
        }

        result
    }

    fn period(&self) -> usize {
        2
    }

    fn name(&self) -> &str {
        "ParabolicSAR"
    }
}
