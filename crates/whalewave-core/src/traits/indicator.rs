//! Indicator trait definitions.

use crate::types::Candle;

/// Indicator over a single value series (typically closes).
///
/// Output has the same length as the input. Positions before the warm-up
/// window hold the indicator's neutral value, never NaN.
pub trait Indicator: Send + Sync {
    /// The output type of the indicator.
    type Output;

    /// Calculate one output per input value.
    fn calculate(&self, data: &[f64]) -> Vec<Self::Output>;

    /// Number of inputs before the first fully-formed output.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;

    /// Whether index `i` is past the warm-up window.
    fn is_warm(&self, i: usize) -> bool {
        i + 1 >= self.period()
    }
}

/// Indicator that needs full candles (high/low/volume), not just closes.
pub trait CandleIndicator: Send + Sync {
    /// The output type of the indicator.
    type Output;

    /// Calculate one output per candle.
    fn compute(&self, candles: &[Candle]) -> Vec<Self::Output>;

    /// Number of candles before the first fully-formed output.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;
}
