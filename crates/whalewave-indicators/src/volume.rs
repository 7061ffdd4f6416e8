//! Volume indicators.

use whalewave_core::traits::CandleIndicator;
use whalewave_core::types::Candle;

/// On-Balance Volume: cumulative volume signed by close direction.
#[derive(Debug, Clone, Default)]
pub struct Obv;

impl Obv {
    pub fn new() -> Self {
        Self
    }
}

impl CandleIndicator for Obv {
    type Output = f64;

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let mut result = Vec::with_capacity(candles.len());
        let mut total = 0.0;
        for (i, candle) in candles.iter().enumerate() {
            if i > 0 {
                let prev = candles[i - 1].close;
                if candle.close > prev {
                    total += candle.volume;
                } else if candle.close < prev {
                    total -= candle.volume;
                }
            }
            result.push(total);
        }
        result
    }

    fn period(&self) -> usize {
        1
    }

    fn name(&self) -> &str {
        "OBV"
    }
}

/// Rolling volume-weighted average of the typical price.
///
/// 0 before the first full window and wherever the window has no volume.
#[derive(Debug, Clone)]
pub struct Vwap {
    period: usize,
}

impl Vwap {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl CandleIndicator for Vwap {
    type Output = f64;

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let mut result = vec![0.0; candles.len()];
        if self.period == 0 || candles.len() < self.period {
            return result;
        }

        let mut pv_sum = 0.0;
        let mut vol_sum = 0.0;
        for (i, candle) in candles.iter().enumerate() {
            pv_sum += candle.typical_price() * candle.volume;
            vol_sum += candle.volume;
            if i >= self.period {
                let old = &candles[i - self.period];
                pv_sum -= old.typical_price() * old.volume;
                vol_sum -= old.volume;
            }
            if i + 1 >= self.period && vol_sum > 0.0 {
                result[i] = pv_sum / vol_sum;
            }
        }

        result
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "VWAP"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_obv() {
        let candles = vec![
            Candle::new(0, 10.0, 10.0, 10.0, 10.0, 100.0),
            Candle::new(1, 10.0, 11.0, 10.0, 11.0, 50.0),
            Candle::new(2, 11.0, 11.0, 9.0, 9.0, 30.0),
            Candle::new(3, 9.0, 9.0, 9.0, 9.0, 80.0),
        ];
        assert_eq!(Obv::new().compute(&candles), vec![0.0, 50.0, 20.0, 20.0]);
    }

    #[test]
    fn test_vwap_weights_by_volume() {
        let candles = vec![
            Candle::new(0, 10.0, 10.0, 10.0, 10.0, 1.0),
            Candle::new(1, 20.0, 20.0, 20.0, 20.0, 3.0),
            Candle::new(2, 30.0, 30.0, 30.0, 30.0, 1.0),
        ];
        let result = Vwap::new(2).compute(&candles);

        assert_eq!(result[0], 0.0);
        assert!((result[1] - 17.5).abs() < 1e-10);
        assert!((result[2] - 22.5).abs() < 1e-10);
    }

    #[test]
    fn test_vwap_zero_volume() {
        let candles: Vec<Candle> = (0..5)
            .map(|i| Candle::new(i, 10.0, 10.0, 10.0, 10.0, 0.0))
            .collect();
        assert!(Vwap::new(3).compute(&candles).iter().all(|v| *v == 0.0));
    }
}
