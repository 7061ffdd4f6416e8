//! Read-only indicator context handed to strategy oracles and observers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Coarse volatility classification derived from the ATR ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum VolatilityRegime {
    High,
    #[default]
    Normal,
    Low,
}

impl VolatilityRegime {
    /// Classify a current/average volatility ratio.
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > 1.5 {
            VolatilityRegime::High
        } else if ratio < 0.5 {
            VolatilityRegime::Low
        } else {
            VolatilityRegime::Normal
        }
    }
}

impl fmt::Display for VolatilityRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VolatilityRegime::High => "HIGH",
            VolatilityRegime::Normal => "NORMAL",
            VolatilityRegime::Low => "LOW",
        };
        write!(f, "{}", s)
    }
}

/// Latest indicator readings at the snapshot time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub rsi: f64,
    pub stoch_k: f64,
    pub stoch_d: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
    pub cci: f64,
    pub mfi: f64,
    pub adx: f64,
    pub plus_di: f64,
    pub minus_di: f64,
    pub choppiness: f64,
    pub regression_slope: f64,
    pub regression_r2: f64,
    pub atr: f64,
    pub bb_upper: f64,
    pub bb_lower: f64,
    pub kc_upper: f64,
    pub kc_lower: f64,
    pub squeeze: bool,
    pub supertrend: i8,
    pub supertrend_stop: f64,
    pub chandelier: i8,
    pub chandelier_stop: f64,
    pub psar: f64,
    pub obv: f64,
    pub vwap: f64,
    pub historical_volatility: f64,
    pub tenkan: f64,
    pub kijun: f64,
    pub senkou_a: f64,
    pub senkou_b: f64,
    pub divergence: i8,
    /// Higher-timeframe bias: +1 above its EMA, -1 below, 0 without history
    pub htf_bias: i8,
}

/// Fast-timeframe readings used by the scalping component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScalpingSnapshot {
    pub laguerre_rsi: f64,
    pub fisher: f64,
    pub fisher_trigger: f64,
    /// Fisher and trigger one bar earlier, for cross detection
    pub fisher_prev: f64,
    pub fisher_trigger_prev: f64,
    pub volume: f64,
    pub volume_average: f64,
    /// +1 bullish, -1 bearish, 0 doji on the latest fast bar
    pub bar_direction: i8,
}

/// Context supplied to a strategy oracle once per cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OracleContext {
    pub symbol: String,
    pub timestamp: i64,
    pub price: f64,
    pub wss_score: f64,
    pub action_threshold: f64,
    pub volatility_ratio: f64,
    pub volatility_regime: VolatilityRegime,
    pub indicators: IndicatorSnapshot,
    pub scalping: ScalpingSnapshot,
    /// Fibonacci pivot levels keyed by name (P, R1..R3, S1..S3)
    pub pivots: BTreeMap<String, f64>,
    pub support_walls: Vec<f64>,
    pub resistance_walls: Vec<f64>,
    /// Bounds of the most recent unfilled fair-value gap, if any
    pub active_fvg: Option<(f64, f64)>,
}

impl OracleContext {
    /// Serialize for transport to an external oracle.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regime_from_ratio() {
        assert_eq!(VolatilityRegime::from_ratio(1.6), VolatilityRegime::High);
        assert_eq!(VolatilityRegime::from_ratio(1.5), VolatilityRegime::Normal);
        assert_eq!(VolatilityRegime::from_ratio(0.49), VolatilityRegime::Low);
    }

    #[test]
    fn test_context_serializes() {
        let ctx = OracleContext {
            symbol: "BTCUSDT".to_string(),
            wss_score: 2.5,
            volatility_regime: VolatilityRegime::High,
            ..Default::default()
        };
        let json = ctx.to_json().unwrap();
        assert!(json.contains("\"wss_score\": 2.5"));
        assert!(json.contains("\"HIGH\""));
    }
}
