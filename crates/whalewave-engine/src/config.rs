//! Immutable engine configuration.

use serde::{Deserialize, Serialize};
use whalewave_core::error::{WhaleError, WhaleResult};
use whalewave_core::types::Timeframe;
use whalewave_risk::RiskConfig;
use whalewave_scoring::{IndicatorSettings, WssWeights};
use whalewave_strategy::GateSettings;

/// Everything one [`Engine`](crate::Engine) needs, fixed for its lifetime.
///
/// Hot reload means building a new engine from a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub symbol: String,
    pub primary_timeframe: Timeframe,
    /// Higher timeframe used for directional bias
    pub trend_timeframe: Timeframe,
    /// Fast timeframe used for scalping confluence
    pub scalping_timeframe: Timeframe,
    pub indicators: IndicatorSettings,
    pub weights: WssWeights,
    pub risk: RiskConfig,
    pub gate: GateSettings,
    /// Closed candles the primary and scalping series must carry
    pub min_candles: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            symbol: "BTCUSDT".to_string(),
            primary_timeframe: Timeframe::Minute15,
            trend_timeframe: Timeframe::Hour4,
            scalping_timeframe: Timeframe::Minute3,
            indicators: IndicatorSettings::default(),
            weights: WssWeights::default(),
            risk: RiskConfig::default(),
            gate: GateSettings::default(),
            min_candles: 100,
        }
    }
}

impl EngineConfig {
    /// Validate every section.
    pub fn validate(&self) -> WhaleResult<()> {
        if self.symbol.trim().is_empty() {
            return Err(WhaleError::Config("symbol must not be empty".into()));
        }
        if self.trend_timeframe.as_secs() < self.primary_timeframe.as_secs() {
            return Err(WhaleError::Config(format!(
                "trend timeframe {} is shorter than primary {}",
                self.trend_timeframe, self.primary_timeframe
            )));
        }
        if self.scalping_timeframe.as_secs() > self.primary_timeframe.as_secs() {
            return Err(WhaleError::Config(format!(
                "scalping timeframe {} is longer than primary {}",
                self.scalping_timeframe, self.primary_timeframe
            )));
        }
        if !self.covers_warmup() {
            return Err(WhaleError::Config(format!(
                "min_candles {} is below the indicator warm-up of {} bars",
                self.min_candles,
                self.indicators.warmup_bars()
            )));
        }

        self.indicators.validate()?;
        self.weights.validate()?;
        self.risk.validate()?;
        self.gate.validate()?;
        Ok(())
    }

    /// Whether `min_candles` covers the longest indicator warm-up.
    pub fn covers_warmup(&self) -> bool {
        self.min_candles >= self.indicators.warmup_bars()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.covers_warmup());
    }

    #[test]
    fn test_timeframe_order_enforced() {
        let config = EngineConfig {
            trend_timeframe: Timeframe::Minute5,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("trend timeframe"));

        let config = EngineConfig {
            scalping_timeframe: Timeframe::Hour1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nested_sections_are_validated() {
        let mut config = EngineConfig::default();
        config.gate.min_confidence = 1.5;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.min_candles = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_min_candles_must_cover_warmup() {
        let mut config = EngineConfig::default();
        assert_eq!(config.indicators.warmup_bars(), 64);

        config.min_candles = 10;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("warm-up"));

        config.min_candles = 64;
        assert!(config.validate().is_ok());

        // Longer periods raise the bar
        config.indicators.volatility_window = 100;
        assert!(config.validate().is_err());
    }
}
