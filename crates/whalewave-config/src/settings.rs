//! Configuration structures.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use whalewave_core::error::{WhaleError, WhaleResult};
use whalewave_core::types::Timeframe;
use whalewave_engine::{EngineConfig, SchedulerConfig};
use whalewave_risk::RiskConfig;
use whalewave_scoring::{IndicatorSettings, WssWeights};
use whalewave_strategy::{GateSettings, TechnicalOracleSettings};

/// Main application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub market: MarketSettings,
    #[serde(default)]
    pub indicators: IndicatorSettings,
    #[serde(default)]
    pub weights: WssWeights,
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub gate: GateSettings,
    #[serde(default)]
    pub oracle: TechnicalOracleSettings,
    #[serde(default)]
    pub scheduler: SchedulerSettings,
    #[serde(default)]
    pub replay: ReplaySettings,
}

/// General app settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "whalewave".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// "pretty" or "json"
    pub format: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Instrument and timeframes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSettings {
    pub symbol: String,
    pub primary_timeframe: Timeframe,
    pub trend_timeframe: Timeframe,
    pub scalping_timeframe: Timeframe,
    pub min_candles: usize,
}

impl Default for MarketSettings {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            symbol: engine.symbol,
            primary_timeframe: engine.primary_timeframe,
            trend_timeframe: engine.trend_timeframe,
            scalping_timeframe: engine.scalping_timeframe,
            min_candles: engine.min_candles,
        }
    }
}

/// Cycle timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    /// Seconds between cycles; 0 runs back to back
    pub interval_secs: u64,
    pub oracle_timeout_secs: u64,
    pub max_cycles: Option<u64>,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            interval_secs: 60,
            oracle_timeout_secs: 30,
            max_cycles: None,
        }
    }
}

/// Offline replay settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplaySettings {
    /// Candles per series handed to each cycle
    pub lookback: usize,
}

impl Default for ReplaySettings {
    fn default() -> Self {
        Self { lookback: 500 }
    }
}

impl AppConfig {
    /// Engine configuration derived from the market, indicator, weight,
    /// risk and gate sections.
    ///
    /// Volatility is always annualized for the primary timeframe.
    pub fn engine_config(&self) -> EngineConfig {
        let mut indicators = self.indicators.clone();
        indicators.periods_per_year = self.market.primary_timeframe.periods_per_year();

        EngineConfig {
            symbol: self.market.symbol.clone(),
            primary_timeframe: self.market.primary_timeframe,
            trend_timeframe: self.market.trend_timeframe,
            scalping_timeframe: self.market.scalping_timeframe,
            indicators,
            weights: self.weights.clone(),
            risk: self.risk.clone(),
            gate: self.gate.clone(),
            min_candles: self.market.min_candles,
        }
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            interval: (self.scheduler.interval_secs > 0)
                .then(|| Duration::from_secs(self.scheduler.interval_secs)),
            oracle_timeout: Duration::from_secs(self.scheduler.oracle_timeout_secs),
            max_cycles: self.scheduler.max_cycles,
        }
    }

    /// Validate every section.
    pub fn validate(&self) -> WhaleResult<()> {
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(WhaleError::Config(format!(
                "logging.format must be \"pretty\" or \"json\", got {:?}",
                self.logging.format
            )));
        }
        if self.scheduler.oracle_timeout_secs == 0 {
            return Err(WhaleError::Config(
                "scheduler.oracle_timeout_secs must be positive".into(),
            ));
        }
        if self.replay.lookback < self.market.min_candles {
            return Err(WhaleError::Config(format!(
                "replay.lookback {} is below market.min_candles {}",
                self.replay.lookback, self.market.min_candles
            )));
        }

        self.oracle.validate()?;
        self.engine_config().validate()
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
