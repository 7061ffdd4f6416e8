//! Configuration management.

mod settings;

pub use settings::{
    AppConfig, AppSettings, LoggingConfig, MarketSettings, ReplaySettings, SchedulerSettings,
};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;

/// Environment variable prefix; `WHALEWAVE__RISK__RISK_PCT=2` sets
/// `risk.risk_pct`.
pub const ENV_PREFIX: &str = "WHALEWAVE";

/// Load configuration from file and environment.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use whalewave_core::types::Timeframe;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let file = write_config(
            r#"
[market]
symbol = "SOLUSDT"
primary_timeframe = "1h"

[risk]
risk_pct = "2.5"
fee_rate = "0.0004"
"#,
        );
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.market.symbol, "SOLUSDT");
        assert_eq!(config.market.primary_timeframe, Timeframe::Hour1);
        assert_eq!(config.market.trend_timeframe, Timeframe::Hour4);
        assert_eq!(config.risk.risk_pct, dec!(2.5));
        assert_eq!(config.risk.fee_rate, dec!(0.0004));
        assert_eq!(config.risk.start_balance, dec!(1000));
        assert_eq!(config.indicators.rsi_period, 14);
        assert!(config.validate().is_ok());

        let engine = config.engine_config();
        assert!((engine.indicators.periods_per_year - 8760.0).abs() < 1e-9);
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = write_config("[market]\nsymbol = \"BTCUSDT\"\n");
        std::env::set_var("WHALEWAVE__GATE__MIN_CONFIDENCE", "0.75");

        let config = load_config(file.path()).unwrap();
        std::env::remove_var("WHALEWAVE__GATE__MIN_CONFIDENCE");

        assert_eq!(config.gate.min_confidence, 0.75);
    }

    #[test]
    fn test_shipped_default_config() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/default.toml");
        let config = load_config(&path).unwrap();
        let defaults = AppConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.market, defaults.market);
        assert_eq!(config.indicators, defaults.indicators);
        assert_eq!(config.weights, defaults.weights);
        assert_eq!(config.risk, defaults.risk);
        assert_eq!(config.oracle, defaults.oracle);
        assert_eq!(config.scheduler, defaults.scheduler);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_config(Path::new("/definitely/not/here.toml")).is_err());
    }

    #[test]
    fn test_validation_catches_bad_sections() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());

        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.replay.lookback = 10;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.market.trend_timeframe = Timeframe::Minute1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_scheduler_interval_zero_means_back_to_back() {
        let mut config = AppConfig::default();
        assert!(config.scheduler_config().interval.is_some());

        config.scheduler.interval_secs = 0;
        assert!(config.scheduler_config().interval.is_none());
    }

    #[test]
    fn test_rendered_toml_parses_back() {
        let config = AppConfig::default();
        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("[risk]"));
        assert!(rendered.contains("fee_rate = \"0.00055\""));

        let parsed: AppConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
