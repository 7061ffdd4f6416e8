//! CLI command implementations.

pub mod replay;
pub mod score;
pub mod validate;

use anyhow::{Context, Result};
use whalewave_config::AppConfig;
use whalewave_data::{load_series, ReplayProvider};

use crate::cli::DataArgs;

/// Load the three candle files into a replay provider positioned after
/// warmup.
pub(crate) fn build_provider(data: &DataArgs, config: &AppConfig) -> Result<ReplayProvider> {
    let market = &config.market;
    let primary = load_series(&data.primary, market.primary_timeframe)
        .with_context(|| format!("Failed to load primary candles from {}", data.primary.display()))?;
    let trend = load_series(&data.trend, market.trend_timeframe)
        .with_context(|| format!("Failed to load trend candles from {}", data.trend.display()))?;
    let scalping = load_series(&data.scalping, market.scalping_timeframe).with_context(|| {
        format!("Failed to load scalping candles from {}", data.scalping.display())
    })?;

    Ok(ReplayProvider::new(market.symbol.clone(), primary, trend, scalping)
        .with_lookback(config.replay.lookback)
        .skip_warmup(market.min_candles))
}

/// Apply command line overrides and validate the result.
pub(crate) fn prepare_config(mut config: AppConfig, data: &DataArgs) -> Result<AppConfig> {
    if let Some(symbol) = &data.symbol {
        config.market.symbol = symbol.clone();
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}
