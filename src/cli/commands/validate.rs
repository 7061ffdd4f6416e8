//! Validate configuration command.

use anyhow::{Context, Result};
use std::path::Path;
use whalewave_config::AppConfig;

use crate::cli::ValidateArgs;

pub fn run(args: ValidateArgs, config: AppConfig, config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Err(e.into());
    }

    let engine = config.engine_config();
    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Log level: {}", config.logging.level);
    println!(
        "Market: {} ({} / trend {} / scalping {})",
        engine.symbol, engine.primary_timeframe, engine.trend_timeframe, engine.scalping_timeframe
    );
    println!("Risk per trade: {}%", config.risk.risk_pct);
    println!("Leverage cap: {}x", config.risk.leverage_cap);
    println!("Max drawdown: {}%", config.risk.max_drawdown_pct);
    println!("Daily loss limit: {}%", config.risk.daily_loss_limit_pct);
    println!("Min oracle confidence: {}", config.gate.min_confidence);
    println!(
        "Min candles: {} (indicator warm-up {})",
        engine.min_candles,
        engine.indicators.warmup_bars()
    );

    if args.show {
        println!();
        print!("{}", config.to_toml().context("Failed to render configuration")?);
    }

    Ok(())
}
