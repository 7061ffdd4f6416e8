//! Replay command implementation.

use anyhow::{Context, Result};
use std::future::pending;
use std::sync::Arc;
use tracing::info;
use whalewave_config::AppConfig;
use whalewave_engine::{Engine, Scheduler};
use whalewave_monitor::{TracingObserver, TradeJournal};
use whalewave_strategy::TechnicalOracle;

use super::{build_provider, prepare_config};
use crate::cli::{OutputFormat, ReplayArgs};

pub async fn run(args: ReplayArgs, config: AppConfig) -> Result<()> {
    let mut config = prepare_config(config, &args.data)?;
    if args.max_cycles.is_some() {
        config.scheduler.max_cycles = args.max_cycles;
    }

    let engine_config = Arc::new(config.engine_config());
    let periods_per_year = engine_config.indicators.periods_per_year;
    let provider = build_provider(&args.data, &config)?;
    if provider.remaining() == 0 {
        anyhow::bail!(
            "Not enough candles for {}: every series needs at least {} closed candles",
            config.market.symbol,
            config.market.min_candles
        );
    }
    info!(
        "Replaying {} cycles for {}",
        provider.remaining(),
        config.market.symbol
    );

    let engine = Engine::new(engine_config).context("Failed to create engine")?;
    let oracle = TechnicalOracle::new(config.oracle.clone());

    // Replay runs cycles back to back.
    let mut scheduler_config = config.scheduler_config();
    scheduler_config.interval = None;

    let observer = TracingObserver::new(periods_per_year).with_json_reports(args.json_reports);
    let mut scheduler =
        Scheduler::new(engine, provider, oracle, scheduler_config).with_observer(observer);
    if let Some(path) = &args.journal {
        let journal = TradeJournal::create(path)
            .with_context(|| format!("Failed to create trade journal {}", path.display()))?;
        scheduler = scheduler.with_observer(journal);
    }

    let engine = scheduler
        .run(async {
            if tokio::signal::ctrl_c().await.is_err() {
                pending::<()>().await;
            }
        })
        .await;

    let stats = engine.stats();
    match args.output {
        OutputFormat::Json => println!("{}", stats.to_json()?),
        OutputFormat::Text => println!("{}", stats.summary(engine.account(), periods_per_year)),
    }

    if let Some(path) = &args.save {
        std::fs::write(path, stats.to_json()?)
            .with_context(|| format!("Failed to save results to {}", path.display()))?;
        info!("Results saved to {:?}", path);
    }
    if let Some(path) = &args.equity_csv {
        std::fs::write(path, stats.equity_to_csv())
            .with_context(|| format!("Failed to write equity curve to {}", path.display()))?;
        info!("Equity curve saved to {:?}", path);
    }

    Ok(())
}
