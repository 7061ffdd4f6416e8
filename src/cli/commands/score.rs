//! Score command: one analysis of the most recent snapshot.

use anyhow::{Context, Result};
use serde_json::json;
use std::sync::Arc;
use whalewave_config::AppConfig;
use whalewave_core::types::StrategyDecision;
use whalewave_engine::{Engine, GateSummary};
use whalewave_strategy::{StrategyGate, TechnicalOracle};

use super::{build_provider, prepare_config};
use crate::cli::{OutputFormat, ScoreArgs};

pub async fn run(args: ScoreArgs, config: AppConfig) -> Result<()> {
    let config = prepare_config(config, &args.data)?;
    let provider = build_provider(&args.data, &config)?;
    let snapshot = provider
        .latest_snapshot()
        .context("Primary candle file is empty")?;

    let engine = Engine::new(Arc::new(config.engine_config())).context("Failed to create engine")?;
    let analysis = engine
        .analyze(&snapshot)
        .context("Latest snapshot cannot be scored")?;

    let (source, decision) = match &args.decision {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read decision {}", path.display()))?;
            let decision = StrategyDecision::from_json(&raw)
                .with_context(|| format!("Decision {} is not valid JSON", path.display()))?;
            (path.display().to_string(), decision)
        }
        None => {
            let oracle = TechnicalOracle::new(config.oracle.clone());
            ("technical".to_string(), oracle.evaluate(&analysis.oracle_context()))
        }
    };

    let gate = StrategyGate::new(config.gate.clone());
    let outcome = gate.validate(&decision, &analysis.wss);

    match args.output {
        OutputFormat::Json => {
            let body = json!({
                "context": analysis.oracle_context(),
                "wss": analysis.wss,
                "decision_source": source,
                "decision": decision,
                "gate": GateSummary::from(&outcome),
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Text => {
            let wss = &analysis.wss;
            let c = &wss.components;
            println!("{} @ {:.2}", snapshot.symbol, analysis.price);
            println!(
                "WSS {:+.2} (threshold {:.2}, {})",
                wss.score,
                wss.action_threshold,
                if wss.is_bullish() {
                    "bullish"
                } else if wss.is_bearish() {
                    "bearish"
                } else {
                    "neutral"
                }
            );
            println!(
                "  trend {:+.2}  momentum {:+.2}  structure {:+.2}  scalping {:+.2}  (raw {:+.2}, volatility x{:.2})",
                c.trend, c.momentum, c.structure, c.scalping, c.raw_score, c.volatility_ratio
            );
            println!();
            println!("Decision ({}): {}", source, outcome.describe());
            if !decision.reason.is_empty() {
                println!("  reason: {}", decision.reason);
            }
        }
    }

    Ok(())
}
