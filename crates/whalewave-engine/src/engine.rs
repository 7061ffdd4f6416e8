//! One-cycle orchestration: snapshot in, account update and report out.

use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, info};
use whalewave_core::error::{DataError, WhaleError, WhaleResult};
use whalewave_core::money::price_to_decimal;
use whalewave_core::types::{MarketSnapshot, OracleContext, StrategyDecision};
use whalewave_risk::{AccountState, RiskEngine};
use whalewave_scoring::{compute_wss, IndicatorContext, WssResult};
use whalewave_strategy::StrategyGate;

use crate::config::EngineConfig;
use crate::report::{CycleReport, GateSummary, SessionStats};

/// Pure result of scoring a snapshot, before any decision is applied.
#[derive(Debug, Clone)]
pub struct CycleAnalysis {
    pub timestamp: i64,
    /// Last traded price the cycle is marked at
    pub price: f64,
    pub context: IndicatorContext,
    pub wss: WssResult,
}

impl CycleAnalysis {
    /// Read-only view for the strategy oracle.
    pub fn oracle_context(&self) -> OracleContext {
        self.context.oracle_context(&self.wss, self.price)
    }
}

/// Owns the account for one symbol and evaluates cycles against it.
///
/// `&mut self` on every mutating method keeps evaluation serialized.
pub struct Engine {
    config: Arc<EngineConfig>,
    gate: StrategyGate,
    risk: RiskEngine,
    stats: SessionStats,
    cycle: u64,
    trading_day: Option<NaiveDate>,
}

impl Engine {
    /// Build an engine after validating its configuration.
    pub fn new(config: Arc<EngineConfig>) -> WhaleResult<Self> {
        config.validate()?;

        let risk = RiskEngine::new(config.risk.clone());
        let stats = SessionStats::new(config.risk.start_balance);
        info!(
            "Engine ready for {} ({} / {} / {}), balance {}",
            config.symbol,
            config.primary_timeframe,
            config.trend_timeframe,
            config.scalping_timeframe,
            config.risk.start_balance
        );

        Ok(Self {
            gate: StrategyGate::new(config.gate.clone()),
            risk,
            stats,
            cycle: 0,
            trading_day: None,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn account(&self) -> &AccountState {
        self.risk.account()
    }

    pub fn risk(&self) -> &RiskEngine {
        &self.risk
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Validate and score a snapshot without touching the account.
    pub fn analyze(&self, snapshot: &MarketSnapshot) -> WhaleResult<CycleAnalysis> {
        if snapshot.symbol != self.config.symbol {
            return Err(DataError::SymbolNotFound(snapshot.symbol.clone()).into());
        }
        snapshot.validate(self.config.min_candles)?;

        let context = IndicatorContext::build(snapshot, &self.config.indicators);
        let wss = compute_wss(&context, snapshot.last_price, &self.config.weights);

        Ok(CycleAnalysis {
            timestamp: snapshot.timestamp,
            price: snapshot.last_price,
            context,
            wss,
        })
    }

    /// Gate the decision and run the risk engine at the analysed price.
    ///
    /// Conversions that can fail happen before the first mutation.
    pub fn apply(
        &mut self,
        analysis: CycleAnalysis,
        decision: &StrategyDecision,
    ) -> WhaleResult<CycleReport> {
        let mark = price_to_decimal(analysis.price).ok_or_else(|| {
            WhaleError::Internal(format!("price {} has no decimal form", analysis.price))
        })?;
        let at = cycle_time(analysis.timestamp)?;

        let outcome = self.gate.validate(decision, &analysis.wss);
        let risk_action = self.risk.evaluate(mark, outcome.approved(), at);
        let events = self.risk.drain_events();

        self.cycle += 1;
        let report = CycleReport {
            cycle: self.cycle,
            symbol: self.config.symbol.clone(),
            timestamp: at,
            price: analysis.price,
            context: analysis.context,
            wss: analysis.wss,
            decision: decision.clone(),
            gate: GateSummary::from(&outcome),
            risk_action,
            events,
            account: self.risk.account().clone(),
            equity: self.risk.equity(mark),
            breaker: self.risk.breaker(),
        };
        self.stats.record(&report);

        debug!("{}", report.summary());
        Ok(report)
    }

    /// Analyse a snapshot and apply a decision in one step.
    ///
    /// An invalid snapshot returns `Err` and leaves the account unchanged.
    pub fn evaluate_cycle(
        &mut self,
        snapshot: &MarketSnapshot,
        decision: &StrategyDecision,
    ) -> WhaleResult<CycleReport> {
        let analysis = self.analyze(snapshot)?;
        self.apply(analysis, decision)
    }

    /// Reset daily PnL when `timestamp` falls on a new UTC date.
    ///
    /// The first call only records the day. Returns whether a reset happened.
    pub fn roll_day(&mut self, timestamp: i64) -> bool {
        let Some(day) = DateTime::from_timestamp_millis(timestamp).map(|t| t.date_naive()) else {
            return false;
        };

        match self.trading_day.replace(day) {
            Some(previous) if previous != day => {
                info!(
                    "New trading day {}, daily PnL {} reset",
                    day,
                    self.risk.account().daily_pnl
                );
                self.risk.reset_daily();
                true
            }
            _ => false,
        }
    }

    pub fn reset_daily(&mut self) {
        self.risk.reset_daily();
    }

    /// Manual reset of the drawdown anchor.
    pub fn rebase_start_balance(&mut self) {
        self.risk.rebase_start_balance();
    }

    pub(crate) fn record_skip(&mut self) {
        self.stats.record_skip();
    }
}

fn cycle_time(timestamp: i64) -> WhaleResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(timestamp)
        .ok_or_else(|| WhaleError::Internal(format!("timestamp {} out of range", timestamp)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use whalewave_core::error::SnapshotError;
    use whalewave_core::types::{Action, Candle, DailyLevels, OrderBook};
    use whalewave_risk::RiskAction;
    use whalewave_scoring::WssWeights;

    const MINUTE: i64 = 60_000;

    fn series(count: i64, step: i64, end: i64) -> Vec<Candle> {
        (0..count)
            .map(|i| {
                let ts = end - (count - 1 - i) * step;
                let base = 100.0 + (i as f64 * 0.3).sin();
                Candle::new(ts, base, base + 0.6, base - 0.6, base + 0.1, 10.0)
            })
            .collect()
    }

    fn snapshot(timestamp: i64, price: f64) -> MarketSnapshot {
        MarketSnapshot {
            symbol: "BTCUSDT".to_string(),
            timestamp,
            primary: series(120, 15 * MINUTE, timestamp - 15 * MINUTE),
            trend: series(30, 240 * MINUTE, timestamp - 240 * MINUTE),
            scalping: series(120, 3 * MINUTE, timestamp - 3 * MINUTE),
            order_book: OrderBook::default(),
            last_price: price,
            prior_day: DailyLevels::default(),
        }
    }

    /// Zero weights score exactly 0 against a 0 threshold, so any
    /// well-formed BUY or SELL passes the score check.
    fn neutral_config() -> EngineConfig {
        EngineConfig {
            weights: WssWeights {
                trend_mtf: 0.0,
                supertrend: 0.0,
                chandelier: 0.0,
                momentum: 0.0,
                macd_vote: 0.0,
                squeeze: 0.0,
                divergence: 0.0,
                liquidity: 0.0,
                scalp_combined: 0.0,
                scalp_individual: 0.0,
                volatility: 0.0,
                action_threshold: 0.0,
                scalping_threshold: 0.0,
                ..Default::default()
            },
            risk: whalewave_risk::RiskConfig {
                slippage_rate: dec!(0),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn buy(entry: f64, stop: f64, target: f64) -> StrategyDecision {
        StrategyDecision::trade(Action::Buy, "TEST", 0.9, entry, stop, target, "test")
    }

    const T0: i64 = 1_700_000_000_000;

    #[test]
    fn test_invalid_snapshot_leaves_account_untouched() {
        let mut engine = Engine::new(Arc::new(neutral_config())).unwrap();
        let mut snap = snapshot(T0, 100.0);
        snap.primary.truncate(50);

        let err = engine
            .evaluate_cycle(&snap, &buy(100.0, 95.0, 110.0))
            .unwrap_err();
        assert!(matches!(
            err,
            WhaleError::Snapshot(SnapshotError::InsufficientHistory { .. })
        ));
        assert_eq!(engine.account(), &AccountState::new(dec!(1000)));
        assert_eq!(engine.stats().cycles, 0);
    }

    #[test]
    fn test_short_history_config_rejected() {
        // Ten bars leave RSI and %K at their warm-up zeros
        let config = EngineConfig {
            min_candles: 10,
            ..neutral_config()
        };
        assert!(matches!(
            Engine::new(Arc::new(config)),
            Err(WhaleError::Config(_))
        ));
    }

    #[test]
    fn test_wrong_symbol_rejected() {
        let engine = Engine::new(Arc::new(neutral_config())).unwrap();
        let mut snap = snapshot(T0, 100.0);
        snap.symbol = "ETHUSDT".to_string();
        assert!(matches!(
            engine.analyze(&snap),
            Err(WhaleError::Data(DataError::SymbolNotFound(_)))
        ));
    }

    #[test]
    fn test_open_then_take_profit() {
        let mut engine = Engine::new(Arc::new(neutral_config())).unwrap();

        let report = engine
            .evaluate_cycle(&snapshot(T0, 100.0), &buy(100.0, 95.0, 110.0))
            .unwrap();
        assert_eq!(report.risk_action, RiskAction::Opened);
        assert_eq!(report.wss.score, 0.0);
        assert!(report.gate.approved);
        assert_eq!(report.events.len(), 1);
        // 15 / 5 = 3 units, entry fee 0.165
        assert_eq!(report.account.balance, dec!(999.835));

        let hold = StrategyDecision::hold("wait");
        let report = engine
            .evaluate_cycle(&snapshot(T0 + 15 * MINUTE, 101.0), &hold)
            .unwrap();
        assert_eq!(report.risk_action, RiskAction::Holding);
        assert_eq!(report.equity, dec!(1002.835));

        let report = engine
            .evaluate_cycle(&snapshot(T0 + 30 * MINUTE, 110.0), &hold)
            .unwrap();
        assert!(matches!(report.risk_action, RiskAction::Closed { .. }));
        assert!(report.account.position.is_none());
        // +30 gross, exit fee 110 * 3 * 0.00055 = 0.1815
        assert_eq!(report.account.balance, dec!(1029.6535));
        assert_eq!(engine.stats().trades_closed, 1);
        assert_eq!(engine.stats().cycles, 3);
    }

    #[test]
    fn test_score_mismatch_demotes_to_hold() {
        let mut config = neutral_config();
        config.weights.action_threshold = 50.0;
        let mut engine = Engine::new(Arc::new(config)).unwrap();

        let report = engine
            .evaluate_cycle(&snapshot(T0, 100.0), &buy(100.0, 95.0, 110.0))
            .unwrap();
        assert!(report.gate.rejected);
        assert_eq!(report.risk_action, RiskAction::Idle);
        assert!(report.events.is_empty());
    }

    #[test]
    fn test_roll_day() {
        let mut engine = Engine::new(Arc::new(neutral_config())).unwrap();
        engine
            .evaluate_cycle(&snapshot(T0, 100.0), &buy(100.0, 95.0, 110.0))
            .unwrap();
        assert!(engine.account().daily_pnl < dec!(0));

        assert!(!engine.roll_day(T0));
        assert!(!engine.roll_day(T0 + MINUTE));
        assert!(engine.roll_day(T0 + 86_400_000));
        assert_eq!(engine.account().daily_pnl, dec!(0));
    }

    #[test]
    fn test_oracle_context_carries_score() {
        let engine = Engine::new(Arc::new(EngineConfig::default())).unwrap();
        let analysis = engine.analyze(&snapshot(T0, 100.05)).unwrap();
        let ctx = analysis.oracle_context();

        assert_eq!(ctx.symbol, "BTCUSDT");
        assert_eq!(ctx.price, 100.05);
        assert_eq!(ctx.wss_score, analysis.wss.score);
        assert!(ctx.indicators.atr > 0.0);
    }
}
