//! Async cycle driver and observer hooks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::warn;
use whalewave_core::error::{DataError, OracleError};
use whalewave_core::traits::{DataProvider, StrategyOracle};
use whalewave_risk::AccountState;

use crate::engine::Engine;
use crate::report::{CycleReport, SessionStats};

/// Oracle deadline used by [`run_cycle`].
pub const DEFAULT_ORACLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Where a skipped cycle stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStage {
    Data,
    Snapshot,
    Oracle,
    Apply,
}

impl fmt::Display for CycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CycleStage::Data => "data",
            CycleStage::Snapshot => "snapshot",
            CycleStage::Oracle => "oracle",
            CycleStage::Apply => "apply",
        };
        write!(f, "{}", s)
    }
}

/// A cycle abandoned before the account was touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedCycle {
    pub stage: CycleStage,
    pub error: String,
}

/// Result of one driven cycle.
#[derive(Debug)]
pub enum CycleOutcome {
    Completed(Box<CycleReport>),
    Skipped(SkippedCycle),
    /// The provider has no more snapshots
    Exhausted,
}

/// Receives every cycle the driver produces.
pub trait CycleObserver: Send {
    fn on_cycle(&mut self, report: &CycleReport);

    fn on_skip(&mut self, _skipped: &SkippedCycle) {}

    /// Called once when a scheduler stops.
    fn on_finish(&mut self, _stats: &SessionStats, _account: &AccountState) {}
}

/// Fetch, score, consult the oracle and apply, with the default oracle
/// deadline.
pub async fn run_cycle<P, O>(engine: &mut Engine, provider: &mut P, oracle: &O) -> CycleOutcome
where
    P: DataProvider + ?Sized,
    O: StrategyOracle + ?Sized,
{
    run_cycle_with_timeout(engine, provider, oracle, DEFAULT_ORACLE_TIMEOUT).await
}

/// Drive one cycle.
///
/// Provider, snapshot and oracle failures skip the cycle before any state
/// changes. The daily PnL rolls over only once the cycle is certain to be
/// applied.
pub async fn run_cycle_with_timeout<P, O>(
    engine: &mut Engine,
    provider: &mut P,
    oracle: &O,
    oracle_timeout: Duration,
) -> CycleOutcome
where
    P: DataProvider + ?Sized,
    O: StrategyOracle + ?Sized,
{
    let symbol = engine.config().symbol.clone();

    let snapshot = match provider.fetch_snapshot(&symbol).await {
        Ok(snapshot) => snapshot,
        Err(DataError::Exhausted) => return CycleOutcome::Exhausted,
        Err(e) => return skip(engine, CycleStage::Data, e),
    };

    let analysis = match engine.analyze(&snapshot) {
        Ok(analysis) => analysis,
        Err(e) => return skip(engine, CycleStage::Snapshot, e),
    };

    let context = analysis.oracle_context();
    let decision = match tokio::time::timeout(oracle_timeout, oracle.decide(&context)).await {
        Ok(Ok(decision)) => decision,
        Ok(Err(e)) => return skip(engine, CycleStage::Oracle, e),
        Err(_) => {
            let e = OracleError::Timeout {
                timeout_secs: oracle_timeout.as_secs(),
            };
            return skip(engine, CycleStage::Oracle, e);
        }
    };

    engine.roll_day(analysis.timestamp);
    match engine.apply(analysis, &decision) {
        Ok(report) => CycleOutcome::Completed(Box::new(report)),
        Err(e) => skip(engine, CycleStage::Apply, e),
    }
}

fn skip(engine: &mut Engine, stage: CycleStage, error: impl fmt::Display) -> CycleOutcome {
    warn!("Cycle skipped at {} stage: {}", stage, error);
    engine.record_skip();
    CycleOutcome::Skipped(SkippedCycle {
        stage,
        error: error.to_string(),
    })
}
