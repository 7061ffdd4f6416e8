//! Cycle observer that reports through `tracing`.

use tracing::{debug, info, warn};
use whalewave_engine::{CycleObserver, CycleReport, SessionStats, SkippedCycle};
use whalewave_risk::{AccountState, BreakerStatus};

/// Logs every cycle, trade and skip.
#[derive(Debug, Clone, Default)]
pub struct TracingObserver {
    /// Also emit the full JSON report at debug level
    json_reports: bool,
    periods_per_year: f64,
    last_breaker: Option<BreakerStatus>,
}

impl TracingObserver {
    pub fn new(periods_per_year: f64) -> Self {
        Self {
            json_reports: false,
            periods_per_year,
            last_breaker: None,
        }
    }

    pub fn with_json_reports(mut self, enabled: bool) -> Self {
        self.json_reports = enabled;
        self
    }
}

impl CycleObserver for TracingObserver {
    fn on_cycle(&mut self, report: &CycleReport) {
        info!(
            cycle = report.cycle,
            score = report.wss.score,
            threshold = report.wss.action_threshold,
            balance = report.account.balance_f64(),
            regime = %report.context.volatility_regime(),
            "{}",
            report.summary()
        );

        for event in &report.events {
            info!(trade_id = %event.id, "{}", event);
        }

        // Only log breaker transitions, not every halted cycle
        if self.last_breaker != Some(report.breaker) {
            if report.breaker.is_tripped() {
                warn!("Trading halted: {}", report.breaker);
            } else if self.last_breaker.is_some() {
                info!("Circuit breakers clear");
            }
            self.last_breaker = Some(report.breaker);
        }

        if self.json_reports {
            match report.to_json() {
                Ok(json) => debug!("{}", json),
                Err(e) => warn!("Failed to serialize cycle report: {}", e),
            }
        }
    }

    fn on_skip(&mut self, skipped: &SkippedCycle) {
        warn!(stage = %skipped.stage, "Cycle skipped: {}", skipped.error);
    }

    fn on_finish(&mut self, stats: &SessionStats, account: &AccountState) {
        info!(
            cycles = stats.cycles,
            skipped = stats.skipped_cycles,
            trades = stats.trades_closed,
            win_rate = account.win_rate(),
            "Session finished with balance {}",
            account.balance
        );
        debug!("\n{}", stats.summary(account, self.periods_per_year));
    }
}
