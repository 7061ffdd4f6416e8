//! Per-cycle reports and session statistics.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use whalewave_core::money::decimal_to_f64;
use whalewave_core::types::{Action, StrategyDecision};
use whalewave_risk::{AccountState, BreakerStatus, RiskAction, TradeEvent, TradeEventKind};
use whalewave_scoring::{IndicatorContext, WssResult};
use whalewave_strategy::GateOutcome;

/// Serializable view of a [`GateOutcome`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateSummary {
    /// Effective action after demotion
    pub action: Action,
    pub approved: bool,
    pub rejected: bool,
    pub detail: String,
}

impl From<&GateOutcome> for GateSummary {
    fn from(outcome: &GateOutcome) -> Self {
        Self {
            action: outcome.action(),
            approved: outcome.is_approved(),
            rejected: outcome.is_rejected(),
            detail: outcome.describe(),
        }
    }
}

/// Everything that happened in one evaluated cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle: u64,
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    /// Full indicator summary the score was computed from
    pub context: IndicatorContext,
    pub wss: WssResult,
    /// Decision as proposed by the oracle
    pub decision: StrategyDecision,
    pub gate: GateSummary,
    pub risk_action: RiskAction,
    /// Opens and closes recorded this cycle
    pub events: Vec<TradeEvent>,
    /// Account after the cycle
    pub account: AccountState,
    pub equity: Decimal,
    pub breaker: BreakerStatus,
}

impl CycleReport {
    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// One-line summary for logs.
    pub fn summary(&self) -> String {
        let position = match &self.account.position {
            Some(p) => format!("{} {} @ {}", p.side, p.quantity, p.entry_price),
            None => "flat".to_string(),
        };
        format!(
            "#{} {} {} price {:.2} | WSS {:+.2}/{:.2} | {} | {} | balance {:.2} equity {:.2}",
            self.cycle,
            self.symbol,
            self.timestamp.format("%Y-%m-%d %H:%M"),
            self.price,
            self.wss.score,
            self.wss.action_threshold,
            self.gate.detail,
            position,
            self.account.balance,
            self.equity
        )
    }
}

/// Running statistics over a session of cycles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    pub start_balance: Decimal,
    pub final_equity: Decimal,
    pub cycles: u64,
    pub skipped_cycles: u64,
    pub approved_decisions: u64,
    pub rejected_decisions: u64,
    pub trades_opened: u64,
    pub trades_closed: u64,
    pub winning_trades: u64,
    pub losing_trades: u64,
    pub gross_profit: Decimal,
    pub gross_loss: Decimal,
    pub fees_paid: Decimal,
    /// Peak-to-trough equity drawdown
    pub max_drawdown_pct: Decimal,
    pub breaker_trips: u64,
    /// Equity per evaluated cycle
    pub equity_curve: Vec<(i64, Decimal)>,
    peak_equity: Decimal,
}

impl SessionStats {
    pub fn new(start_balance: Decimal) -> Self {
        Self {
            start_balance,
            final_equity: start_balance,
            cycles: 0,
            skipped_cycles: 0,
            approved_decisions: 0,
            rejected_decisions: 0,
            trades_opened: 0,
            trades_closed: 0,
            winning_trades: 0,
            losing_trades: 0,
            gross_profit: Decimal::ZERO,
            gross_loss: Decimal::ZERO,
            fees_paid: Decimal::ZERO,
            max_drawdown_pct: Decimal::ZERO,
            breaker_trips: 0,
            equity_curve: Vec::new(),
            peak_equity: start_balance,
        }
    }

    /// Fold one cycle into the statistics.
    pub fn record(&mut self, report: &CycleReport) {
        self.cycles += 1;
        if report.gate.approved {
            self.approved_decisions += 1;
        }
        if report.gate.rejected {
            self.rejected_decisions += 1;
        }
        if matches!(report.risk_action, RiskAction::Halted { .. }) {
            self.breaker_trips += 1;
        }

        for event in &report.events {
            self.fees_paid += event.fee;
            match event.kind {
                TradeEventKind::Open => self.trades_opened += 1,
                TradeEventKind::Close => {
                    self.trades_closed += 1;
                    let net = event.net_pnl.unwrap_or_default();
                    if net > Decimal::ZERO {
                        self.winning_trades += 1;
                        self.gross_profit += net;
                    } else {
                        self.losing_trades += 1;
                        self.gross_loss += net.abs();
                    }
                }
            }
        }

        let equity = report.equity;
        self.final_equity = equity;
        self.equity_curve
            .push((report.timestamp.timestamp_millis(), equity));

        if equity > self.peak_equity {
            self.peak_equity = equity;
        }
        if self.peak_equity > Decimal::ZERO {
            let drawdown = (self.peak_equity - equity) / self.peak_equity * dec!(100);
            if drawdown > self.max_drawdown_pct {
                self.max_drawdown_pct = drawdown;
            }
        }
    }

    pub fn record_skip(&mut self) {
        self.skipped_cycles += 1;
    }

    pub fn total_return_pct(&self) -> Decimal {
        if self.start_balance <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        (self.final_equity - self.start_balance) / self.start_balance * dec!(100)
    }

    pub fn win_rate_pct(&self) -> Decimal {
        if self.trades_closed == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(self.winning_trades * 100) / Decimal::from(self.trades_closed)
    }

    /// Gross profit over gross loss, zero without losses.
    pub fn profit_factor(&self) -> Decimal {
        if self.gross_loss > Decimal::ZERO {
            self.gross_profit / self.gross_loss
        } else {
            Decimal::ZERO
        }
    }

    /// Annualized Sharpe ratio of per-cycle equity returns (risk-free rate 0).
    pub fn sharpe_ratio(&self, periods_per_year: f64) -> f64 {
        let returns: Vec<f64> = self
            .equity_curve
            .windows(2)
            .filter(|w| w[0].1 > Decimal::ZERO)
            .map(|w| decimal_to_f64((w[1].1 - w[0].1) / w[0].1))
            .collect();
        if returns.len() < 2 {
            return 0.0;
        }

        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
        let std_dev = variance.sqrt();
        if std_dev > 0.0 {
            mean / std_dev * periods_per_year.sqrt()
        } else {
            0.0
        }
    }

    /// Generate a text summary.
    pub fn summary(&self, account: &AccountState, periods_per_year: f64) -> String {
        let mut s = String::new();

        s.push_str("═══════════════════════════════════════════════════════════\n");
        s.push_str("                     SESSION REPORT                         \n");
        s.push_str("═══════════════════════════════════════════════════════════\n\n");

        s.push_str("PERFORMANCE\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!("  Start Balance:       {:.2}\n", self.start_balance));
        s.push_str(&format!("  Final Balance:       {:.2}\n", account.balance));
        s.push_str(&format!("  Final Equity:        {:.2}\n", self.final_equity));
        s.push_str(&format!("  Total Return:        {:.2}%\n", self.total_return_pct()));
        s.push_str(&format!("  Max Drawdown:        {:.2}%\n", self.max_drawdown_pct));
        s.push_str(&format!(
            "  Sharpe Ratio:        {:.2}\n",
            self.sharpe_ratio(periods_per_year)
        ));
        s.push_str(&format!("  Profit Factor:       {:.2}\n", self.profit_factor()));
        s.push_str(&format!("  Fees Paid:           {:.2}\n", self.fees_paid));
        s.push('\n');

        s.push_str("TRADES\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!("  Opened:              {}\n", self.trades_opened));
        s.push_str(&format!("  Closed:              {}\n", self.trades_closed));
        s.push_str(&format!("  Winning:             {}\n", self.winning_trades));
        s.push_str(&format!("  Losing:              {}\n", self.losing_trades));
        s.push_str(&format!("  Win Rate:            {:.2}%\n", self.win_rate_pct()));
        s.push('\n');

        s.push_str("CYCLES\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!("  Evaluated:           {}\n", self.cycles));
        s.push_str(&format!("  Skipped:             {}\n", self.skipped_cycles));
        s.push_str(&format!("  Approved Decisions:  {}\n", self.approved_decisions));
        s.push_str(&format!("  Rejected Decisions:  {}\n", self.rejected_decisions));
        s.push_str(&format!("  Breaker Halts:       {}\n", self.breaker_trips));
        s.push('\n');

        s.push_str("═══════════════════════════════════════════════════════════\n");

        s
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export the equity curve as CSV.
    pub fn equity_to_csv(&self) -> String {
        let mut csv = String::from("timestamp,equity\n");
        for (ts, equity) in &self.equity_curve {
            csv.push_str(&format!("{},{}\n", ts, equity));
        }
        csv
    }
}
