//! Account ledger, open position and trade journal entries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use whalewave_core::money::decimal_to_f64;
use whalewave_core::types::Side;

/// The single open position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub side: Side,
    /// Slippage-adjusted execution price
    pub entry_price: Decimal,
    pub quantity: Decimal,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    pub strategy_label: String,
    pub opened_at: DateTime<Utc>,
    pub entry_fee: Decimal,
}

impl Position {
    /// Notional at entry.
    pub fn notional(&self) -> Decimal {
        self.entry_price * self.quantity
    }

    /// Gross PnL if closed at `price`, before fees and slippage.
    pub fn pnl_at(&self, price: Decimal) -> Decimal {
        (price - self.entry_price)
            .saturating_mul(self.quantity)
            .saturating_mul(self.side.sign())
    }

    /// Exit triggered by `price`, if any.
    pub fn exit_trigger(&self, price: Decimal) -> Option<ExitReason> {
        match self.side {
            Side::Buy if price <= self.stop_loss => Some(ExitReason::StopLoss),
            Side::Buy if price >= self.take_profit => Some(ExitReason::TakeProfit),
            Side::Sell if price >= self.stop_loss => Some(ExitReason::StopLoss),
            Side::Sell if price <= self.take_profit => Some(ExitReason::TakeProfit),
            _ => None,
        }
    }
}

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    #[serde(rename = "SL Hit")]
    StopLoss,
    #[serde(rename = "TP Hit")]
    TakeProfit,
    #[serde(rename = "RISK_STOP")]
    RiskStop,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExitReason::StopLoss => "SL Hit",
            ExitReason::TakeProfit => "TP Hit",
            ExitReason::RiskStop => "RISK_STOP",
        };
        write!(f, "{}", s)
    }
}

/// Balance sheet of the simulated account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountState {
    pub balance: Decimal,
    /// Anchor for drawdown and daily loss percentages
    pub start_balance: Decimal,
    pub daily_pnl: Decimal,
    pub position: Option<Position>,
    /// Sum of net close PnL
    pub realized_pnl: Decimal,
    /// Entry and exit fees paid
    pub total_fees: Decimal,
    pub trades_closed: u32,
    pub wins: u32,
    pub losses: u32,
}

impl AccountState {
    pub fn new(start_balance: Decimal) -> Self {
        Self {
            balance: start_balance,
            start_balance,
            daily_pnl: Decimal::ZERO,
            position: None,
            realized_pnl: Decimal::ZERO,
            total_fees: Decimal::ZERO,
            trades_closed: 0,
            wins: 0,
            losses: 0,
        }
    }

    pub fn has_position(&self) -> bool {
        self.position.is_some()
    }

    /// (start - balance) / start * 100
    pub fn drawdown_pct(&self) -> Decimal {
        if self.start_balance <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        (self.start_balance - self.balance) / self.start_balance * dec!(100)
    }

    /// daily_pnl / start * 100
    pub fn daily_pnl_pct(&self) -> Decimal {
        if self.start_balance <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        self.daily_pnl / self.start_balance * dec!(100)
    }

    pub fn win_rate(&self) -> f64 {
        if self.trades_closed == 0 {
            0.0
        } else {
            f64::from(self.wins) / f64::from(self.trades_closed)
        }
    }

    /// Balance as `f64` for display.
    pub fn balance_f64(&self) -> f64 {
        decimal_to_f64(self.balance)
    }
}

/// Open or close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeEventKind {
    Open,
    Close,
}

/// One fill in the trade journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub kind: TradeEventKind,
    pub side: Side,
    pub strategy_label: String,
    pub exec_price: Decimal,
    pub quantity: Decimal,
    pub fee: Decimal,
    /// Net PnL of the close, after the exit fee
    pub net_pnl: Option<Decimal>,
    pub reason: String,
}

impl fmt::Display for TradeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TradeEventKind::Open => write!(
                f,
                "OPEN {} {} @ {} (fee {}) [{}]",
                self.side, self.quantity, self.exec_price, self.fee, self.strategy_label
            ),
            TradeEventKind::Close => write!(
                f,
                "CLOSE {} {} @ {} net {} ({})",
                self.side,
                self.quantity,
                self.exec_price,
                self.net_pnl.unwrap_or_default(),
                self.reason
            ),
        }
    }
}
