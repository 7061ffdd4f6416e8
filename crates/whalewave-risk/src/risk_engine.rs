//! Single-position risk engine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;
use whalewave_core::money::round_money;
use whalewave_core::types::{Side, ValidatedDecision};

use crate::account::{AccountState, ExitReason, Position, TradeEvent, TradeEventKind};
use crate::circuit_breaker::BreakerStatus;
use crate::config::RiskConfig;
use crate::position_sizer::{size_position, SizingError};

/// Why an approved decision did not open a position.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenError {
    #[error("position already open")]
    AlreadyOpen,
    #[error(transparent)]
    Sizing(#[from] SizingError),
}

/// What [`RiskEngine::evaluate`] did this cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RiskAction {
    /// A breaker is tripped; any open position was force-closed
    Halted { status: BreakerStatus },
    Closed { reason: ExitReason },
    Opened,
    /// Position open and no exit triggered
    Holding,
    /// Flat and nothing to open
    Idle,
    /// Approved decision that could not be sized
    Skipped { reason: String },
}

/// Owns the account and enforces sizing, exits and circuit breakers.
///
/// Every monetary value is rounded half-down to the configured scale right
/// after it is computed.
#[derive(Debug, Clone)]
pub struct RiskEngine {
    config: RiskConfig,
    account: AccountState,
    journal: Vec<TradeEvent>,
}

impl RiskEngine {
    pub fn new(config: RiskConfig) -> Self {
        let account = AccountState::new(config.start_balance);
        Self {
            config,
            account,
            journal: Vec::new(),
        }
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    pub fn account(&self) -> &AccountState {
        &self.account
    }

    pub fn position(&self) -> Option<&Position> {
        self.account.position.as_ref()
    }

    fn round(&self, value: Decimal) -> Decimal {
        round_money(value, self.config.money_scale)
    }

    /// Side-effect-free breaker query.
    pub fn breaker(&self) -> BreakerStatus {
        BreakerStatus::check(&self.account, &self.config)
    }

    /// Whether new risk may be taken.
    ///
    /// A tripped breaker force-closes any open position at `mark_price`.
    pub fn can_trade(&mut self, mark_price: Decimal, at: DateTime<Utc>) -> bool {
        let status = self.breaker();
        if !status.is_tripped() {
            return true;
        }

        if self.account.has_position() {
            warn!("Circuit breaker tripped ({}), closing open position", status);
            self.close_position(mark_price, ExitReason::RiskStop, at);
        }
        false
    }

    /// Run one cycle: breakers, then exits for an open position, else entry.
    pub fn evaluate(
        &mut self,
        price: Decimal,
        gated: Option<&ValidatedDecision>,
        at: DateTime<Utc>,
    ) -> RiskAction {
        if !self.can_trade(price, at) {
            return RiskAction::Halted {
                status: self.breaker(),
            };
        }

        if let Some(position) = &self.account.position {
            return match position.exit_trigger(price) {
                Some(reason) => {
                    self.close_position(price, reason, at);
                    RiskAction::Closed { reason }
                }
                None => RiskAction::Holding,
            };
        }

        match gated {
            Some(decision) => match self.open_position(decision, at) {
                Ok(_) => RiskAction::Opened,
                Err(err) => RiskAction::Skipped {
                    reason: err.to_string(),
                },
            },
            None => RiskAction::Idle,
        }
    }

    /// Open a position from a validated decision.
    ///
    /// The entry fee leaves the balance and daily PnL immediately. Sizing
    /// failures are logged and leave the account untouched.
    pub fn open_position(
        &mut self,
        decision: &ValidatedDecision,
        at: DateTime<Utc>,
    ) -> Result<&Position, OpenError> {
        if self.account.has_position() {
            let err = OpenError::AlreadyOpen;
            warn!("Ignoring {} {}: {}", decision.side, decision.strategy_label, err);
            return Err(err);
        }

        let scale = self.config.money_scale;
        let fill = size_position(
            self.account.balance,
            decision.entry_price,
            decision.stop_loss,
            &self.config,
            |v| round_money(v, scale),
        )
        .and_then(|sizing| {
            let slippage = match decision.side {
                Side::Buy => Decimal::ONE + self.config.slippage_rate,
                Side::Sell => Decimal::ONE - self.config.slippage_rate,
            };
            let exec_price = decision
                .entry_price
                .checked_mul(slippage)
                .map(|v| self.round(v))
                .ok_or(SizingError::Overflow)?;
            let fee = exec_price
                .checked_mul(sizing.quantity)
                .and_then(|v| v.checked_mul(self.config.fee_rate))
                .map(|v| self.round(v))
                .ok_or(SizingError::Overflow)?;
            Ok((sizing, exec_price, fee))
        });

        let (sizing, exec_price, fee) = match fill {
            Ok(fill) => fill,
            Err(err) => {
                warn!(
                    "Ignoring {} {} at {}: {}",
                    decision.side, decision.strategy_label, decision.entry_price, err
                );
                return Err(err.into());
            }
        };

        self.account.balance = self.round(self.account.balance - fee);
        self.account.daily_pnl = self.round(self.account.daily_pnl - fee);
        self.account.total_fees = self.round(self.account.total_fees + fee);

        info!(
            "Opened {} {} @ {} (risk {}, fee {}, SL {}, TP {}) [{}]",
            decision.side,
            sizing.quantity,
            exec_price,
            sizing.risk_amount,
            fee,
            decision.stop_loss,
            decision.take_profit,
            decision.strategy_label
        );

        self.journal.push(TradeEvent {
            id: Uuid::new_v4(),
            timestamp: at,
            kind: TradeEventKind::Open,
            side: decision.side,
            strategy_label: decision.strategy_label.clone(),
            exec_price,
            quantity: sizing.quantity,
            fee,
            net_pnl: None,
            reason: decision.reason.clone(),
        });

        Ok(&*self.account.position.insert(Position {
            side: decision.side,
            entry_price: exec_price,
            quantity: sizing.quantity,
            stop_loss: decision.stop_loss,
            take_profit: decision.take_profit,
            strategy_label: decision.strategy_label.clone(),
            opened_at: at,
            entry_fee: fee,
        }))
    }

    /// Close the open position at `price`; returns the net PnL.
    pub fn close_position(
        &mut self,
        price: Decimal,
        reason: ExitReason,
        at: DateTime<Utc>,
    ) -> Option<Decimal> {
        let position = self.account.position.take()?;

        let slippage = match position.side {
            Side::Buy => Decimal::ONE - self.config.slippage_rate,
            Side::Sell => Decimal::ONE + self.config.slippage_rate,
        };
        let exec_price = self.round(price.saturating_mul(slippage));
        let raw = self.round(position.pnl_at(exec_price));
        let fee = self.round(
            exec_price
                .saturating_mul(position.quantity)
                .saturating_mul(self.config.fee_rate),
        );
        let net = self.round(raw.saturating_sub(fee));

        self.account.balance = self.round(self.account.balance.saturating_add(net));
        self.account.daily_pnl = self.round(self.account.daily_pnl.saturating_add(net));
        self.account.realized_pnl = self.round(self.account.realized_pnl.saturating_add(net));
        self.account.total_fees = self.round(self.account.total_fees + fee);
        self.account.trades_closed += 1;
        if net > Decimal::ZERO {
            self.account.wins += 1;
        } else {
            self.account.losses += 1;
        }

        info!(
            "Closed {} {} @ {} ({}): gross {}, fee {}, net {}, balance {}",
            position.side,
            position.quantity,
            exec_price,
            reason,
            raw,
            fee,
            net,
            self.account.balance
        );

        self.journal.push(TradeEvent {
            id: Uuid::new_v4(),
            timestamp: at,
            kind: TradeEventKind::Close,
            side: position.side,
            strategy_label: position.strategy_label,
            exec_price,
            quantity: position.quantity,
            fee,
            net_pnl: Some(net),
            reason: reason.to_string(),
        });

        Some(net)
    }

    /// Zero the daily PnL at a day boundary.
    pub fn reset_daily(&mut self) {
        self.account.daily_pnl = Decimal::ZERO;
    }

    /// Re-anchor the start balance to the current balance.
    ///
    /// Clears a drawdown trip; used as a manual reset.
    pub fn rebase_start_balance(&mut self) {
        info!(
            "Start balance rebased from {} to {}",
            self.account.start_balance, self.account.balance
        );
        self.account.start_balance = self.account.balance;
    }

    /// Mark-to-market PnL of the open position, zero when flat.
    pub fn unrealized_pnl(&self, mark_price: Decimal) -> Decimal {
        self.account
            .position
            .as_ref()
            .map_or(Decimal::ZERO, |p| self.round(p.pnl_at(mark_price)))
    }

    /// Balance plus unrealized PnL.
    pub fn equity(&self, mark_price: Decimal) -> Decimal {
        self.round(
            self.account
                .balance
                .saturating_add(self.unrealized_pnl(mark_price)),
        )
    }

    /// Take the trade events recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<TradeEvent> {
        std::mem::take(&mut self.journal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::default()
    }

    fn zero_slippage() -> RiskConfig {
        RiskConfig {
            slippage_rate: Decimal::ZERO,
            ..Default::default()
        }
    }

    fn buy(entry: Decimal, stop: Decimal, target: Decimal) -> ValidatedDecision {
        ValidatedDecision {
            side: Side::Buy,
            strategy_label: "BREAKOUT".to_string(),
            confidence: 0.8,
            entry_price: entry,
            stop_loss: stop,
            take_profit: target,
            reason: String::new(),
        }
    }

    #[test]
    fn test_take_profit_round_trip() {
        let mut engine = RiskEngine::new(zero_slippage());
        let decision = buy(dec!(50000), dec!(49500), dec!(50750));

        assert_eq!(
            engine.evaluate(dec!(50000), Some(&decision), now()),
            RiskAction::Opened
        );
        let position = engine.position().unwrap();
        assert_eq!(position.quantity, dec!(0.03));
        assert_eq!(position.entry_fee, dec!(0.825));
        assert_eq!(engine.account().balance, dec!(999.175));

        assert_eq!(
            engine.evaluate(dec!(50750), None, now()),
            RiskAction::Closed {
                reason: ExitReason::TakeProfit
            }
        );

        let account = engine.account();
        assert!(account.position.is_none());
        assert_eq!(account.balance, dec!(1020.837625));
        assert_eq!(account.realized_pnl, dec!(21.662625));
        assert_eq!(account.total_fees, dec!(1.662375));
        assert_eq!(account.daily_pnl, dec!(20.837625));
        assert_eq!(account.wins, 1);

        let events = engine.drain_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].fee, dec!(0.837375));
        assert_eq!(events[1].net_pnl, Some(dec!(21.662625)));
        assert_eq!(events[1].reason, "TP Hit");
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn test_zero_cost_round_trip_nets_zero() {
        let mut engine = RiskEngine::new(RiskConfig {
            fee_rate: Decimal::ZERO,
            slippage_rate: Decimal::ZERO,
            ..Default::default()
        });
        engine
            .open_position(&buy(dec!(100), dec!(95), dec!(110)), now())
            .unwrap();

        let net = engine.close_position(dec!(100), ExitReason::RiskStop, now());
        assert_eq!(net, Some(Decimal::ZERO));
        assert_eq!(engine.account().balance, dec!(1000));
    }

    #[test]
    fn test_drawdown_forces_risk_stop() {
        let mut engine = RiskEngine::new(zero_slippage());
        engine
            .open_position(&buy(dec!(100), dec!(95), dec!(110)), now())
            .unwrap();
        engine.drain_events();

        engine.account.balance = dec!(899);
        assert!(!engine.can_trade(dec!(99), now()));
        assert!(engine.position().is_none());

        let events = engine.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].reason, "RISK_STOP");
    }

    #[test]
    fn test_halted_engine_does_not_open() {
        let mut engine = RiskEngine::new(zero_slippage());
        engine.account.daily_pnl = dec!(-60);

        let action = engine.evaluate(dec!(100), Some(&buy(dec!(100), dec!(95), dec!(110))), now());
        assert!(matches!(action, RiskAction::Halted { .. }));
        assert!(engine.position().is_none());

        engine.reset_daily();
        assert_eq!(
            engine.evaluate(dec!(100), Some(&buy(dec!(100), dec!(95), dec!(110))), now()),
            RiskAction::Opened
        );
    }

    #[test]
    fn test_rebase_clears_drawdown() {
        let mut engine = RiskEngine::new(zero_slippage());
        engine.account.balance = dec!(850);
        assert!(engine.breaker().is_tripped());

        engine.rebase_start_balance();
        assert!(!engine.breaker().is_tripped());
        assert_eq!(engine.account().start_balance, dec!(850));
    }

    #[test]
    fn test_stop_loss_short_with_slippage() {
        let mut engine = RiskEngine::new(RiskConfig {
            fee_rate: Decimal::ZERO,
            slippage_rate: dec!(0.001),
            ..Default::default()
        });
        let decision = ValidatedDecision {
            side: Side::Sell,
            strategy_label: "FADE".to_string(),
            confidence: 0.9,
            entry_price: dec!(100),
            stop_loss: dec!(105),
            take_profit: dec!(90),
            reason: String::new(),
        };
        engine.open_position(&decision, now()).unwrap();
        // Sell fills below the quote
        assert_eq!(engine.position().unwrap().entry_price, dec!(99.9));
        assert_eq!(engine.position().unwrap().quantity, dec!(3));

        assert_eq!(
            engine.evaluate(dec!(105), None, now()),
            RiskAction::Closed {
                reason: ExitReason::StopLoss
            }
        );
        // Buy back at 105.105: (99.9 - 105.105) * 3
        assert_eq!(engine.account().realized_pnl, dec!(-15.615));
        assert_eq!(engine.account().losses, 1);
    }

    #[test]
    fn test_unrealized_and_equity() {
        let mut engine = RiskEngine::new(zero_slippage());
        assert_eq!(engine.unrealized_pnl(dec!(100)), Decimal::ZERO);

        engine
            .open_position(&buy(dec!(100), dec!(95), dec!(110)), now())
            .unwrap();
        // qty 3, entry fee 100 * 3 * 0.00055 = 0.165
        assert_eq!(engine.unrealized_pnl(dec!(102)), dec!(6));
        assert_eq!(engine.equity(dec!(102)), dec!(1005.835));
    }

    #[test]
    fn test_second_open_rejected() {
        let mut engine = RiskEngine::new(zero_slippage());
        let decision = buy(dec!(100), dec!(95), dec!(110));
        engine.open_position(&decision, now()).unwrap();
        assert_eq!(
            engine.open_position(&decision, now()).unwrap_err(),
            OpenError::AlreadyOpen
        );
        assert_eq!(engine.drain_events().len(), 1);
    }

    #[test]
    fn test_zero_stop_distance_is_noop() {
        let mut engine = RiskEngine::new(zero_slippage());
        let action = engine.evaluate(
            dec!(100),
            Some(&buy(dec!(100), dec!(100), dec!(110))),
            now(),
        );
        assert!(matches!(action, RiskAction::Skipped { .. }));
        assert_eq!(engine.account().balance, dec!(1000));
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn test_dust_prices_are_skipped_not_panicking() {
        let mut engine = RiskEngine::new(RiskConfig::default());
        let scientific = |v: &str| Decimal::from_scientific(v).unwrap();
        let decision = buy(scientific("1e-25"), scientific("5e-26"), scientific("2e-25"));

        let action = engine.evaluate(scientific("1e-25"), Some(&decision), now());

        assert_eq!(
            action,
            RiskAction::Skipped {
                reason: SizingError::Overflow.to_string()
            }
        );
        assert!(!engine.account().has_position());
        assert_eq!(engine.account().balance, dec!(1000));
        assert!(engine.drain_events().is_empty());
    }
}
