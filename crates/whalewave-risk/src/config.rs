//! Risk engine configuration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use whalewave_core::error::{WhaleError, WhaleResult};
use whalewave_core::money::DEFAULT_MONEY_SCALE;

/// Risk management configuration.
///
/// Percentages are expressed as percent (1.5 means 1.5%); rates are
/// fractions (0.00055 means 5.5 basis points).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Share of balance put at risk per trade
    pub risk_pct: Decimal,
    /// Maximum notional as a multiple of balance
    pub leverage_cap: Decimal,
    /// Drawdown from start balance that halts trading
    pub max_drawdown_pct: Decimal,
    /// Daily loss relative to start balance that halts trading
    pub daily_loss_limit_pct: Decimal,
    /// Taker fee charged on each fill's notional
    pub fee_rate: Decimal,
    /// Adverse price adjustment applied to each fill
    pub slippage_rate: Decimal,
    pub start_balance: Decimal,
    /// Decimal places kept on every monetary value
    pub money_scale: u32,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            risk_pct: dec!(1.5),
            leverage_cap: dec!(10),
            max_drawdown_pct: dec!(10),
            daily_loss_limit_pct: dec!(5),
            fee_rate: dec!(0.00055),
            slippage_rate: dec!(0.0001),
            start_balance: dec!(1000),
            money_scale: DEFAULT_MONEY_SCALE,
        }
    }
}

impl RiskConfig {
    pub fn validate(&self) -> WhaleResult<()> {
        if self.start_balance <= Decimal::ZERO {
            return Err(WhaleError::Config("start_balance must be positive".into()));
        }
        if self.risk_pct <= Decimal::ZERO || self.risk_pct > dec!(100) {
            return Err(WhaleError::Config(
                "risk_pct must be within (0, 100]".into(),
            ));
        }
        if self.leverage_cap <= Decimal::ZERO {
            return Err(WhaleError::Config("leverage_cap must be positive".into()));
        }
        if self.max_drawdown_pct <= Decimal::ZERO || self.daily_loss_limit_pct <= Decimal::ZERO {
            return Err(WhaleError::Config(
                "circuit breaker limits must be positive".into(),
            ));
        }
        if self.fee_rate < Decimal::ZERO || self.fee_rate >= Decimal::ONE {
            return Err(WhaleError::Config("fee_rate must be within [0, 1)".into()));
        }
        if self.slippage_rate < Decimal::ZERO || self.slippage_rate >= Decimal::ONE {
            return Err(WhaleError::Config(
                "slippage_rate must be within [0, 1)".into(),
            ));
        }
        if self.money_scale > 18 {
            return Err(WhaleError::Config("money_scale must be at most 18".into()));
        }
        Ok(())
    }
}
