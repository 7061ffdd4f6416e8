//! Account-level circuit breakers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::account::AccountState;
use crate::config::RiskConfig;

/// Breaker state for the current account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BreakerStatus {
    Clear,
    MaxDrawdown { drawdown_pct: Decimal },
    DailyLoss { daily_pnl_pct: Decimal },
}

impl BreakerStatus {
    /// Evaluate both breakers; drawdown takes precedence.
    pub fn check(account: &AccountState, config: &RiskConfig) -> Self {
        let drawdown_pct = account.drawdown_pct();
        if drawdown_pct > config.max_drawdown_pct {
            return BreakerStatus::MaxDrawdown { drawdown_pct };
        }

        let daily_pnl_pct = account.daily_pnl_pct();
        if daily_pnl_pct < -config.daily_loss_limit_pct {
            return BreakerStatus::DailyLoss { daily_pnl_pct };
        }

        BreakerStatus::Clear
    }

    pub fn is_tripped(&self) -> bool {
        !matches!(self, BreakerStatus::Clear)
    }
}

impl fmt::Display for BreakerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakerStatus::Clear => write!(f, "clear"),
            BreakerStatus::MaxDrawdown { drawdown_pct } => {
                write!(f, "max drawdown exceeded: {:.2}%", drawdown_pct)
            }
            BreakerStatus::DailyLoss { daily_pnl_pct } => {
                write!(f, "daily loss limit reached: {:.2}%", daily_pnl_pct)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_drawdown_boundary_is_exclusive() {
        let config = RiskConfig::default();
        let mut account = AccountState::new(dec!(1000));

        account.balance = dec!(900);
        assert_eq!(BreakerStatus::check(&account, &config), BreakerStatus::Clear);

        account.balance = dec!(899);
        assert!(matches!(
            BreakerStatus::check(&account, &config),
            BreakerStatus::MaxDrawdown { .. }
        ));
    }

    #[test]
    fn test_daily_loss_limit() {
        let config = RiskConfig::default();
        let mut account = AccountState::new(dec!(1000));

        account.daily_pnl = dec!(-50);
        assert!(!BreakerStatus::check(&account, &config).is_tripped());

        account.daily_pnl = dec!(-50.01);
        let status = BreakerStatus::check(&account, &config);
        assert!(status.is_tripped());
        assert_eq!(status.to_string(), "daily loss limit reached: -5.00%");
    }
}
