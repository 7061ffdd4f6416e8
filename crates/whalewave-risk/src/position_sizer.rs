//! Fixed-fractional position sizing.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;

use crate::config::RiskConfig;

/// Why no position size could be produced.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizingError {
    /// Entry equals stop
    #[error("stop distance is zero")]
    ZeroStopDistance,
    /// Sizing rounded to nothing or the balance is exhausted
    #[error("quantity is not positive")]
    NonPositiveQuantity,
    /// Prices too small or large for decimal arithmetic
    #[error("position size is out of decimal range")]
    Overflow,
}

/// Position size and the risk it carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sizing {
    pub risk_amount: Decimal,
    pub quantity: Decimal,
    /// The leverage cap bound the quantity
    pub capped: bool,
}

/// Size a trade so that hitting the stop loses `risk_pct` of the balance.
///
/// The quantity is capped so notional never exceeds `balance * leverage_cap`.
/// Both figures are rounded with `round`.
pub fn size_position(
    balance: Decimal,
    entry: Decimal,
    stop_loss: Decimal,
    config: &RiskConfig,
    round: impl Fn(Decimal) -> Decimal,
) -> Result<Sizing, SizingError> {
    let stop_distance = (entry - stop_loss).abs();
    if stop_distance.is_zero() {
        return Err(SizingError::ZeroStopDistance);
    }
    if entry <= Decimal::ZERO || balance <= Decimal::ZERO {
        return Err(SizingError::NonPositiveQuantity);
    }

    let risk_amount = balance
        .checked_mul(config.risk_pct)
        .and_then(|v| v.checked_div(dec!(100)))
        .map(&round)
        .ok_or(SizingError::Overflow)?;
    let by_risk = risk_amount
        .checked_div(stop_distance)
        .ok_or(SizingError::Overflow)?;
    let by_leverage = balance
        .checked_mul(config.leverage_cap)
        .and_then(|v| v.checked_div(entry))
        .ok_or(SizingError::Overflow)?;
    let capped = by_leverage < by_risk;
    let quantity = round(by_risk.min(by_leverage));

    if quantity <= Decimal::ZERO {
        return Err(SizingError::NonPositiveQuantity);
    }

    Ok(Sizing {
        risk_amount,
        quantity,
        capped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use whalewave_core::money::round_money;

    fn round8(value: Decimal) -> Decimal {
        round_money(value, 8)
    }

    #[test]
    fn test_fixed_fractional() {
        let config = RiskConfig::default();
        let sizing =
            size_position(dec!(1000), dec!(50000), dec!(49500), &config, round8).unwrap();

        assert_eq!(sizing.risk_amount, dec!(15));
        assert_eq!(sizing.quantity, dec!(0.03));
        assert!(!sizing.capped);
    }

    #[test]
    fn test_leverage_cap_binds_tight_stops() {
        let config = RiskConfig::default();
        // Risk sizing wants 15 / 1 = 15 units, cap allows 1000 * 10 / 100 = 100
        let loose = size_position(dec!(1000), dec!(100), dec!(99), &config, round8).unwrap();
        assert_eq!(loose.quantity, dec!(15));

        // 15 / 0.01 = 1500 units, capped at 100
        let tight = size_position(dec!(1000), dec!(100), dec!(99.99), &config, round8).unwrap();
        assert_eq!(tight.quantity, dec!(100));
        assert!(tight.capped);
    }

    #[test]
    fn test_zero_distance_and_tiny_balance() {
        let config = RiskConfig::default();
        assert_eq!(
            size_position(dec!(1000), dec!(100), dec!(100), &config, round8),
            Err(SizingError::ZeroStopDistance)
        );
        assert_eq!(
            size_position(dec!(0.000001), dec!(50000), dec!(1), &config, round8),
            Err(SizingError::NonPositiveQuantity)
        );
    }

    #[test]
    fn test_dust_prices_overflow_instead_of_panicking() {
        let config = RiskConfig::default();
        let entry = Decimal::from_scientific("1e-25").unwrap();
        let stop = Decimal::from_scientific("5e-26").unwrap();

        assert_eq!(
            size_position(dec!(1000), entry, stop, &config, round8),
            Err(SizingError::Overflow)
        );
    }
}
