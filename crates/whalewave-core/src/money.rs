//! Decimal money helpers.
//!
//! Every balance, fee and PnL figure is a [`Decimal`] rounded half-down
//! (ties toward zero) to a fixed number of decimal places.

use num_traits::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept for monetary values unless configured otherwise.
pub const DEFAULT_MONEY_SCALE: u32 = 8;

/// Round a monetary value half-down to `scale` decimal places.
#[inline]
pub fn round_money(value: Decimal, scale: u32) -> Decimal {
    value.round_dp_with_strategy(scale, RoundingStrategy::MidpointTowardZero)
}

/// Convert a floating-point price into the money domain.
///
/// Returns `None` for NaN or infinite values, which have no decimal form.
pub fn price_to_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::try_from(value).ok()
}

/// Convert a decimal back to `f64` for reporting and indicator comparisons.
pub fn decimal_to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}
