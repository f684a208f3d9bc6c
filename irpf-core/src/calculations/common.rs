//! Common utility functions for tax calculations.
//!
//! Rounding and comparison helpers used by the tax engine.

use rust_decimal::{Decimal, RoundingStrategy};

/// Nudge added before rounding currency amounts so that figures sitting a
/// hair below a half cent still round up.
pub const CURRENCY_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 9);

/// Rounds a currency amount to two decimal places, half-up.
///
/// [`CURRENCY_EPSILON`] is added first, so exact half cents go up for both
/// positive and negative values (toward positive infinity).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use irpf_core::calculations::common::round_currency;
///
/// assert_eq!(round_currency(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_currency(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_currency(dec!(1322.86275)), dec!(1322.86));
/// assert_eq!(round_currency(dec!(-0.005)), dec!(0.00));
/// ```
pub fn round_currency(value: Decimal) -> Decimal {
    (value + CURRENCY_EPSILON).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a percentage to `decimal_places`, half away from zero.
///
/// ```
/// use rust_decimal_macros::dec;
/// use irpf_core::calculations::common::round_rate;
///
/// assert_eq!(round_rate(dec!(8.537255), 4), dec!(8.5373));
/// assert_eq!(round_rate(dec!(8.537255), 2), dec!(8.54));
/// ```
pub fn round_rate(
    value: Decimal,
    decimal_places: u32,
) -> Decimal {
    value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the maximum of two decimal values.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use irpf_core::calculations::common::max;
///
/// assert_eq!(max(dec!(100.00), dec!(200.00)), dec!(200.00));
/// assert_eq!(max(dec!(-100.00), dec!(-200.00)), dec!(-100.00));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}
