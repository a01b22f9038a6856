//! Common utility functions for money and percentage values.

use rust_decimal::Decimal;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// This follows standard financial rounding conventions where values at exactly
/// 0.005 are rounded up to 0.01 (away from zero).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use dpr_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(250000)), dec!(250000.00));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Clamps a percentage into `[0, 100]`.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use dpr_core::calculations::common::clamp_percentage;
///
/// assert_eq!(clamp_percentage(dec!(-5)), dec!(0));
/// assert_eq!(clamp_percentage(dec!(42.5)), dec!(42.5));
/// assert_eq!(clamp_percentage(dec!(140)), dec!(100));
/// ```
pub fn clamp_percentage(value: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}
