//! Common utility functions for invoice calculations.
//!
//! This module provides the arithmetic shared by the valuer, the totals
//! calculator and the report aggregator: currency rounding, percentage
//! application, overflow-checked sums and the non-negative floor used for
//! balances.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to exactly two decimal places (paise) using
/// half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero. Only call this at a
/// display boundary; intermediate invoice arithmetic stays unrounded.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use gst_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Applies a percentage rate to an amount: `amount × rate / 100`.
///
/// Returns `None` if the product does not fit in a [`Decimal`].
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use gst_core::calculations::common::percent_of;
///
/// assert_eq!(percent_of(dec!(200), dec!(18)), Some(dec!(36)));
/// assert_eq!(percent_of(dec!(150), dec!(5)), Some(dec!(7.5)));
/// ```
pub fn percent_of(
    amount: Decimal,
    rate_percent: Decimal,
) -> Option<Decimal> {
    amount
        .checked_mul(rate_percent)?
        .checked_div(Decimal::ONE_HUNDRED)
}

/// Sums `values`, returning `None` on overflow.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
/// use gst_core::calculations::common::checked_sum;
///
/// assert_eq!(checked_sum([dec!(57.75), dec!(57.75)]), Some(dec!(115.50)));
/// assert_eq!(checked_sum([Decimal::MAX, dec!(1)]), None);
/// ```
pub fn checked_sum<I>(values: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |total, value| total.checked_add(value))
}

/// Returns `value` if it is positive, otherwise zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use gst_core::calculations::common::floor_at_zero;
///
/// assert_eq!(floor_at_zero(dec!(645.50)), dec!(645.50));
/// assert_eq!(floor_at_zero(dec!(-0.01)), dec!(0));
/// ```
pub fn floor_at_zero(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}
