//! Payment status derivation.
//!
//! Status is a projection of `(grand_total, amount_paid)` and is re-derived
//! whenever either changes. The rules are applied in order:
//!
//! 1. `amount_paid ≥ grand_total` → [`PaymentStatus::Paid`]
//!    (a zero grand total is therefore always paid)
//! 2. `amount_paid > 0` → [`PaymentStatus::Partial`]
//! 3. otherwise → [`PaymentStatus::Unpaid`]

use rust_decimal::Decimal;

use crate::calculations::common::floor_at_zero;
use crate::models::PaymentStatus;

#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentStatusResolver;

impl PaymentStatusResolver {
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use gst_core::PaymentStatus;
    /// use gst_core::calculations::PaymentStatusResolver;
    ///
    /// assert_eq!(PaymentStatusResolver::resolve(dec!(1145.50), dec!(500)), PaymentStatus::Partial);
    /// assert_eq!(PaymentStatusResolver::resolve(dec!(0), dec!(0)), PaymentStatus::Paid);
    /// ```
    pub fn resolve(
        grand_total: Decimal,
        amount_paid: Decimal,
    ) -> PaymentStatus {
        if amount_paid >= grand_total {
            PaymentStatus::Paid
        } else if amount_paid > Decimal::ZERO {
            PaymentStatus::Partial
        } else {
            PaymentStatus::Unpaid
        }
    }

    /// Outstanding amount; never negative, overpayment yields zero.
    pub fn balance_due(
        grand_total: Decimal,
        amount_paid: Decimal,
    ) -> Decimal {
        floor_at_zero(grand_total - amount_paid)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn resolve_exact_payment_is_paid() {
        assert_eq!(
            PaymentStatusResolver::resolve(dec!(236), dec!(236)),
            PaymentStatus::Paid
        );
    }

    #[test]
    fn resolve_overpayment_is_paid() {
        assert_eq!(
            PaymentStatusResolver::resolve(dec!(236), dec!(300)),
            PaymentStatus::Paid
        );
    }

    #[test]
    fn resolve_some_payment_is_partial() {
        assert_eq!(
            PaymentStatusResolver::resolve(dec!(1145.5), dec!(500)),
            PaymentStatus::Partial
        );
    }

    #[test]
    fn resolve_one_paisa_short_is_partial() {
        assert_eq!(
            PaymentStatusResolver::resolve(dec!(1145.50), dec!(1145.49)),
            PaymentStatus::Partial
        );
    }

    #[test]
    fn resolve_nothing_paid_is_unpaid() {
        assert_eq!(
            PaymentStatusResolver::resolve(dec!(1145.5), dec!(0)),
            PaymentStatus::Unpaid
        );
    }

    #[test]
    fn resolve_zero_total_is_paid() {
        assert_eq!(
            PaymentStatusResolver::resolve(dec!(0), dec!(0)),
            PaymentStatus::Paid
        );
    }

    #[test]
    fn balance_due_is_remaining_amount() {
        assert_eq!(
            PaymentStatusResolver::balance_due(dec!(1145.5), dec!(500)),
            dec!(645.5)
        );
    }

    #[test]
    fn balance_due_is_zero_when_overpaid() {
        assert_eq!(
            PaymentStatusResolver::balance_due(dec!(236), dec!(250)),
            dec!(0)
        );
    }
}
