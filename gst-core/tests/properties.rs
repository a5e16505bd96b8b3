//! Property tests for the totals engine.

use gst_core::calculations::{
    InvoiceTotalsCalculator, OverallDiscountTreatment, TotalsConfig, compute_invoice_totals,
};
use gst_core::{GstSlab, InvoiceContext, LineItem, PaymentStatus};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Rupee amounts with paise precision, up to ₹10,000.
fn rupees() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000).prop_map(|paise| Decimal::new(paise, 2))
}

/// A valid line item: whole quantity, any slab, discount up to the full
/// line amount.
fn line_item() -> impl Strategy<Value = LineItem> {
    (
        1i64..100,
        rupees(),
        0u32..=100,
        prop::sample::select(GstSlab::all().to_vec()),
    )
        .prop_map(|(quantity, unit_price, discount_percent, slab)| {
            let quantity = Decimal::from(quantity);
            let gross = quantity * unit_price;
            let discount = gross * Decimal::from(discount_percent) / Decimal::ONE_HUNDRED;
            LineItem::new(quantity, unit_price, discount, slab.percent())
        })
}

fn line_items() -> impl Strategy<Value = Vec<LineItem>> {
    prop::collection::vec(line_item(), 0..8)
}

proptest! {
    #[test]
    fn subtotal_is_additive_over_partitions(
        first in line_items(),
        second in line_items(),
    ) {
        let combined: Vec<LineItem> = first.iter().chain(second.iter()).cloned().collect();

        let a = compute_invoice_totals(&first, Decimal::ZERO, "Goa", "Goa", Decimal::ZERO).unwrap();
        let b = compute_invoice_totals(&second, Decimal::ZERO, "Goa", "Goa", Decimal::ZERO).unwrap();
        let both = compute_invoice_totals(&combined, Decimal::ZERO, "Goa", "Goa", Decimal::ZERO).unwrap();

        prop_assert_eq!(both.subtotal, a.subtotal + b.subtotal);
        prop_assert_eq!(both.total_tax, a.total_tax + b.total_tax);
    }

    #[test]
    fn zero_rates_produce_no_tax(
        items in line_items(),
    ) {
        let exempt: Vec<LineItem> = items
            .into_iter()
            .map(|item| LineItem { tax_rate_percent: Decimal::ZERO, ..item })
            .collect();

        let totals = compute_invoice_totals(&exempt, Decimal::ZERO, "Kerala", "Assam", Decimal::ZERO).unwrap();

        prop_assert_eq!(totals.total_tax, Decimal::ZERO);
        prop_assert_eq!(totals.grand_total, totals.taxable_amount);
    }

    #[test]
    fn intra_and_inter_state_components_are_disjoint(
        items in line_items(),
        inter_state in any::<bool>(),
    ) {
        let buyer = if inter_state { "Delhi" } else { "Maharashtra" };

        let totals = compute_invoice_totals(&items, Decimal::ZERO, "Maharashtra", buyer, Decimal::ZERO).unwrap();

        if inter_state {
            prop_assert_eq!(totals.cgst, Decimal::ZERO);
            prop_assert_eq!(totals.sgst, Decimal::ZERO);
            prop_assert_eq!(totals.igst, totals.total_tax);
        } else {
            prop_assert_eq!(totals.igst, Decimal::ZERO);
            prop_assert_eq!(totals.cgst, totals.sgst);
            prop_assert_eq!(totals.cgst + totals.sgst, totals.total_tax);
        }
    }

    #[test]
    fn status_never_regresses_as_payment_grows(
        items in line_items(),
        first_payment in rupees(),
        top_up in rupees(),
    ) {
        let smaller = compute_invoice_totals(&items, Decimal::ZERO, "Goa", "Goa", first_payment).unwrap();
        let larger = compute_invoice_totals(&items, Decimal::ZERO, "Goa", "Goa", first_payment + top_up).unwrap();

        prop_assert!(smaller.status <= larger.status);
        prop_assert!(larger.balance_due <= smaller.balance_due);
    }

    #[test]
    fn paying_the_grand_total_settles_the_invoice(
        items in line_items(),
    ) {
        let unpaid = compute_invoice_totals(&items, Decimal::ZERO, "Goa", "Goa", Decimal::ZERO).unwrap();

        let paid = compute_invoice_totals(&items, Decimal::ZERO, "Goa", "Goa", unpaid.grand_total).unwrap();

        prop_assert_eq!(paid.status, PaymentStatus::Paid);
        prop_assert_eq!(paid.balance_due, Decimal::ZERO);
    }

    #[test]
    fn balance_due_is_unrounded_shortfall(
        items in line_items(),
        payment in rupees(),
    ) {
        let totals = compute_invoice_totals(&items, Decimal::ZERO, "Goa", "Goa", payment).unwrap();

        let shortfall = (totals.grand_total - payment).max(Decimal::ZERO);
        prop_assert_eq!(totals.balance_due, shortfall);
        prop_assert_eq!(totals.status == PaymentStatus::Paid, payment >= totals.grand_total);
    }

    #[test]
    fn pro_rata_allocations_sum_to_overall_discount(
        items in prop::collection::vec(line_item(), 1..8),
        discount_percent in 0u32..=100,
    ) {
        let discountable: Decimal = items
            .iter()
            .map(|item| item.quantity * item.unit_price - item.line_discount)
            .sum();
        let overall = discountable * Decimal::from(discount_percent) / Decimal::ONE_HUNDRED;
        let calculator = InvoiceTotalsCalculator::new(TotalsConfig {
            overall_discount_treatment: OverallDiscountTreatment::ProRata,
            ..TotalsConfig::default()
        });
        let context = InvoiceContext::new(items).with_overall_discount(overall);

        let totals = calculator.calculate(&context).unwrap();

        // Shares are divided at full precision; only the last digits may drift.
        let allocated: Decimal = totals.lines.iter().map(|line| line.allocated_discount).sum();
        prop_assert!((allocated - overall).abs() < Decimal::new(1, 12));
        prop_assert_eq!(totals.taxable_amount, discountable - overall);
    }
}
