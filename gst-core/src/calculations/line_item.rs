//! Per-item valuation: taxable value and GST for a single invoice line.
//!
//! | Step | Formula |
//! |------|---------|
//! | Gross amount   | quantity × unit price |
//! | Taxable value  | gross amount − line discount |
//! | Tax amount     | taxable value × GST rate / 100 |
//!
//! The valuer never decides whether a line is displayed tax-inclusive. Both
//! [`LineValuation::line_total_exclusive`] and
//! [`LineValuation::line_total_inclusive`] are available to the caller.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use gst_core::LineItem;
//! use gst_core::calculations::LineItemValuer;
//!
//! let item = LineItem::new(dec!(1), dec!(1000), dec!(100), dec!(12));
//! let valuation = LineItemValuer::value(&item).unwrap();
//!
//! assert_eq!(valuation.taxable_value, dec!(900));
//! assert_eq!(valuation.tax_amount, dec!(108));
//! assert_eq!(valuation.line_total_inclusive(), dec!(1008));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::calculations::common::percent_of;
use crate::models::{GstSlab, LineItem};

/// Reasons a line item is rejected before any aggregation happens.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LineItemError {
    /// Quantity must be strictly positive.
    #[error("quantity must be positive, got {0}")]
    NonPositiveQuantity(Decimal),

    #[error("unit price must be non-negative, got {0}")]
    NegativeUnitPrice(Decimal),

    #[error("discount must be non-negative, got {0}")]
    NegativeDiscount(Decimal),

    /// A line discount larger than the line's gross amount.
    #[error("discount {discount} exceeds line amount {gross_amount}")]
    DiscountExceedsGross {
        discount: Decimal,
        gross_amount: Decimal,
    },

    #[error("GST rate must be non-negative, got {0}")]
    NegativeTaxRate(Decimal),

    /// The line's amount or tax does not fit in a [`Decimal`].
    #[error("line amount is too large to compute")]
    AmountOverflow,
}

/// The taxable value and GST contributed by one line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineValuation {
    /// Quantity × unit price, before any discount.
    pub gross_amount: Decimal,

    pub line_discount: Decimal,

    /// Gross amount less the line discount.
    pub taxable_value: Decimal,

    pub tax_rate_percent: Decimal,

    /// GST on the taxable value, unrounded.
    pub tax_amount: Decimal,
}

impl LineValuation {
    /// Line total as shown by invoice forms that add GST at invoice level.
    pub fn line_total_exclusive(&self) -> Decimal {
        self.taxable_value
    }

    /// Line total as shown by POS carts that display GST per line.
    pub fn line_total_inclusive(&self) -> Decimal {
        self.taxable_value + self.tax_amount
    }
}

/// Values individual line items.
///
/// Stateless; every method is a pure function of its arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineItemValuer;

impl LineItemValuer {
    /// Validates a line item and computes its taxable value and GST.
    ///
    /// # Errors
    ///
    /// Returns [`LineItemError`] if:
    /// - `quantity` is zero or negative
    /// - `unit_price`, `line_discount` or `tax_rate_percent` is negative
    /// - `line_discount` exceeds `quantity × unit_price`
    /// - the gross amount, tax or tax-inclusive total overflows
    ///
    /// Invalid values are rejected, never clamped.
    pub fn value(item: &LineItem) -> Result<LineValuation, LineItemError> {
        Self::validate(item)?;

        let gross_amount = item
            .quantity
            .checked_mul(item.unit_price)
            .ok_or(LineItemError::AmountOverflow)?;
        if item.line_discount > gross_amount {
            return Err(LineItemError::DiscountExceedsGross {
                discount: item.line_discount,
                gross_amount,
            });
        }

        if !GstSlab::is_canonical(item.tax_rate_percent) {
            warn!(
                rate = %item.tax_rate_percent,
                "GST rate is not one of the standard slabs; applying it as configured"
            );
        }

        let taxable_value = gross_amount - item.line_discount;
        let tax_amount = Self::tax_on(taxable_value, item.tax_rate_percent)?;
        // Keeps line_total_inclusive infallible.
        taxable_value
            .checked_add(tax_amount)
            .ok_or(LineItemError::AmountOverflow)?;

        Ok(LineValuation {
            gross_amount,
            line_discount: item.line_discount,
            taxable_value,
            tax_rate_percent: item.tax_rate_percent,
            tax_amount,
        })
    }

    /// GST on an arbitrary taxable base at the given rate.
    ///
    /// Shared with the totals calculator when an invoice-level discount is
    /// allocated back onto individual lines.
    pub fn tax_on(
        taxable_value: Decimal,
        tax_rate_percent: Decimal,
    ) -> Result<Decimal, LineItemError> {
        percent_of(taxable_value, tax_rate_percent).ok_or(LineItemError::AmountOverflow)
    }

    fn validate(item: &LineItem) -> Result<(), LineItemError> {
        if item.quantity <= Decimal::ZERO {
            return Err(LineItemError::NonPositiveQuantity(item.quantity));
        }
        if item.unit_price < Decimal::ZERO {
            return Err(LineItemError::NegativeUnitPrice(item.unit_price));
        }
        if item.line_discount < Decimal::ZERO {
            return Err(LineItemError::NegativeDiscount(item.line_discount));
        }
        if item.tax_rate_percent < Decimal::ZERO {
            return Err(LineItemError::NegativeTaxRate(item.tax_rate_percent));
        }
        Ok(())
    }
}
