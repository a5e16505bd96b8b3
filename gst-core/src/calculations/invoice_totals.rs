//! Invoice totals: the single place where GST for an invoice is computed.
//!
//! POS checkout, the sales and purchase invoice forms and the GST report all
//! route through [`InvoiceTotalsCalculator`].
//!
//! # Computation
//!
//! | Step | Value |
//! |------|-------|
//! | 1 | Value every line item (gross, line discount, taxable value, tax) |
//! | 2 | Subtotal = Σ gross amount |
//! | 3 | Total discount = Σ line discount + overall discount |
//! | 4 | Taxable amount = subtotal − total discount |
//! | 5 | Per-line GST, split CGST/SGST (intra-state) or IGST (inter-state) |
//! | 6 | Total tax = CGST + SGST + IGST |
//! | 7 | Grand total = taxable amount + total tax |
//! | 8 | Status and balance from amount paid |
//!
//! Nothing is rounded between steps. Call [`InvoiceTotals::rounded`] at the
//! display boundary.
//!
//! # Overall Discount and GST
//!
//! Under [`OverallDiscountTreatment::AfterTax`] (the default) each line's GST
//! is computed on its own taxable value and the overall discount lowers only
//! the taxable amount and grand total. Under
//! [`OverallDiscountTreatment::ProRata`] the overall discount is spread over
//! the lines in proportion to their taxable value and GST is charged on the
//! reduced bases.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use gst_core::{LineItem, PaymentStatus, compute_invoice_totals};
//!
//! let items = vec![
//!     LineItem::new(dec!(1), dec!(1000), dec!(100), dec!(12)),
//!     LineItem::new(dec!(3), dec!(50), dec!(0), dec!(5)),
//! ];
//!
//! let totals = compute_invoice_totals(
//!     &items,
//!     dec!(20),        // overall discount
//!     "Maharashtra",   // seller state
//!     "Maharashtra",   // buyer state
//!     dec!(500),       // amount paid
//! ).unwrap();
//!
//! assert_eq!(totals.taxable_amount, dec!(1030));
//! assert_eq!(totals.total_tax, dec!(115.5));
//! assert_eq!(totals.grand_total, dec!(1145.5));
//! assert_eq!(totals.status, PaymentStatus::Partial);
//! assert_eq!(totals.balance_due, dec!(645.5));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::calculations::common::{checked_sum, round_half_up};
use crate::calculations::line_item::{LineItemError, LineItemValuer, LineValuation};
use crate::calculations::payment_status::PaymentStatusResolver;
use crate::models::{InvoiceContext, LineItem, PaymentStatus, SupplyType};

/// Line-item cap enforced by the invoice entry forms.
///
/// The calculator itself is uncapped unless [`TotalsConfig::max_line_items`]
/// is set.
pub const DEFAULT_MAX_LINE_ITEMS: usize = 8;

/// Problems with the invoice-level inputs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("overall discount must be non-negative, got {0}")]
    NegativeOverallDiscount(Decimal),

    #[error("amount paid must be non-negative, got {0}")]
    NegativeAmountPaid(Decimal),

    /// Line and overall discounts together exceed the subtotal.
    #[error("total discount {total_discount} exceeds subtotal {subtotal}")]
    DiscountExceedsSubtotal {
        total_discount: Decimal,
        subtotal: Decimal,
    },
}

/// Errors that can occur while computing invoice totals.
///
/// Any error aborts the whole computation; no partial totals are returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TotalsError {
    /// A line item failed validation. `index` is zero-based.
    #[error("line {}: {source}", .index + 1)]
    InvalidLineItem {
        index: usize,
        #[source]
        source: LineItemError,
    },

    #[error("invalid invoice: {0}")]
    InvalidInvoiceContext(#[from] ContextError),

    #[error("invoice has {count} line items, at most {max} are allowed")]
    TooManyLineItems { count: usize, max: usize },

    #[error("invalid totals configuration: {0}")]
    InvalidConfig(String),

    /// An invoice-level sum does not fit in a [`Decimal`].
    #[error("invoice totals are too large to compute")]
    AmountOverflow,
}

/// How an invoice-level discount interacts with GST.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallDiscountTreatment {
    /// GST is charged on line taxable values; the overall discount reduces
    /// only the taxable amount and grand total.
    #[default]
    AfterTax,

    /// The overall discount is allocated to lines by taxable value and GST is
    /// charged on the reduced line bases.
    ProRata,
}

/// Configuration for [`InvoiceTotalsCalculator`].
///
/// # Example
///
/// ```
/// use gst_core::calculations::{DEFAULT_MAX_LINE_ITEMS, OverallDiscountTreatment, TotalsConfig};
///
/// let config = TotalsConfig {
///     max_line_items: Some(DEFAULT_MAX_LINE_ITEMS),
///     overall_discount_treatment: OverallDiscountTreatment::ProRata,
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalsConfig {
    /// Maximum number of line items per invoice. `None` means no cap.
    #[serde(default)]
    pub max_line_items: Option<usize>,

    #[serde(default)]
    pub overall_discount_treatment: OverallDiscountTreatment,
}

impl TotalsConfig {
    /// # Errors
    ///
    /// Returns [`TotalsError::InvalidConfig`] if `max_line_items` is zero.
    pub fn validate(&self) -> Result<(), TotalsError> {
        if self.max_line_items == Some(0) {
            return Err(TotalsError::InvalidConfig(
                "max_line_items must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// GST attributed to one line after the jurisdiction split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineTaxBreakdown {
    pub valuation: LineValuation,

    /// Share of the overall discount charged to this line. Always zero under
    /// [`OverallDiscountTreatment::AfterTax`].
    pub allocated_discount: Decimal,

    /// Amount GST was charged on: taxable value less allocated discount.
    pub taxable_base: Decimal,

    pub tax_amount: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub igst: Decimal,
}

/// The complete, derived totals for one invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub supply_type: SupplyType,

    /// Σ quantity × unit price, before any discount.
    pub subtotal: Decimal,

    /// Σ line discounts.
    pub item_discount_total: Decimal,

    pub overall_discount: Decimal,

    /// Line discounts plus the overall discount.
    pub total_discount: Decimal,

    /// Subtotal less total discount.
    pub taxable_amount: Decimal,

    pub cgst: Decimal,
    pub sgst: Decimal,
    pub igst: Decimal,
    pub total_tax: Decimal,

    /// Taxable amount plus total tax.
    pub grand_total: Decimal,

    pub amount_paid: Decimal,

    /// Grand total less amount paid, never negative.
    pub balance_due: Decimal,

    pub status: PaymentStatus,

    /// Per-line breakdown, in input order.
    pub lines: Vec<LineTaxBreakdown>,
}

impl InvoiceTotals {
    /// The grand total rounded to paise, as printed on the invoice.
    ///
    /// Display only; status and balance due use the unrounded grand total.
    pub fn payable_total(&self) -> Decimal {
        round_half_up(self.grand_total)
    }

    /// Returns a copy with every monetary field rounded to two decimal
    /// places, for display or for persisting an invoice snapshot.
    ///
    /// Each field is rounded independently from its unrounded value.
    pub fn rounded(&self) -> Self {
        Self {
            supply_type: self.supply_type,
            subtotal: round_half_up(self.subtotal),
            item_discount_total: round_half_up(self.item_discount_total),
            overall_discount: round_half_up(self.overall_discount),
            total_discount: round_half_up(self.total_discount),
            taxable_amount: round_half_up(self.taxable_amount),
            cgst: round_half_up(self.cgst),
            sgst: round_half_up(self.sgst),
            igst: round_half_up(self.igst),
            total_tax: round_half_up(self.total_tax),
            grand_total: round_half_up(self.grand_total),
            amount_paid: round_half_up(self.amount_paid),
            balance_due: round_half_up(self.balance_due),
            status: self.status,
            lines: self.lines.iter().map(LineTaxBreakdown::rounded).collect(),
        }
    }
}

impl LineTaxBreakdown {
    fn rounded(&self) -> Self {
        Self {
            valuation: LineValuation {
                gross_amount: round_half_up(self.valuation.gross_amount),
                line_discount: round_half_up(self.valuation.line_discount),
                taxable_value: round_half_up(self.valuation.taxable_value),
                tax_rate_percent: self.valuation.tax_rate_percent,
                tax_amount: round_half_up(self.valuation.tax_amount),
            },
            allocated_discount: round_half_up(self.allocated_discount),
            taxable_base: round_half_up(self.taxable_base),
            tax_amount: round_half_up(self.tax_amount),
            cgst: round_half_up(self.cgst),
            sgst: round_half_up(self.sgst),
            igst: round_half_up(self.igst),
        }
    }
}

/// Computes [`InvoiceTotals`] for invoice drafts.
///
/// Holds only immutable configuration, so one instance can be shared freely
/// between threads.
#[derive(Debug, Clone, Default)]
pub struct InvoiceTotalsCalculator {
    config: TotalsConfig,
}

impl InvoiceTotalsCalculator {
    pub fn new(config: TotalsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TotalsConfig {
        &self.config
    }

    /// Computes the full totals for an invoice.
    ///
    /// # Errors
    ///
    /// - [`TotalsError::InvalidConfig`] if the configuration is invalid
    /// - [`TotalsError::TooManyLineItems`] if a cap is configured and exceeded
    /// - [`TotalsError::InvalidInvoiceContext`] for a negative overall
    ///   discount or amount paid, or discounts exceeding the subtotal
    /// - [`TotalsError::InvalidLineItem`] for the first invalid line
    /// - [`TotalsError::AmountOverflow`] if an invoice-level sum overflows
    pub fn calculate(
        &self,
        context: &InvoiceContext,
    ) -> Result<InvoiceTotals, TotalsError> {
        self.config.validate()?;
        self.check_line_item_cap(context.line_items.len())?;
        Self::validate_context(context)?;

        let valuations = Self::value_lines(&context.line_items)?;

        let subtotal = sum_of(valuations.iter().map(|v| v.gross_amount))?;
        let item_discount_total = sum_of(valuations.iter().map(|v| v.line_discount))?;
        let total_discount = sum_of([item_discount_total, context.overall_discount])?;

        if total_discount > subtotal {
            return Err(ContextError::DiscountExceedsSubtotal {
                total_discount,
                subtotal,
            }
            .into());
        }

        let taxable_amount = subtotal - total_discount;
        let supply_type = SupplyType::between(&context.seller_state, &context.buyer_state);

        let allocations = self.allocate_overall_discount(&valuations, context.overall_discount)?;
        let lines = valuations
            .into_iter()
            .zip(allocations)
            .enumerate()
            .map(|(index, (valuation, allocated))| {
                Self::split_line(valuation, allocated, supply_type)
                    .map_err(|source| TotalsError::InvalidLineItem { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let cgst = sum_of(lines.iter().map(|l| l.cgst))?;
        let sgst = sum_of(lines.iter().map(|l| l.sgst))?;
        let igst = sum_of(lines.iter().map(|l| l.igst))?;
        let total_tax = sum_of([cgst, sgst, igst])?;
        let grand_total = sum_of([taxable_amount, total_tax])?;

        let status = PaymentStatusResolver::resolve(grand_total, context.amount_paid);
        let balance_due = PaymentStatusResolver::balance_due(grand_total, context.amount_paid);

        debug!(
            lines = lines.len(),
            supply_type = %supply_type,
            taxable_amount = %taxable_amount,
            total_tax = %total_tax,
            grand_total = %grand_total,
            status = %status,
            "Computed invoice totals"
        );

        Ok(InvoiceTotals {
            supply_type,
            subtotal,
            item_discount_total,
            overall_discount: context.overall_discount,
            total_discount,
            taxable_amount,
            cgst,
            sgst,
            igst,
            total_tax,
            grand_total,
            amount_paid: context.amount_paid,
            balance_due,
            status,
            lines,
        })
    }

    fn check_line_item_cap(
        &self,
        count: usize,
    ) -> Result<(), TotalsError> {
        match self.config.max_line_items {
            Some(max) if count > max => Err(TotalsError::TooManyLineItems { count, max }),
            _ => Ok(()),
        }
    }

    fn validate_context(context: &InvoiceContext) -> Result<(), ContextError> {
        if context.overall_discount < Decimal::ZERO {
            return Err(ContextError::NegativeOverallDiscount(
                context.overall_discount,
            ));
        }
        if context.amount_paid < Decimal::ZERO {
            return Err(ContextError::NegativeAmountPaid(context.amount_paid));
        }
        Ok(())
    }

    fn value_lines(items: &[LineItem]) -> Result<Vec<LineValuation>, TotalsError> {
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                LineItemValuer::value(item)
                    .map_err(|source| TotalsError::InvalidLineItem { index, source })
            })
            .collect()
    }

    /// Returns each line's share of the overall discount.
    ///
    /// Shares are proportional to taxable value and divided at full
    /// [`Decimal`] precision. The last line with a positive taxable value
    /// takes the remainder, so the shares sum to the overall discount up to
    /// rounding in the last of Decimal's 28 significant digits.
    fn allocate_overall_discount(
        &self,
        valuations: &[LineValuation],
        overall_discount: Decimal,
    ) -> Result<Vec<Decimal>, TotalsError> {
        let mut shares = vec![Decimal::ZERO; valuations.len()];

        if self.config.overall_discount_treatment == OverallDiscountTreatment::AfterTax
            || overall_discount.is_zero()
        {
            return Ok(shares);
        }

        let base = sum_of(valuations.iter().map(|v| v.taxable_value))?;
        let Some(last) = valuations
            .iter()
            .rposition(|v| v.taxable_value > Decimal::ZERO)
        else {
            return Ok(shares);
        };

        let mut allocated = Decimal::ZERO;
        for (index, valuation) in valuations.iter().enumerate().take(last) {
            let share = overall_discount
                .checked_mul(valuation.taxable_value)
                .and_then(|product| product.checked_div(base))
                .ok_or(TotalsError::AmountOverflow)?;
            shares[index] = share;
            allocated += share;
        }
        shares[last] = overall_discount - allocated;

        Ok(shares)
    }

    fn split_line(
        valuation: LineValuation,
        allocated_discount: Decimal,
        supply_type: SupplyType,
    ) -> Result<LineTaxBreakdown, LineItemError> {
        let taxable_base = valuation.taxable_value - allocated_discount;
        let tax_amount = if allocated_discount.is_zero() {
            valuation.tax_amount
        } else {
            LineItemValuer::tax_on(taxable_base, valuation.tax_rate_percent)?
        };

        let (cgst, sgst, igst) = match supply_type {
            SupplyType::InterState => (Decimal::ZERO, Decimal::ZERO, tax_amount),
            SupplyType::IntraState => {
                let half = tax_amount / Decimal::TWO;
                (half, half, Decimal::ZERO)
            }
        };

        Ok(LineTaxBreakdown {
            valuation,
            allocated_discount,
            taxable_base,
            tax_amount,
            cgst,
            sgst,
            igst,
        })
    }
}

fn sum_of<I>(values: I) -> Result<Decimal, TotalsError>
where
    I: IntoIterator<Item = Decimal>,
{
    checked_sum(values).ok_or(TotalsError::AmountOverflow)
}

/// Computes invoice totals with the default, uncapped configuration.
///
/// Equivalent to building an [`InvoiceContext`] and calling
/// [`InvoiceTotalsCalculator::calculate`] on a default calculator.
pub fn compute_invoice_totals(
    line_items: &[LineItem],
    overall_discount: Decimal,
    seller_state: &str,
    buyer_state: &str,
    amount_paid: Decimal,
) -> Result<InvoiceTotals, TotalsError> {
    let context = InvoiceContext {
        line_items: line_items.to_vec(),
        overall_discount,
        seller_state: seller_state.to_string(),
        buyer_state: buyer_state.to_string(),
        amount_paid,
    };
    InvoiceTotalsCalculator::default().calculate(&context)
}
