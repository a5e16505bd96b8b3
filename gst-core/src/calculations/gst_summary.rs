//! GST summary by rate, as filed in the periodic return.
//!
//! Folds computed [`InvoiceTotals`] into one bucket per GST rate. Tax figures
//! are read from each invoice's per-line breakdown and are never recomputed
//! here, so the summary always agrees with the invoices it was built from.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::checked_sum;
use crate::calculations::invoice_totals::{InvoiceTotals, LineTaxBreakdown, TotalsError};

/// Aggregated figures for one GST rate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GstRateBucket {
    pub line_count: usize,
    pub taxable_value: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub igst: Decimal,
    pub total_tax: Decimal,
}

impl GstRateBucket {
    fn from_line(line: &LineTaxBreakdown) -> Self {
        Self {
            line_count: 1,
            taxable_value: line.taxable_base,
            cgst: line.cgst,
            sgst: line.sgst,
            igst: line.igst,
            total_tax: line.tax_amount,
        }
    }

    /// Adds `other` into `self`. On overflow `self` is left unchanged.
    fn merge(
        &mut self,
        other: &GstRateBucket,
    ) -> Result<(), TotalsError> {
        let add = |a: Decimal, b: Decimal| checked_sum([a, b]).ok_or(TotalsError::AmountOverflow);

        *self = Self {
            line_count: self.line_count + other.line_count,
            taxable_value: add(self.taxable_value, other.taxable_value)?,
            cgst: add(self.cgst, other.cgst)?,
            sgst: add(self.sgst, other.sgst)?,
            igst: add(self.igst, other.igst)?,
            total_tax: add(self.total_tax, other.total_tax)?,
        };
        Ok(())
    }
}

/// GST totals across many invoices, bucketed by rate.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use gst_core::{LineItem, compute_invoice_totals};
/// use gst_core::calculations::GstSummary;
///
/// let items = vec![LineItem::new(dec!(2), dec!(100), dec!(0), dec!(18))];
/// let invoice = compute_invoice_totals(&items, dec!(0), "Goa", "Goa", dec!(0)).unwrap();
///
/// let summary = GstSummary::from_invoices(&[invoice]).unwrap();
/// let bucket = summary.bucket(dec!(18.00)).unwrap();
///
/// assert_eq!(bucket.taxable_value, dec!(200));
/// assert_eq!(bucket.cgst, dec!(18));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GstSummary {
    invoice_count: usize,
    buckets: BTreeMap<Decimal, GstRateBucket>,
    total: GstRateBucket,
}

impl GstSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_invoices(invoices: &[InvoiceTotals]) -> Result<Self, TotalsError> {
        let mut summary = Self::new();
        for invoice in invoices {
            summary.add_invoice(invoice)?;
        }
        Ok(summary)
    }

    /// Adds every line of one invoice to its rate bucket.
    ///
    /// The taxable value recorded is the base GST was charged on, so a
    /// pro-rata overall discount is reflected per rate.
    ///
    /// # Errors
    ///
    /// Returns [`TotalsError::AmountOverflow`] if a bucket or the running
    /// total would overflow. The summary is then left unchanged.
    pub fn add_invoice(
        &mut self,
        invoice: &InvoiceTotals,
    ) -> Result<(), TotalsError> {
        let mut buckets = self.buckets.clone();
        let mut total = self.total.clone();

        for line in &invoice.lines {
            let contribution = GstRateBucket::from_line(line);
            buckets
                .entry(line.valuation.tax_rate_percent.normalize())
                .or_default()
                .merge(&contribution)?;
            total.merge(&contribution)?;
        }

        self.buckets = buckets;
        self.total = total;
        self.invoice_count += 1;
        Ok(())
    }

    pub fn invoice_count(&self) -> usize {
        self.invoice_count
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Looks up a bucket. Scale is ignored, so `18` and `18.00` match.
    pub fn bucket(
        &self,
        rate_percent: Decimal,
    ) -> Option<&GstRateBucket> {
        self.buckets.get(&rate_percent.normalize())
    }

    /// Buckets in ascending rate order.
    pub fn buckets(&self) -> impl Iterator<Item = (Decimal, &GstRateBucket)> {
        self.buckets.iter().map(|(rate, bucket)| (*rate, bucket))
    }

    /// Sum of all buckets.
    pub fn grand_total(&self) -> GstRateBucket {
        self.total.clone()
    }
}
