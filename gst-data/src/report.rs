//! Plain-text rendering of invoice totals and GST summaries.
//!
//! Amounts are rounded to paise and printed with Indian digit grouping.

use std::fmt;

use gst_core::calculations::GstSummary;
use gst_core::calculations::common::round_half_up;
use gst_core::{InvoiceTotals, SupplyType};
use rust_decimal::Decimal;

/// Formats an amount as rupees with lakh/crore grouping, e.g. `₹1,23,456.70`.
pub fn format_inr(amount: Decimal) -> String {
    let rounded = round_half_up(amount);
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let sign = if rounded < Decimal::ZERO { "-" } else { "" };

    format!("{sign}₹{}.{fraction}", group_indian(whole))
}

/// The last three digits form one group; everything above groups in pairs.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (mut rest, thousands) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    while rest.len() > 2 {
        let (head, pair) = rest.split_at(rest.len() - 2);
        groups.push(pair);
        rest = head;
    }
    groups.push(rest);
    groups.reverse();

    format!("{},{thousands}", groups.join(","))
}

fn format_rate(rate: Decimal) -> String {
    format!("{}%", rate.normalize())
}

/// Printable invoice totals. Values are rounded at construction.
pub struct TotalsReport {
    totals: InvoiceTotals,
}

impl TotalsReport {
    pub fn new(totals: &InvoiceTotals) -> Self {
        Self {
            totals: totals.rounded(),
        }
    }
}

impl fmt::Display for TotalsReport {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let t = &self.totals;

        writeln!(
            f,
            "{:>3}  {:>14}  {:>12}  {:>14}  {:>6}  {:>12}",
            "#", "Amount", "Discount", "Taxable", "GST", "Tax"
        )?;
        for (index, line) in t.lines.iter().enumerate() {
            writeln!(
                f,
                "{:>3}  {:>14}  {:>12}  {:>14}  {:>6}  {:>12}",
                index + 1,
                format_inr(line.valuation.gross_amount),
                format_inr(line.valuation.line_discount + line.allocated_discount),
                format_inr(line.taxable_base),
                format_rate(line.valuation.tax_rate_percent),
                format_inr(line.tax_amount),
            )?;
        }
        writeln!(f)?;

        writeln!(f, "Supply:          {}", t.supply_type)?;
        writeln!(f, "Subtotal:        {}", format_inr(t.subtotal))?;
        writeln!(f, "Discount:        {}", format_inr(t.total_discount))?;
        writeln!(f, "Taxable amount:  {}", format_inr(t.taxable_amount))?;
        match t.supply_type {
            SupplyType::IntraState => {
                writeln!(f, "CGST:            {}", format_inr(t.cgst))?;
                writeln!(f, "SGST:            {}", format_inr(t.sgst))?;
            }
            SupplyType::InterState => {
                writeln!(f, "IGST:            {}", format_inr(t.igst))?;
            }
        }
        writeln!(f, "Total tax:       {}", format_inr(t.total_tax))?;
        writeln!(f, "Grand total:     {}", format_inr(t.grand_total))?;
        writeln!(f, "Amount paid:     {}", format_inr(t.amount_paid))?;
        writeln!(f, "Balance due:     {}", format_inr(t.balance_due))?;
        write!(f, "Status:          {}", t.status)
    }
}

/// Printable GST-by-rate summary.
pub struct SummaryReport<'a> {
    summary: &'a GstSummary,
}

impl<'a> SummaryReport<'a> {
    pub fn new(summary: &'a GstSummary) -> Self {
        Self { summary }
    }
}

impl fmt::Display for SummaryReport<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "GST summary for {} invoice(s)", self.summary.invoice_count())?;
        writeln!(
            f,
            "{:<6}  {:>5}  {:>15}  {:>13}  {:>13}  {:>13}  {:>13}",
            "Rate", "Lines", "Taxable", "CGST", "SGST", "IGST", "Total tax"
        )?;

        let rows = self
            .summary
            .buckets()
            .map(|(rate, bucket)| (format_rate(rate), bucket.clone()))
            .chain(std::iter::once((
                "Total".to_string(),
                self.summary.grand_total(),
            )));

        let mut rows = rows.peekable();
        while let Some((label, bucket)) = rows.next() {
            write!(
                f,
                "{:<6}  {:>5}  {:>15}  {:>13}  {:>13}  {:>13}  {:>13}",
                label,
                bucket.line_count,
                format_inr(bucket.taxable_value),
                format_inr(bucket.cgst),
                format_inr(bucket.sgst),
                format_inr(bucket.igst),
                format_inr(bucket.total_tax),
            )?;
            if rows.peek().is_some() {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
