//! GST calculation modules.
//!
//! Every figure on an invoice is derived here: per-line valuation, invoice
//! totals with the CGST/SGST/IGST split, payment status, and the
//! rate-bucketed summary used for returns.

pub mod common;
pub mod gst_summary;
pub mod invoice_totals;
pub mod line_item;
pub mod payment_status;

pub use gst_summary::{GstRateBucket, GstSummary};
pub use invoice_totals::{
    ContextError, DEFAULT_MAX_LINE_ITEMS, InvoiceTotals, InvoiceTotalsCalculator,
    LineTaxBreakdown, OverallDiscountTreatment, TotalsConfig, TotalsError,
    compute_invoice_totals,
};
pub use line_item::{LineItemError, LineItemValuer, LineValuation};
pub use payment_status::PaymentStatusResolver;
