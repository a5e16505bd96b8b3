pub mod calculations;
pub mod gstin;
pub mod models;

pub use calculations::{InvoiceTotals, TotalsError, compute_invoice_totals};
pub use gstin::{Gstin, GstinError};
pub use models::*;
