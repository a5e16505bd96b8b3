//! Input and output around the GST engine: CSV line items, TOML settings
//! and plain-text reports.

pub mod loader;
pub mod report;
pub mod settings;

pub use loader::{InvoiceDraft, InvoiceLinesLoader, LineItemLoader, LoaderError};
pub use report::{SummaryReport, TotalsReport, format_inr};
pub use settings::{Settings, SettingsError};
