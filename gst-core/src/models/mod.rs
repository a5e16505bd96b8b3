mod gst_slab;
mod invoice_context;
mod jurisdiction;
mod line_item;
mod payment_status;

pub use gst_slab::GstSlab;
pub use invoice_context::InvoiceContext;
pub use jurisdiction::{INDIAN_STATES, SupplyType, same_state, state_name_for_code};
pub use line_item::{CustomFieldValue, LineItem};
pub use payment_status::PaymentStatus;
