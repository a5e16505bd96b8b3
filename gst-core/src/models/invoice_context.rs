use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::LineItem;

/// Everything the totals calculator needs for one invoice draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceContext {
    pub line_items: Vec<LineItem>,

    /// Invoice-level discount applied after summing line items.
    pub overall_discount: Decimal,

    /// State the supplier is registered in.
    pub seller_state: String,

    /// Place of supply (the buyer's state).
    pub buyer_state: String,

    pub amount_paid: Decimal,
}

impl InvoiceContext {
    pub fn new(line_items: Vec<LineItem>) -> Self {
        Self {
            line_items,
            ..Self::default()
        }
    }

    pub fn with_states(
        mut self,
        seller_state: impl Into<String>,
        buyer_state: impl Into<String>,
    ) -> Self {
        self.seller_state = seller_state.into();
        self.buyer_state = buyer_state.into();
        self
    }

    pub fn with_overall_discount(
        mut self,
        overall_discount: Decimal,
    ) -> Self {
        self.overall_discount = overall_discount;
        self
    }

    pub fn with_amount_paid(
        mut self,
        amount_paid: Decimal,
    ) -> Self {
        self.amount_paid = amount_paid;
        self
    }
}
