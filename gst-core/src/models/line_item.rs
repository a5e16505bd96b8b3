use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Value of a user-defined column attached to a line item.
///
/// Custom columns are display metadata (description, HSN code, batch number
/// and so on). They never feed into the tax computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CustomFieldValue {
    Text(String),
    Number(Decimal),
    Flag(bool),
}

/// One product or service entry on an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Units sold. Fractional for weight or volume based units.
    pub quantity: Decimal,

    /// Price per unit in rupees, exclusive of GST.
    pub unit_price: Decimal,

    /// Flat discount on this line, in rupees.
    pub line_discount: Decimal,

    /// GST rate as a percentage (18 means 18%).
    pub tax_rate_percent: Decimal,

    /// User-defined columns, excluded from computation.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_fields: BTreeMap<String, CustomFieldValue>,
}

impl LineItem {
    pub fn new(
        quantity: Decimal,
        unit_price: Decimal,
        line_discount: Decimal,
        tax_rate_percent: Decimal,
    ) -> Self {
        Self {
            quantity,
            unit_price,
            line_discount,
            tax_rate_percent,
            custom_fields: BTreeMap::new(),
        }
    }

    /// Attaches a custom column value, replacing any previous value under
    /// the same name.
    pub fn with_custom_field(
        mut self,
        name: impl Into<String>,
        value: CustomFieldValue,
    ) -> Self {
        self.custom_fields.insert(name.into(), value);
        self
    }

    /// Convenience accessor for text-valued custom columns.
    pub fn custom_text(
        &self,
        name: &str,
    ) -> Option<&str> {
        match self.custom_fields.get(name) {
            Some(CustomFieldValue::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }
}
