use std::fmt;

use serde::{Deserialize, Serialize};

/// Settlement state of an invoice, derived from grand total and amount paid.
///
/// Variants are ordered by settlement progress: `Unpaid < Partial < Paid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Partial => "partial",
            Self::Paid => "paid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unpaid" => Some(Self::Unpaid),
            "partial" => Some(Self::Partial),
            "paid" => Some(Self::Paid),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
