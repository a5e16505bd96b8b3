use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The canonical GST rate slabs surfaced when pricing products.
///
/// Line items are not restricted to these values; any non-negative rate is
/// accepted as a configured percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GstSlab {
    Exempt,
    Five,
    Twelve,
    Eighteen,
    TwentyEight,
}

impl GstSlab {
    pub fn all() -> &'static [GstSlab] {
        &[
            GstSlab::Exempt,
            GstSlab::Five,
            GstSlab::Twelve,
            GstSlab::Eighteen,
            GstSlab::TwentyEight,
        ]
    }

    /// Whole-number percentage for the slab.
    pub fn whole_percent(&self) -> u32 {
        match self {
            GstSlab::Exempt => 0,
            GstSlab::Five => 5,
            GstSlab::Twelve => 12,
            GstSlab::Eighteen => 18,
            GstSlab::TwentyEight => 28,
        }
    }

    pub fn percent(&self) -> Decimal {
        Decimal::from(self.whole_percent())
    }

    /// The CGST (or SGST) rate shown beside an intra-state split.
    pub fn half_percent(&self) -> Decimal {
        self.percent() / Decimal::TWO
    }

    /// Maps a rate back to its slab. Scale is ignored, so `18.00` matches.
    pub fn from_percent(rate: Decimal) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|slab| slab.percent() == rate)
    }

    pub fn is_canonical(rate: Decimal) -> bool {
        Self::from_percent(rate).is_some()
    }
}
