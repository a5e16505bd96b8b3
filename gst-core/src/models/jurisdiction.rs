use std::fmt;

use serde::{Deserialize, Serialize};

/// States and union territories offered when recording a party's address.
pub const INDIAN_STATES: [&str; 31] = [
    "Andhra Pradesh",
    "Arunachal Pradesh",
    "Assam",
    "Bihar",
    "Chhattisgarh",
    "Goa",
    "Gujarat",
    "Haryana",
    "Himachal Pradesh",
    "Jharkhand",
    "Karnataka",
    "Kerala",
    "Madhya Pradesh",
    "Maharashtra",
    "Manipur",
    "Meghalaya",
    "Mizoram",
    "Nagaland",
    "Odisha",
    "Punjab",
    "Rajasthan",
    "Sikkim",
    "Tamil Nadu",
    "Telangana",
    "Tripura",
    "Uttar Pradesh",
    "Uttarakhand",
    "West Bengal",
    "Delhi",
    "Jammu & Kashmir",
    "Ladakh",
];

/// Two-digit GST state codes (the first two characters of a GSTIN).
const GST_STATE_CODES: [(&str, &str); 39] = [
    ("01", "Jammu & Kashmir"),
    ("02", "Himachal Pradesh"),
    ("03", "Punjab"),
    ("04", "Chandigarh"),
    ("05", "Uttarakhand"),
    ("06", "Haryana"),
    ("07", "Delhi"),
    ("08", "Rajasthan"),
    ("09", "Uttar Pradesh"),
    ("10", "Bihar"),
    ("11", "Sikkim"),
    ("12", "Arunachal Pradesh"),
    ("13", "Nagaland"),
    ("14", "Manipur"),
    ("15", "Mizoram"),
    ("16", "Tripura"),
    ("17", "Meghalaya"),
    ("18", "Assam"),
    ("19", "West Bengal"),
    ("20", "Jharkhand"),
    ("21", "Odisha"),
    ("22", "Chhattisgarh"),
    ("23", "Madhya Pradesh"),
    ("24", "Gujarat"),
    ("25", "Daman and Diu"),
    ("26", "Dadra and Nagar Haveli and Daman and Diu"),
    ("27", "Maharashtra"),
    ("28", "Andhra Pradesh"),
    ("29", "Karnataka"),
    ("30", "Goa"),
    ("31", "Lakshadweep"),
    ("32", "Kerala"),
    ("33", "Tamil Nadu"),
    ("34", "Puducherry"),
    ("35", "Andaman and Nicobar Islands"),
    ("36", "Telangana"),
    ("37", "Andhra Pradesh"),
    ("38", "Ladakh"),
    ("97", "Other Territory"),
];

/// Looks up the state or union territory for a GST state code.
pub fn state_name_for_code(code: &str) -> Option<&'static str> {
    GST_STATE_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Whether two state names refer to the same state.
///
/// Uses the same comparison as [`SupplyType::between`]: surrounding and
/// repeated whitespace and ASCII case are ignored. Unlike `between`, a blank
/// state only matches another blank state.
///
/// # Examples
///
/// ```
/// use gst_core::same_state;
///
/// assert!(same_state("Tamil Nadu", " tamil  nadu "));
/// assert!(!same_state("Goa", ""));
/// ```
pub fn same_state(
    a: &str,
    b: &str,
) -> bool {
    normalize_state(a) == normalize_state(b)
}

/// Whether a supply crosses a state boundary.
///
/// Intra-state supplies split GST equally into CGST and SGST; inter-state
/// supplies carry the full rate as IGST.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplyType {
    #[default]
    IntraState,
    InterState,
}

impl SupplyType {
    /// Classifies a supply from the seller's and buyer's states.
    ///
    /// States are compared after trimming, collapsing inner whitespace and
    /// ignoring ASCII case. If either state is blank the jurisdiction is
    /// unknown and the supply is treated as intra-state.
    ///
    /// # Examples
    ///
    /// ```
    /// use gst_core::SupplyType;
    ///
    /// assert_eq!(SupplyType::between("Maharashtra", "Delhi"), SupplyType::InterState);
    /// assert_eq!(SupplyType::between("Tamil Nadu", " tamil  nadu "), SupplyType::IntraState);
    /// assert_eq!(SupplyType::between("Kerala", ""), SupplyType::IntraState);
    /// ```
    pub fn between(
        seller_state: &str,
        buyer_state: &str,
    ) -> Self {
        let seller = normalize_state(seller_state);
        let buyer = normalize_state(buyer_state);

        if seller.is_empty() || buyer.is_empty() || seller == buyer {
            SupplyType::IntraState
        } else {
            SupplyType::InterState
        }
    }

    pub fn is_inter_state(&self) -> bool {
        matches!(self, SupplyType::InterState)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SupplyType::IntraState => "intra_state",
            SupplyType::InterState => "inter_state",
        }
    }
}

impl fmt::Display for SupplyType {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize_state(state: &str) -> String {
    state
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}
