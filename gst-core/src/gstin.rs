//! GST identification numbers.
//!
//! A GSTIN is 15 characters: a two-digit state code, the holder's PAN, an
//! entity number, the literal `Z` and a check character.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::state_name_for_code;

static GSTIN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z][1-9A-Z]Z[0-9A-Z]$")
        .expect("GSTIN pattern is a valid regex")
});

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GstinError {
    #[error("invalid GSTIN format: {0:?}")]
    InvalidFormat(String),

    #[error("GSTIN {gstin} has unknown state code {code}")]
    UnknownStateCode { gstin: String, code: String },
}

/// A validated, upper-case GSTIN.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Gstin(String);

impl Gstin {
    /// Parses a GSTIN, ignoring surrounding whitespace and letter case.
    ///
    /// # Example
    ///
    /// ```
    /// use gst_core::gstin::Gstin;
    ///
    /// let gstin = Gstin::parse(" 27aaacm1234k1z5 ").unwrap();
    /// assert_eq!(gstin.as_str(), "27AAACM1234K1Z5");
    /// assert_eq!(gstin.state_name(), "Maharashtra");
    /// ```
    ///
    /// # Errors
    ///
    /// - [`GstinError::InvalidFormat`] if the input does not match the GSTIN layout
    /// - [`GstinError::UnknownStateCode`] if the first two digits are not a GST state code
    pub fn parse(input: &str) -> Result<Self, GstinError> {
        let normalized = input.trim().to_ascii_uppercase();

        if !GSTIN_PATTERN.is_match(&normalized) {
            return Err(GstinError::InvalidFormat(input.to_string()));
        }

        let code = &normalized[..2];
        if state_name_for_code(code).is_none() {
            return Err(GstinError::UnknownStateCode {
                code: code.to_string(),
                gstin: normalized,
            });
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn state_code(&self) -> &str {
        &self.0[..2]
    }

    /// State or union territory the holder is registered in.
    pub fn state_name(&self) -> &'static str {
        state_name_for_code(self.state_code()).unwrap_or_default()
    }

    /// The holder's PAN, embedded in characters 3 to 12.
    pub fn pan(&self) -> &str {
        &self.0[2..12]
    }
}

impl FromStr for Gstin {
    type Err = GstinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Gstin {
    type Error = GstinError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Gstin> for String {
    fn from(gstin: Gstin) -> Self {
        gstin.0
    }
}

impl fmt::Display for Gstin {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.0)
    }
}
