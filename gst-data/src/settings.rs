//! Business settings read from a TOML file.
//!
//! ```toml
//! seller_state = "Maharashtra"
//! seller_gstin = "27AAACM1234K1Z5"
//! max_line_items = 8
//! overall_discount_treatment = "after_tax"   # or "pro_rata"
//! ```
//!
//! Every key is optional. Command-line flags override values from the file.

use std::path::Path;

use gst_core::calculations::{OverallDiscountTreatment, TotalsConfig, TotalsError};
use gst_core::{Gstin, GstinError, SupplyType};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid seller GSTIN: {0}")]
    InvalidGstin(#[from] GstinError),

    #[error(transparent)]
    InvalidTotals(#[from] TotalsError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// State the business is registered in.
    pub seller_state: Option<String>,

    /// The business's GSTIN. Supplies the seller state when none is set.
    pub seller_gstin: Option<String>,

    /// Cap on line items per invoice.
    pub max_line_items: Option<usize>,

    pub overall_discount_treatment: OverallDiscountTreatment,
}

impl Settings {
    /// Parses and validates settings from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings from `path`, or returns defaults when no path is given.
    ///
    /// A path that was given but cannot be read is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let Some(path) = path else {
            debug!("No settings file given, using defaults");
            return Ok(Self::default());
        };

        info!(path = %path.display(), "Loading settings");
        let contents = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.totals_config()?;
        self.seller_gstin()?;
        Ok(())
    }

    /// The calculator configuration described by these settings.
    pub fn totals_config(&self) -> Result<TotalsConfig, SettingsError> {
        let config = TotalsConfig {
            max_line_items: self.max_line_items,
            overall_discount_treatment: self.overall_discount_treatment,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn seller_gstin(&self) -> Result<Option<Gstin>, SettingsError> {
        self.seller_gstin
            .as_deref()
            .map(Gstin::parse)
            .transpose()
            .map_err(SettingsError::from)
    }

    /// Picks the seller state: an explicit override first, then the
    /// configured state, then the state encoded in the GSTIN.
    ///
    /// Returns an empty string when nothing is known, which the calculator
    /// treats as an intra-state supply.
    pub fn resolve_seller_state(
        &self,
        override_state: Option<&str>,
    ) -> Result<String, SettingsError> {
        let gstin = self.seller_gstin()?;

        if let (Some(state), Some(gstin)) = (&self.seller_state, &gstin) {
            if SupplyType::between(state, gstin.state_name()).is_inter_state() {
                warn!(
                    seller_state = %state,
                    gstin_state = gstin.state_name(),
                    "Configured seller state does not match the seller GSTIN"
                );
            }
        }

        let state = override_state
            .map(str::to_string)
            .or_else(|| self.seller_state.clone())
            .or_else(|| gstin.map(|g| g.state_name().to_string()))
            .unwrap_or_default();

        Ok(state)
    }
}
