//! Configuration for the DPO objective.

use serde::{Deserialize, Serialize};

use crate::error::{PrefOptError, Result};
use crate::loss::{DpoBreakdown, PreferenceLogProbs};

/// DPO configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DpoConfig {
    /// Beta parameter controlling preference strength.
    /// Higher values make the loss more sensitive to the preference difference.
    /// Typical range: 0.1 to 0.5. Default: 0.1
    pub beta: f64,
}

impl Default for DpoConfig {
    fn default() -> Self {
        Self {
            beta: crate::DEFAULT_BETA,
        }
    }
}

impl DpoConfig {
    /// Create a new DPO config with the given beta.
    pub fn new(beta: f64) -> Self {
        Self { beta }
    }

    /// Validate the configuration.
    ///
    /// `beta = 0` is accepted and makes the loss a constant `ln 2`.
    pub fn validate(&self) -> Result<()> {
        if !self.beta.is_finite() {
            return Err(PrefOptError::Config(format!(
                "DPO beta must be finite, got {}",
                self.beta
            )));
        }
        if self.beta < 0.0 {
            return Err(PrefOptError::Config(format!(
                "DPO beta must be non-negative, got {}",
                self.beta
            )));
        }
        Ok(())
    }

    /// Validated loss for one preference pair.
    pub fn loss(&self, sample: &PreferenceLogProbs) -> Result<f64> {
        self.validate()?;
        Ok(sample.loss(self.beta))
    }

    /// Validated step-by-step evaluation for one preference pair.
    pub fn breakdown(&self, sample: &PreferenceLogProbs) -> Result<DpoBreakdown> {
        self.validate()?;
        Ok(DpoBreakdown::compute(sample, self.beta))
    }
}
