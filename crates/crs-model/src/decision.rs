//! Approval decision against a probability-of-default threshold.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ModelError, Result};

/// Cut-off used when none is configured.
pub const DEFAULT_THRESHOLD: f64 = 0.5;
/// Lowest accepted cut-off.
pub const MIN_THRESHOLD: f64 = 0.1;
/// Highest accepted cut-off.
pub const MAX_THRESHOLD: f64 = 0.9;

/// Outcome of the risk policy for one applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approved => "Approved",
            Decision::Rejected => "Rejected",
        }
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, Decision::Approved)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credit is rejected when the probability of default exceeds the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct RiskPolicy {
    threshold: f64,
}

impl RiskPolicy {
    pub fn new(threshold: f64) -> Result<Self> {
        if !(MIN_THRESHOLD..=MAX_THRESHOLD).contains(&threshold) {
            return Err(ModelError::InvalidThreshold {
                value: threshold,
                min: MIN_THRESHOLD,
                max: MAX_THRESHOLD,
            });
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Rejected if `probability > threshold`, approved otherwise.
    pub fn decide(&self, probability: f64) -> Decision {
        if probability > self.threshold {
            Decision::Rejected
        } else {
            Decision::Approved
        }
    }
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl TryFrom<f64> for RiskPolicy {
    type Error = ModelError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<RiskPolicy> for f64 {
    fn from(policy: RiskPolicy) -> Self {
        policy.threshold
    }
}
