//! The ordered feature set the scoring model was trained on.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{ModelError, Result};

/// Features agreed on during exploratory analysis, in model input order.
pub const FEATURES_CONSENSUS: [&str; 26] = [
    "int_rate",
    "dti",
    "annual_inc",
    "sub_grade",
    "revol_util",
    "revol_bal",
    "installment",
    "total_acc",
    "funded_amnt_inv",
    "funded_amnt",
    "loan_amnt",
    "total_bc_limit",
    "ME_pce",
    "grade",
    "fico_range_low",
    "ME_inflation_cpi",
    "mo_sin_old_rev_tl_op",
    "avg_cur_bal",
    "tot_hi_cred_lim",
    "emp_length",
    "mths_since_recent_bc",
    "ME_unemployment_rate",
    "ME_fed_funds_rate",
    "acc_open_past_24mths",
    "inq_last_6mths",
    "term",
];

/// Immutable, ordered, duplicate-free list of feature names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FeatureSet {
    names: Vec<String>,
}

impl FeatureSet {
    /// Builds a feature set, rejecting empty lists, blank names and duplicates.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(ModelError::InvalidFeatureSet {
                message: "feature list is empty".to_string(),
            });
        }
        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if name.trim().is_empty() {
                return Err(ModelError::InvalidFeatureSet {
                    message: "feature names must not be blank".to_string(),
                });
            }
            if !seen.insert(name.as_str()) {
                return Err(ModelError::InvalidFeatureSet {
                    message: format!("duplicate feature '{name}'"),
                });
            }
        }
        Ok(Self { names })
    }

    /// The model's training feature set.
    pub fn consensus() -> Self {
        Self {
            names: FEATURES_CONSENSUS.iter().map(|name| name.to_string()).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|candidate| candidate == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl Default for FeatureSet {
    fn default() -> Self {
        Self::consensus()
    }
}

impl TryFrom<Vec<String>> for FeatureSet {
    type Error = ModelError;

    fn try_from(names: Vec<String>) -> Result<Self> {
        Self::new(names)
    }
}

impl From<FeatureSet> for Vec<String> {
    fn from(set: FeatureSet) -> Self {
        set.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consensus_has_26_unique_features() {
        let set = FeatureSet::consensus();
        assert_eq!(set.len(), 26);
        assert_eq!(set.names()[0], "int_rate");
        assert_eq!(set.names()[25], "term");
        assert_eq!(set.position("grade"), Some(13));
        assert!(FeatureSet::new(FEATURES_CONSENSUS).is_ok());
    }

    #[test]
    fn rejects_invalid_lists() {
        assert!(FeatureSet::new(Vec::<String>::new()).is_err());
        assert!(FeatureSet::new(["a", " "]).is_err());
        let err = FeatureSet::new(["a", "b", "a"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid feature set: duplicate feature 'a'"
        );
    }

    #[test]
    fn deserializes_through_validation() {
        let set: FeatureSet = serde_json::from_str(r#"["dti", "grade"]"#).unwrap();
        assert_eq!(set.names(), ["dti", "grade"]);
        assert!(serde_json::from_str::<FeatureSet>(r#"["dti", "dti"]"#).is_err());
    }
}
