//! Human-readable feature dictionary.
//!
//! The dictionary shares its source of truth with the pipeline: every entry
//! is looked up against a [`FeatureSet`], so documentation cannot list a
//! feature the model does not consume.

use serde::Serialize;
use std::fmt;

use crate::error::{ModelError, Result};
use crate::features::FeatureSet;

/// Prefix of features joined from external macroeconomic series by date.
pub const MACRO_PREFIX: &str = "ME_";

/// Description shown for features without a curated entry.
pub const GENERIC_DESCRIPTION: &str = "Part of the feature set selected for the model. \
     Captures a specific aspect of the applicant's credit history or of the \
     macroeconomic environment at origination.";

/// Broad grouping of a feature, used to organise the dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum FeatureCategory {
    /// Terms of the requested loan.
    Loan,
    /// Income, employment and affordability of the applicant.
    Borrower,
    /// Bureau-reported credit history.
    CreditHistory,
    /// External macroeconomic series.
    Macroeconomic,
}

impl FeatureCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureCategory::Loan => "Loan",
            FeatureCategory::Borrower => "Borrower",
            FeatureCategory::CreditHistory => "Credit history",
            FeatureCategory::Macroeconomic => "Macroeconomic",
        }
    }

    /// Category of a feature name.
    pub fn of(name: &str) -> Self {
        if name.starts_with(MACRO_PREFIX) {
            return FeatureCategory::Macroeconomic;
        }
        match name {
            "int_rate" | "sub_grade" | "grade" | "installment" | "funded_amnt_inv"
            | "funded_amnt" | "loan_amnt" | "term" => FeatureCategory::Loan,
            "dti" | "annual_inc" | "emp_length" => FeatureCategory::Borrower,
            _ => FeatureCategory::CreditHistory,
        }
    }
}

impl fmt::Display for FeatureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One dictionary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureDescription {
    pub name: String,
    pub category: FeatureCategory,
    /// Curated description, if one exists.
    pub description: Option<&'static str>,
}

impl FeatureDescription {
    /// Curated description or the generic fallback.
    pub fn text(&self) -> &'static str {
        self.description.unwrap_or(GENERIC_DESCRIPTION)
    }

    pub fn is_curated(&self) -> bool {
        self.description.is_some()
    }
}

fn curated_description(name: &str) -> Option<&'static str> {
    let text = match name {
        "int_rate" => "Interest rate of the loan. Reflects the risk the lender assigned to the applicant.",
        "dti" => "Debt-to-income ratio: share of the borrower's monthly income that goes to debt payments.",
        "annual_inc" => "Annual income self-reported by the applicant at registration.",
        "sub_grade" => "Detailed lender sub-grade (e.g. A1, B3) based on the applicant's history.",
        "fico_range_low" => "Lower bound of the applicant's FICO score range reported by the credit bureau.",
        "loan_amnt" => "Total amount of the loan requested by the applicant.",
        "term" => "Number of payments on the loan (36 or 60 months).",
        "revol_util" => "Revolving line utilisation: credit used relative to the available limit.",
        "installment" => "Monthly payment owed by the borrower if the loan is approved.",
        "emp_length" => "Years in current employment (0 to 10+ years).",
        "ME_inflation_cpi" => "Macroeconomic: consumer price index, measuring inflation in the period.",
        "ME_unemployment_rate" => "Macroeconomic: unemployment rate at the time of the loan.",
        "ME_fed_funds_rate" => "Macroeconomic: US Federal Reserve funds rate.",
        _ => return None,
    };
    Some(text)
}

/// Describes one feature of the set.
pub fn describe(features: &FeatureSet, name: &str) -> Result<FeatureDescription> {
    if !features.contains(name) {
        return Err(ModelError::UnknownFeature {
            name: name.to_string(),
        });
    }
    Ok(FeatureDescription {
        name: name.to_string(),
        category: FeatureCategory::of(name),
        description: curated_description(name),
    })
}

/// Describes every feature of the set, in feature order.
pub fn dictionary(features: &FeatureSet) -> Vec<FeatureDescription> {
    features
        .iter()
        .map(|name| FeatureDescription {
            name: name.to_string(),
            category: FeatureCategory::of(name),
            description: curated_description(name),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dictionary_covers_feature_set_in_order() {
        let set = FeatureSet::consensus();
        let entries = dictionary(&set);
        assert_eq!(entries.len(), set.len());
        assert_eq!(entries[0].name, "int_rate");
        assert_eq!(entries.iter().filter(|e| e.is_curated()).count(), 13);
    }

    #[test]
    fn categories() {
        assert_eq!(FeatureCategory::of("ME_pce"), FeatureCategory::Macroeconomic);
        assert_eq!(FeatureCategory::of("term"), FeatureCategory::Loan);
        assert_eq!(FeatureCategory::of("dti"), FeatureCategory::Borrower);
        assert_eq!(
            FeatureCategory::of("mths_since_recent_bc"),
            FeatureCategory::CreditHistory
        );
    }

    #[test]
    fn describe_falls_back_to_generic_text() {
        let set = FeatureSet::consensus();
        let entry = describe(&set, "avg_cur_bal").unwrap();
        assert!(!entry.is_curated());
        assert_eq!(entry.text(), GENERIC_DESCRIPTION);
        let err = describe(&set, "credit_age").unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"unknown feature 'credit_age'");
    }
}
