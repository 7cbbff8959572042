//! The manual applicant form and its defaults.

use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};
use crate::record::ApplicantRecord;

/// Lowest FICO score the form accepts.
pub const FICO_MIN: f64 = 300.0;
/// Highest FICO score the form accepts.
pub const FICO_MAX: f64 = 850.0;

/// Fields a loan officer fills in for a single applicant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicantForm {
    pub loan_amnt: f64,
    pub term: String,
    pub int_rate: f64,
    pub annual_inc: f64,
    pub fico_range_low: f64,
    pub emp_length: String,
    pub grade: String,
    pub sub_grade: String,
    pub dti: f64,
}

impl Default for ApplicantForm {
    fn default() -> Self {
        Self {
            loan_amnt: 10_000.0,
            term: " 36 months".to_string(),
            int_rate: 12.0,
            annual_inc: 50_000.0,
            fico_range_low: 700.0,
            emp_length: "< 1 year".to_string(),
            grade: "A".to_string(),
            sub_grade: "B1".to_string(),
            dti: 15.0,
        }
    }
}

impl ApplicantForm {
    pub fn validate(&self) -> Result<()> {
        if !(FICO_MIN..=FICO_MAX).contains(&self.fico_range_low) {
            return Err(IngestError::InvalidField {
                field: "fico_range_low",
                message: format!(
                    "{} is outside {FICO_MIN}..={FICO_MAX}",
                    self.fico_range_low
                ),
            });
        }
        let amounts = [
            ("loan_amnt", self.loan_amnt),
            ("int_rate", self.int_rate),
            ("annual_inc", self.annual_inc),
            ("dti", self.dti),
        ];
        for (field, value) in amounts {
            if !value.is_finite() || value < 0.0 {
                return Err(IngestError::InvalidField {
                    field,
                    message: format!("{value} must be a non-negative number"),
                });
            }
        }
        Ok(())
    }

    /// Validates the form and converts it to a nine-field record.
    pub fn to_record(&self) -> Result<ApplicantRecord> {
        self.validate()?;
        Ok(ApplicantRecord::new()
            .with("loan_amnt", self.loan_amnt)
            .with("term", self.term.as_str())
            .with("int_rate", self.int_rate)
            .with("annual_inc", self.annual_inc)
            .with("fico_range_low", self.fico_range_low)
            .with("emp_length", self.emp_length.as_str())
            .with("grade", self.grade.as_str())
            .with("sub_grade", self.sub_grade.as_str())
            .with("dti", self.dti))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RawValue;

    #[test]
    fn default_form_produces_nine_fields() {
        let record = ApplicantForm::default().to_record().unwrap();
        assert_eq!(record.len(), 9);
        assert_eq!(
            record.get("term"),
            Some(&RawValue::Text(" 36 months".to_string()))
        );
        assert_eq!(record.get("fico_range_low"), Some(&RawValue::Number(700.0)));
    }

    #[test]
    fn fico_bounds_are_inclusive() {
        let mut form = ApplicantForm {
            fico_range_low: 300.0,
            ..ApplicantForm::default()
        };
        assert!(form.validate().is_ok());
        form.fico_range_low = 850.0;
        assert!(form.validate().is_ok());
        form.fico_range_low = 851.0;
        let err = form.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value for fico_range_low: 851 is outside 300..=850"
        );
    }

    #[test]
    fn rejects_negative_amounts() {
        let form = ApplicantForm {
            annual_inc: -1.0,
            ..ApplicantForm::default()
        };
        assert!(matches!(
            form.to_record(),
            Err(IngestError::InvalidField { field: "annual_inc", .. })
        ));
    }
}
