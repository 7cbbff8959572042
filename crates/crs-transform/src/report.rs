//! What a transform run did.

use serde::Serialize;
use std::fmt;

/// A pipeline step, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStep {
    CreditAge,
    GradeEncoding,
    EmpLengthEncoding,
    TermBinarization,
    SubGradeEncoding,
    MissingIndicators,
    OneHotEncoding,
    Imputation,
    Alignment,
}

impl PipelineStep {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::CreditAge => "Credit age",
            Self::GradeEncoding => "Grade",
            Self::EmpLengthEncoding => "Employment length",
            Self::TermBinarization => "Term",
            Self::SubGradeEncoding => "Sub-grade",
            Self::MissingIndicators => "Missing indicators",
            Self::OneHotEncoding => "One-hot",
            Self::Imputation => "Imputation",
            Self::Alignment => "Alignment",
        }
    }
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A step that ran, with the number of values or columns it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub step: PipelineStep,
    pub affected: usize,
}

/// Whether numeric imputation happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImputationStatus {
    /// No imputer was configured.
    NotConfigured,
    Applied { imputer: String, cells_filled: usize },
    /// An imputer was configured but could not be loaded or applied.
    Skipped { reason: String },
}

impl fmt::Display for ImputationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => f.write_str("not configured"),
            Self::Applied {
                imputer,
                cells_filled,
            } => write!(f, "applied {imputer}, {cells_filled} cells filled"),
            Self::Skipped { reason } => write!(f, "skipped: {reason}"),
        }
    }
}

/// Missing cells of one model feature replaced with 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZeroFill {
    pub column: String,
    pub cells: usize,
}

/// How the frame was reshaped into the model's feature set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlignmentAudit {
    /// Model features the input did not provide; filled with 0.
    pub absent: Vec<String>,
    /// Input columns that are not model features.
    pub dropped: Vec<String>,
    /// Present features whose missing cells were filled with 0.
    pub zero_filled: Vec<ZeroFill>,
}

impl AlignmentAudit {
    /// True when every feature was present and complete.
    pub fn is_clean(&self) -> bool {
        self.absent.is_empty() && self.zero_filled.is_empty()
    }

    pub fn total_zero_filled(&self) -> usize {
        self.zero_filled.iter().map(|fill| fill.cells).sum()
    }
}

/// Summary of one transform run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformReport {
    pub rows: usize,
    pub steps: Vec<StepOutcome>,
    pub imputation: ImputationStatus,
    pub alignment: AlignmentAudit,
}

impl TransformReport {
    pub fn ran(&self, step: PipelineStep) -> bool {
        self.steps.iter().any(|outcome| outcome.step == step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imputation_status_serializes_with_tag() {
        let status = ImputationStatus::Skipped {
            reason: "file not found".to_string(),
        };
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, r#"{"status":"skipped","reason":"file not found"}"#);
        assert_eq!(status.to_string(), "skipped: file not found");
    }

    #[test]
    fn audit_totals() {
        let audit = AlignmentAudit {
            absent: vec![],
            dropped: vec!["id".into()],
            zero_filled: vec![
                ZeroFill {
                    column: "dti".into(),
                    cells: 2,
                },
                ZeroFill {
                    column: "revol_util".into(),
                    cells: 1,
                },
            ],
        };
        assert_eq!(audit.total_zero_filled(), 3);
        assert!(!audit.is_clean());
        assert!(AlignmentAudit::default().is_clean());
    }
}
