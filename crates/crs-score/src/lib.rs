//! Scoring for credit risk: model artifacts, batch scoring and reports.

pub mod error;
pub mod hash;
pub mod matrix;
pub mod model;
pub mod report;
pub mod score;

pub use error::{Result, ScoreError};
pub use hash::sha256_hex;
pub use matrix::FeatureMatrix;
pub use model::{Estimator, ModelBundle, ScoringModel, Tree, TreeNode};
pub use report::{
    DEFAULT_REPORT_NAME, SUMMARY_COLUMNS, default_report_path, summary_columns, write_report,
    write_report_to,
};
pub use score::{
    ApplicantScore, DECISION, PROB_DEFAULT, ScoredBatch, score_applicant, score_batch,
};
