//! Error types for model loading and scoring.

use std::path::PathBuf;
use thiserror::Error;

use crs_transform::TransformError;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("failed to read model artifact {path}: {source}")]
    ArtifactRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model artifact {path}: {message}")]
    ArtifactParse { path: PathBuf, message: String },

    #[error("sha256 mismatch for {path} (expected {expected}, got {actual})")]
    Sha256Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("invalid sha256 '{value}': must be 64 hex characters")]
    InvalidSha256 { value: String },

    /// The artifact parsed but describes an unusable model.
    #[error("invalid model: {message}")]
    InvalidModel { message: String },

    #[error("feature mismatch: model expects [{}], input has [{}]", expected.join(", "), actual.join(", "))]
    FeatureMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("feature {column} is not numeric")]
    NonNumericFeature { column: String },

    #[error("feature {column} is missing a value at row {row}")]
    MissingValue { column: String, row: usize },

    #[error("expected a single applicant, input has {rows} rows")]
    NotSingleApplicant { rows: usize },

    #[error("model returned {actual} probabilities for {expected} rows")]
    RowCountMismatch { expected: usize, actual: usize },

    #[error("model returned invalid probability {value} at row {row}")]
    InvalidProbability { row: usize, value: f64 },

    #[error("failed to write report {path}: {message}")]
    ReportWrite { path: PathBuf, message: String },

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for ScoreError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScoreError>;
