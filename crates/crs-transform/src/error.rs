//! Error types for the feature transformation pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while transforming raw applicant data.
///
/// Row indices are zero-based positions in the input frame.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A categorical value with no entry in its mapping table.
    #[error("unknown {column} value '{value}' at row {row}")]
    UnknownCategory {
        column: String,
        row: usize,
        value: String,
    },

    /// A date that matches none of the accepted formats.
    #[error("cannot parse {column} date '{value}' at row {row}")]
    DateParse {
        column: String,
        row: usize,
        value: String,
    },

    /// A model feature holding a value that is not a number.
    #[error("feature {column} has non-numeric value '{value}' at row {row}")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },

    /// Model features absent from the input when absent features are rejected.
    #[error("input is missing model features: {}", columns.join(", "))]
    MissingFeatures { columns: Vec<String> },

    /// The imputer artifact could not be read or is malformed.
    #[error("failed to load imputer {path}: {message}")]
    ImputerLoad { path: PathBuf, message: String },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for TransformError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for transformation operations.
pub type Result<T> = std::result::Result<T, TransformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TransformError::UnknownCategory {
            column: "grade".to_string(),
            row: 3,
            value: "H".to_string(),
        };
        insta::assert_snapshot!(err.to_string(), @"unknown grade value 'H' at row 3");

        let err = TransformError::MissingFeatures {
            columns: vec!["dti".to_string(), "ME_pce".to_string()],
        };
        insta::assert_snapshot!(err.to_string(), @"input is missing model features: dti, ME_pce");
    }
}
