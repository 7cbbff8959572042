//! Error types for the credit risk data model.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// A value that has no entry in an ordinal mapping table.
    #[error("unknown {table} value '{value}'")]
    UnknownCategory { table: &'static str, value: String },

    #[error("invalid feature set: {message}")]
    InvalidFeatureSet { message: String },

    #[error("unknown feature '{name}'")]
    UnknownFeature { name: String },

    #[error("decision threshold {value} is outside {min}..={max}")]
    InvalidThreshold { value: f64, min: f64, max: f64 },
}

pub type Result<T> = std::result::Result<T, ModelError>;
