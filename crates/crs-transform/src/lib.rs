//! Feature transformation for credit risk scoring.
//!
//! This crate turns raw applicant rows into the exact numeric matrix the
//! scoring model was trained on:
//!
//! - **datetime**: date parsing and the credit-age derivation
//! - **encode**: ordinal codes for grade, sub-grade and employment length, and the term flag
//! - **indicators**: missing-value indicators for `mths_since*` columns
//! - **one_hot**: categorical expansion of nominal columns
//! - **impute**: the fitted imputer collaborator
//! - **align**: reindexing to the feature set with an audit of what was filled
//! - **pipeline**: the ordered pipeline tying the steps together

pub mod align;
pub mod datetime;
pub mod encode;
pub mod error;
pub mod impute;
pub mod indicators;
pub mod one_hot;
pub mod pipeline;
pub mod report;

pub use align::align_features;
pub use datetime::{CREDIT_AGE, derive_credit_age, parse_datetime};
pub use error::{Result, TransformError};
pub use impute::{FittedImputer, ImputeStrategy, Imputer, load_imputer};
pub use indicators::add_missing_indicators;
pub use one_hot::{NOMINAL_COLUMNS, one_hot_encode};
pub use pipeline::{FeaturePipeline, TransformOutput, transform_features};
pub use report::{
    AlignmentAudit, ImputationStatus, PipelineStep, StepOutcome, TransformReport, ZeroFill,
};
