//! Credit risk scoring data model.
//!
//! - **features**: the ordered feature set the model was trained on
//! - **dictionary**: human-readable descriptions of those features
//! - **enums**: ordinal mapping tables (grade, sub-grade, employment length, term)
//! - **options**: transformation pipeline options
//! - **decision**: threshold policy turning a probability into a decision

pub mod decision;
pub mod dictionary;
pub mod enums;
pub mod error;
pub mod features;
pub mod lookup;
pub mod options;

pub use decision::{
    DEFAULT_THRESHOLD, Decision, MAX_THRESHOLD, MIN_THRESHOLD, RiskPolicy,
};
pub use dictionary::{FeatureCategory, FeatureDescription, MACRO_PREFIX, describe, dictionary};
pub use enums::{EmpLength, Grade, LoanTerm, SubGrade};
pub use error::{ModelError, Result};
pub use features::{FEATURES_CONSENSUS, FeatureSet};
pub use options::{MatchingMode, MissingFeaturePolicy, TermParsing, TransformOptions};
