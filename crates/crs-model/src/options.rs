//! Configuration options for the feature transformation pipeline.

use serde::{Deserialize, Serialize};

/// How raw category labels are matched against the ordinal mapping tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchingMode {
    /// Exact label after trimming surrounding whitespace.
    #[default]
    Strict,
    /// Also ignore ASCII case and collapse inner whitespace.
    Lenient,
}

/// How the loan term text is reduced to a 36/60 month flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermParsing {
    /// `1` if the text contains "60", otherwise `0`.
    ///
    /// This is how the training data was encoded, so it is the default.
    #[default]
    Substring,
    /// The text must carry exactly one integer, and it must be 36 or 60.
    Strict,
}

/// What to do when a target feature is absent from the raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFeaturePolicy {
    /// Zero-fill the feature, log a warning and record it in the report.
    #[default]
    Warn,
    /// Fail the transform with a schema error listing the absent features.
    Reject,
}

/// Options controlling the feature transformation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformOptions {
    /// Matching strictness for grade, sub-grade and employment length.
    pub matching: MatchingMode,

    /// Loan term parsing behaviour.
    pub term_parsing: TermParsing,

    /// Policy for target features that the input does not provide.
    pub missing_features: MissingFeaturePolicy,
}

impl TransformOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_matching(mut self, matching: MatchingMode) -> Self {
        self.matching = matching;
        self
    }

    pub fn with_term_parsing(mut self, term_parsing: TermParsing) -> Self {
        self.term_parsing = term_parsing;
        self
    }

    pub fn with_missing_features(mut self, policy: MissingFeaturePolicy) -> Self {
        self.missing_features = policy;
        self
    }

    /// Options that reject anything the training pipeline would have
    /// silently coerced: strict term parsing and absent features.
    ///
    /// Label matching stays strict as in the default.
    pub fn strict() -> Self {
        Self {
            matching: MatchingMode::Strict,
            term_parsing: TermParsing::Strict,
            missing_features: MissingFeaturePolicy::Reject,
        }
    }
}
