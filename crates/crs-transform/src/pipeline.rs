//! The feature transformation pipeline.
//!
//! Steps run in a fixed order, each only when its source columns are present:
//!
//! 1. credit age from `issue_d` and `earliest_cr_line`
//! 2. ordinal codes for `grade` and `emp_length`, then the `term` flag and
//!    `sub_grade` codes
//! 3. `{column}_missing` indicators for `mths_since*` columns
//! 4. one-hot expansion of the nominal columns
//! 5. numeric imputation, when an imputer is available
//! 6. alignment to the feature set
//!
//! The caller's frame is never modified; every run works on a clone.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use polars::prelude::DataFrame;
use tracing::{debug, info, info_span, warn};

use crs_common::{column_f64, has_column, is_numeric_column};
use crs_model::{FeatureSet, TransformOptions};

use crate::align::align_features;
use crate::datetime::derive_credit_age;
use crate::encode::{binarize_term, encode_emp_length, encode_grade, encode_sub_grade};
use crate::error::Result;
use crate::impute::{Imputer, load_imputer};
use crate::indicators::add_missing_indicators;
use crate::one_hot::{NOMINAL_COLUMNS, one_hot_encode};
use crate::report::{ImputationStatus, PipelineStep, StepOutcome, TransformReport};

#[derive(Clone, Default)]
enum ImputerSlot {
    #[default]
    None,
    Ready(Arc<dyn Imputer>),
    Unavailable(String),
}

impl fmt::Debug for ImputerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Ready(imputer) => write!(f, "Ready({})", imputer.describe()),
            Self::Unavailable(reason) => write!(f, "Unavailable({reason})"),
        }
    }
}

/// Model-ready features plus a record of how they were produced.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub frame: DataFrame,
    pub report: TransformReport,
}

/// Turns raw applicant rows into the model's feature matrix.
#[derive(Debug, Clone)]
pub struct FeaturePipeline {
    features: FeatureSet,
    options: TransformOptions,
    imputer: ImputerSlot,
}

impl Default for FeaturePipeline {
    fn default() -> Self {
        Self::new(FeatureSet::consensus())
    }
}

impl FeaturePipeline {
    pub fn new(features: FeatureSet) -> Self {
        Self {
            features,
            options: TransformOptions::default(),
            imputer: ImputerSlot::None,
        }
    }

    pub fn with_options(mut self, options: TransformOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_imputer(mut self, imputer: impl Imputer + 'static) -> Self {
        self.imputer = ImputerSlot::Ready(Arc::new(imputer));
        self
    }

    /// Loads the imputer artifact at `path`.
    ///
    /// A missing or corrupt artifact does not fail: the pipeline runs
    /// without imputation and reports the step as skipped.
    pub fn with_imputer_path(mut self, path: &Path) -> Self {
        self.imputer = match load_imputer(path) {
            Ok(imputer) => ImputerSlot::Ready(Arc::new(imputer)),
            Err(reason) => ImputerSlot::Unavailable(reason),
        };
        self
    }

    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    pub fn has_imputer(&self) -> bool {
        matches!(self.imputer, ImputerSlot::Ready(_))
    }

    /// Runs every step on a copy of `raw`.
    pub fn transform(&self, raw: &DataFrame) -> Result<TransformOutput> {
        let span = info_span!("transform", rows = raw.height());
        let _guard = span.enter();

        let height = raw.height();
        let mut df = raw.clone();
        let mut steps = Vec::new();
        let mut record = |step: PipelineStep, affected: Option<usize>| {
            if let Some(affected) = affected {
                debug!(step = %step, affected, "step complete");
                steps.push(StepOutcome { step, affected });
            }
        };

        let matching = self.options.matching;
        record(PipelineStep::CreditAge, derive_credit_age(&mut df)?);
        record(PipelineStep::GradeEncoding, encode_grade(&mut df, matching)?);
        record(
            PipelineStep::EmpLengthEncoding,
            encode_emp_length(&mut df, matching)?,
        );
        record(
            PipelineStep::TermBinarization,
            binarize_term(&mut df, self.options.term_parsing)?,
        );
        record(
            PipelineStep::SubGradeEncoding,
            encode_sub_grade(&mut df, matching)?,
        );

        let indicators = add_missing_indicators(&mut df)?;
        if !indicators.is_empty() {
            record(PipelineStep::MissingIndicators, Some(indicators.len()));
        }

        if NOMINAL_COLUMNS.iter().any(|column| has_column(&df, column)) {
            let added = one_hot_encode(&mut df, &NOMINAL_COLUMNS)?;
            record(PipelineStep::OneHotEncoding, Some(added.len()));
        }

        let imputation = match &self.imputer {
            ImputerSlot::None => ImputationStatus::NotConfigured,
            ImputerSlot::Unavailable(reason) => ImputationStatus::Skipped {
                reason: reason.clone(),
            },
            ImputerSlot::Ready(imputer) => {
                let before = missing_numeric_cells(&df);
                match imputer.transform(&df) {
                    Ok(imputed) => {
                        let cells_filled = before.saturating_sub(missing_numeric_cells(&imputed));
                        df = imputed;
                        record(PipelineStep::Imputation, Some(cells_filled));
                        ImputationStatus::Applied {
                            imputer: imputer.describe(),
                            cells_filled,
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, "imputation failed, continuing without it");
                        ImputationStatus::Skipped {
                            reason: err.to_string(),
                        }
                    }
                }
            }
        };

        let (frame, alignment) =
            align_features(&df, &self.features, height, self.options.missing_features)?;
        record(PipelineStep::Alignment, Some(self.features.len()));

        info!(
            rows = height,
            features = self.features.len(),
            absent = alignment.absent.len(),
            zero_filled = alignment.total_zero_filled(),
            imputation = %imputation,
            "transform complete"
        );

        Ok(TransformOutput {
            frame,
            report: TransformReport {
                rows: height,
                steps,
                imputation,
                alignment,
            },
        })
    }
}

fn missing_numeric_cells(df: &DataFrame) -> usize {
    df.get_columns()
        .iter()
        .filter(|column| is_numeric_column(column))
        .filter_map(|column| column_f64(df, column.name()))
        .map(|values| values.iter().filter(|value| value.is_none()).count())
        .sum()
}

/// Transforms `raw` to `features` with default options and no imputer.
pub fn transform_features(raw: &DataFrame, features: &FeatureSet) -> Result<DataFrame> {
    let pipeline = FeaturePipeline::new(features.clone());
    Ok(pipeline.transform(raw)?.frame)
}
