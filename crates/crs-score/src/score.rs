//! Scoring raw applicant data end to end.

use polars::prelude::{Column, DataFrame};
use tracing::{info, info_span};

use crs_model::{Decision, RiskPolicy};
use crs_transform::{FeaturePipeline, TransformReport};

use crate::error::{Result, ScoreError};
use crate::matrix::FeatureMatrix;
use crate::model::ScoringModel;

/// Column holding the probability of default.
pub const PROB_DEFAULT: &str = "Prob_Default";
/// Column holding the approval decision.
pub const DECISION: &str = "Decision";

/// The caller's rows with `Prob_Default` and `Decision` appended.
#[derive(Debug, Clone)]
pub struct ScoredBatch {
    pub frame: DataFrame,
    pub probabilities: Vec<f64>,
    pub decisions: Vec<Decision>,
    pub report: TransformReport,
}

impl ScoredBatch {
    pub fn rejected(&self) -> usize {
        self.decisions
            .iter()
            .filter(|decision| **decision == Decision::Rejected)
            .count()
    }

    pub fn approved(&self) -> usize {
        self.decisions.len() - self.rejected()
    }
}

/// Outcome for a single applicant.
#[derive(Debug, Clone)]
pub struct ApplicantScore {
    pub probability: f64,
    pub decision: Decision,
    pub report: TransformReport,
}

fn check_probabilities(probabilities: &[f64], rows: usize) -> Result<()> {
    if probabilities.len() != rows {
        return Err(ScoreError::RowCountMismatch {
            expected: rows,
            actual: probabilities.len(),
        });
    }
    if let Some((row, value)) = probabilities
        .iter()
        .enumerate()
        .find(|(_, p)| !(0.0..=1.0).contains(*p))
    {
        return Err(ScoreError::InvalidProbability { row, value: *value });
    }
    Ok(())
}

/// Transforms, predicts and decides for every row of `raw`.
///
/// Either every row is scored or an error is returned; `raw` is never
/// modified.
pub fn score_batch(
    raw: &DataFrame,
    pipeline: &FeaturePipeline,
    model: &dyn ScoringModel,
    policy: &RiskPolicy,
) -> Result<ScoredBatch> {
    let span = info_span!("score", rows = raw.height());
    let _guard = span.enter();

    let output = pipeline.transform(raw)?;
    let matrix = FeatureMatrix::from_frame(&output.frame)?;
    let probabilities = model.predict_probability(&matrix)?;
    check_probabilities(&probabilities, raw.height())?;
    let decisions: Vec<Decision> = probabilities.iter().map(|p| policy.decide(*p)).collect();

    let mut frame = raw.clone();
    frame.with_column(Column::new(PROB_DEFAULT.into(), probabilities.clone()))?;
    let labels: Vec<&str> = decisions.iter().map(Decision::as_str).collect();
    frame.with_column(Column::new(DECISION.into(), labels))?;

    let batch = ScoredBatch {
        frame,
        probabilities,
        decisions,
        report: output.report,
    };
    info!(
        rows = batch.decisions.len(),
        approved = batch.approved(),
        rejected = batch.rejected(),
        threshold = policy.threshold(),
        "batch scored"
    );
    Ok(batch)
}

/// Scores a one-row frame.
pub fn score_applicant(
    raw: &DataFrame,
    pipeline: &FeaturePipeline,
    model: &dyn ScoringModel,
    policy: &RiskPolicy,
) -> Result<ApplicantScore> {
    if raw.height() != 1 {
        return Err(ScoreError::NotSingleApplicant { rows: raw.height() });
    }
    let batch = score_batch(raw, pipeline, model, policy)?;
    Ok(ApplicantScore {
        probability: batch.probabilities[0],
        decision: batch.decisions[0],
        report: batch.report,
    })
}
