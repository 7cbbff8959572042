//! Subcommand implementations.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use polars::prelude::DataFrame;
use tracing::{info, trace};

use crs_cli::config::{ResolvedConfig, load_settings};
use crs_cli::logging::redact_value;
use crs_ingest::{ApplicantRecord, CsvOptions, read_csv};
use crs_model::{FeatureDescription, FeatureSet, RiskPolicy, describe, dictionary};
use crs_score::{
    ApplicantScore, ModelBundle, ScoredBatch, default_report_path, score_applicant, score_batch,
    write_report,
};
use crs_transform::FeaturePipeline;

use crate::cli::{BatchArgs, FeaturesArgs, PredictArgs, ScoringArgs};

/// Model, pipeline and policy for one invocation.
struct ScoringContext {
    model: ModelBundle,
    pipeline: FeaturePipeline,
    policy: RiskPolicy,
}

fn resolve_config(args: &ScoringArgs) -> Result<ResolvedConfig> {
    let settings = load_settings(args.config.as_deref())?;
    settings.resolve(&args.overrides())
}

fn load_context(args: &ScoringArgs) -> Result<ScoringContext> {
    let config = resolve_config(args)?;
    let model = ModelBundle::load(&config.model_path, config.model_sha256.as_deref())
        .with_context(|| format!("failed to load model {}", config.model_path.display()))?;
    let features = model
        .feature_set()
        .context("model artifact has an unusable feature list")?;
    let mut pipeline = FeaturePipeline::new(features).with_options(config.options);
    if let Some(path) = &config.imputer_path {
        pipeline = pipeline.with_imputer_path(path);
    }
    Ok(ScoringContext {
        model,
        pipeline,
        policy: config.policy,
    })
}

/// Result of `predict`.
pub struct PredictResult {
    pub record: ApplicantRecord,
    pub score: ApplicantScore,
    pub threshold: f64,
    pub model_sha256: String,
}

pub fn run_predict(scoring: &ScoringArgs, args: &PredictArgs) -> Result<PredictResult> {
    let record = match &args.json {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            ApplicantRecord::from_json_str(&text)
                .with_context(|| format!("invalid applicant record in {}", path.display()))?
        }
        None => args.form().to_record().context("invalid applicant form")?,
    };
    for (name, value) in record.iter() {
        let value = value.to_string();
        trace!(field = name, value = redact_value(&value), "applicant field");
    }

    let context = load_context(scoring)?;
    let raw = record.to_frame().context("failed to build applicant frame")?;
    let score = score_applicant(&raw, &context.pipeline, &context.model, &context.policy)
        .context("scoring failed")?;
    info!(
        probability = score.probability,
        decision = %score.decision,
        "applicant scored"
    );
    Ok(PredictResult {
        record,
        score,
        threshold: context.policy.threshold(),
        model_sha256: context.model.sha256().to_string(),
    })
}

/// Result of `batch`.
pub struct BatchResult {
    pub input: PathBuf,
    pub preview: DataFrame,
    pub scored: ScoredBatch,
    pub report_path: PathBuf,
    pub threshold: f64,
}

pub fn run_batch(scoring: &ScoringArgs, args: &BatchArgs) -> Result<BatchResult> {
    let delimiter = delimiter_byte(args.delimiter)?;
    let options = CsvOptions::default().with_delimiter(delimiter);
    let raw = read_csv(&args.input, &options)
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    let preview = raw.head(Some(args.preview));

    let context = load_context(scoring)?;
    let scored = score_batch(&raw, &context.pipeline, &context.model, &context.policy)
        .context("scoring failed")?;

    let report_path = report_path(&args.input, args.output.as_deref());
    write_report(&scored.frame, &report_path)
        .with_context(|| format!("failed to write report {}", report_path.display()))?;
    info!(path = %report_path.display(), rows = scored.frame.height(), "report written");

    Ok(BatchResult {
        input: args.input.clone(),
        preview,
        scored,
        report_path,
        threshold: context.policy.threshold(),
    })
}

fn report_path(input: &Path, output: Option<&Path>) -> PathBuf {
    output.map_or_else(|| default_report_path(input), Path::to_path_buf)
}

fn delimiter_byte(delimiter: char) -> Result<u8> {
    if !delimiter.is_ascii() {
        bail!("delimiter must be a single ASCII character, got '{delimiter}'");
    }
    Ok(delimiter as u8)
}

/// Result of `features`.
pub enum FeaturesResult {
    All(Vec<FeatureDescription>),
    One(FeatureDescription),
}

pub fn run_features(args: &FeaturesArgs) -> Result<FeaturesResult> {
    let features = FeatureSet::consensus();
    match &args.name {
        Some(name) => Ok(FeaturesResult::One(describe(&features, name)?)),
        None => Ok(FeaturesResult::All(dictionary(&features))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_must_be_ascii() {
        assert_eq!(delimiter_byte(';').unwrap(), b';');
        assert!(delimiter_byte('§').is_err());
    }

    #[test]
    fn report_defaults_next_to_input() {
        let path = report_path(Path::new("data/loans.csv"), None);
        assert_eq!(path, Path::new("data/reporte_riesgo_crediticio.csv"));
        let path = report_path(Path::new("data/loans.csv"), Some(Path::new("out.csv")));
        assert_eq!(path, Path::new("out.csv"));
    }

    #[test]
    fn unknown_feature_is_an_error() {
        let args = FeaturesArgs {
            name: Some("zip_code".to_string()),
        };
        assert!(run_features(&args).is_err());
    }
}
