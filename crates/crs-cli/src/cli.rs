//! CLI argument definitions for the credit risk scorer.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use crs_ingest::ApplicantForm;

use crs_cli::config::CliOverrides;

#[derive(Parser)]
#[command(
    name = "credit-risk",
    version,
    about = "Credit risk scoring - probability of default for loan applicants",
    long_about = "Score loan applicants with a trained probability-of-default model.\n\n\
                  Raw applicant attributes are transformed into the model's feature\n\
                  set and every applicant is approved or rejected against a threshold."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub scoring: ScoringArgs,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow applicant values in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Score a single applicant.
    Predict(PredictArgs),

    /// Score every applicant of a delimited file and write a risk report.
    Batch(BatchArgs),

    /// List the model features, or explain one.
    Features(FeaturesArgs),
}

/// Options shared by every subcommand.
#[derive(Args)]
pub struct ScoringArgs {
    /// Configuration file (default: platform config folder).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Model artifact (JSON bundle or bare estimator).
    #[arg(long = "model", value_name = "PATH", global = true)]
    pub model: Option<PathBuf>,

    /// Fitted imputer artifact. Scoring continues without it if unreadable.
    #[arg(long = "imputer", value_name = "PATH", global = true)]
    pub imputer: Option<PathBuf>,

    /// Reject applicants whose probability of default exceeds this value (0.1 to 0.9).
    #[arg(long = "threshold", value_name = "T", global = true)]
    pub threshold: Option<f64>,

    /// Ignore case and extra spaces when matching grade and employment labels.
    #[arg(long = "lenient", global = true)]
    pub lenient: bool,

    /// Require the loan term to be exactly 36 or 60 months.
    #[arg(long = "strict-term", global = true)]
    pub strict_term: bool,

    /// Fail instead of zero-filling model features absent from the input.
    #[arg(long = "reject-missing-features", global = true)]
    pub reject_missing_features: bool,
}

impl ScoringArgs {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            model: self.model.clone(),
            imputer: self.imputer.clone(),
            threshold: self.threshold,
            lenient: self.lenient,
            strict_term: self.strict_term,
            reject_missing_features: self.reject_missing_features,
        }
    }
}

#[derive(Args)]
pub struct PredictArgs {
    /// Read the applicant from a JSON object instead of the form flags.
    #[arg(
        long = "json",
        value_name = "FILE",
        conflicts_with_all = [
            "loan_amnt", "term", "int_rate", "annual_inc", "fico",
            "emp_length", "grade", "sub_grade", "dti",
        ]
    )]
    pub json: Option<PathBuf>,

    /// Requested loan amount.
    #[arg(long = "loan-amnt", value_name = "AMOUNT")]
    pub loan_amnt: Option<f64>,

    /// Loan term, e.g. " 36 months" or " 60 months".
    #[arg(long = "term", value_name = "TEXT", allow_hyphen_values = true)]
    pub term: Option<String>,

    /// Interest rate in percent.
    #[arg(long = "int-rate", value_name = "PERCENT")]
    pub int_rate: Option<f64>,

    /// Annual income.
    #[arg(long = "annual-inc", value_name = "AMOUNT")]
    pub annual_inc: Option<f64>,

    /// Lower bound of the FICO range (300 to 850).
    #[arg(long = "fico", value_name = "SCORE")]
    pub fico: Option<f64>,

    /// Employment length, e.g. "< 1 year", "5 years", "10+ years".
    #[arg(long = "emp-length", value_name = "TEXT")]
    pub emp_length: Option<String>,

    /// Credit grade (A to G).
    #[arg(long = "grade", value_name = "LETTER")]
    pub grade: Option<String>,

    /// Credit sub-grade (A1 to G5).
    #[arg(long = "sub-grade", value_name = "CODE")]
    pub sub_grade: Option<String>,

    /// Debt-to-income ratio.
    #[arg(long = "dti", value_name = "RATIO")]
    pub dti: Option<f64>,
}

impl PredictArgs {
    /// The manual form with defaults for every flag not given.
    pub fn form(&self) -> ApplicantForm {
        let defaults = ApplicantForm::default();
        ApplicantForm {
            loan_amnt: self.loan_amnt.unwrap_or(defaults.loan_amnt),
            term: self.term.clone().unwrap_or(defaults.term),
            int_rate: self.int_rate.unwrap_or(defaults.int_rate),
            annual_inc: self.annual_inc.unwrap_or(defaults.annual_inc),
            fico_range_low: self.fico.unwrap_or(defaults.fico_range_low),
            emp_length: self.emp_length.clone().unwrap_or(defaults.emp_length),
            grade: self.grade.clone().unwrap_or(defaults.grade),
            sub_grade: self.sub_grade.clone().unwrap_or(defaults.sub_grade),
            dti: self.dti.unwrap_or(defaults.dti),
        }
    }
}

#[derive(Args)]
pub struct BatchArgs {
    /// Delimited file with one applicant per row and a header line.
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Report path (default: reporte_riesgo_crediticio.csv next to FILE).
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Number of input rows to preview before scoring.
    #[arg(long = "preview", value_name = "N", default_value_t = 5)]
    pub preview: usize,

    /// Field delimiter of the input file.
    #[arg(long = "delimiter", value_name = "CHAR", default_value_t = ',')]
    pub delimiter: char,
}

#[derive(Args)]
pub struct FeaturesArgs {
    /// Feature to explain.
    #[arg(value_name = "NAME")]
    pub name: Option<String>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
