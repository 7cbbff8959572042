//! Configuration file handling.
//!
//! Settings are resolved in three layers: built-in defaults, then the TOML
//! configuration file, then command-line flags. Without `--config` the file
//! is looked up in the platform configuration folder:
//! - macOS: ~/Library/Application Support/com.credit-risk.Credit-Risk/
//! - Windows: %APPDATA%/credit-risk/Credit Risk/config/
//! - Linux: ~/.config/credit-risk/

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crs_model::{
    DEFAULT_THRESHOLD, MatchingMode, MissingFeaturePolicy, RiskPolicy, TermParsing,
    TransformOptions,
};

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "credit-risk";
const APP_NAME: &str = "Credit Risk";
const CONFIG_FILENAME: &str = "config.toml";

/// Model artifact used when neither the file nor the flags name one.
pub const DEFAULT_MODEL_PATH: &str = "credit_risk_model_bundle.json";

/// Contents of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub scoring: ScoringSettings,
    pub transform: TransformOptions,
}

/// The `[scoring]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringSettings {
    pub model_path: Option<PathBuf>,
    pub imputer_path: Option<PathBuf>,
    pub threshold: f64,
    /// Expected SHA-256 of the model artifact, hex encoded.
    pub model_sha256: Option<String>,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            model_path: None,
            imputer_path: None,
            threshold: DEFAULT_THRESHOLD,
            model_sha256: None,
        }
    }
}

/// Get the path to the default configuration file.
///
/// Returns `None` if the platform-specific directory cannot be determined.
pub fn settings_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

/// Parse settings from TOML text.
pub fn parse_settings(content: &str) -> Result<Settings> {
    toml::from_str(content).context("invalid configuration")
}

/// Load settings.
///
/// An explicit path must exist and parse. The default location degrades to
/// built-in defaults when the file is missing or unreadable.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    if let Some(path) = explicit {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let settings = parse_settings(&content)
            .with_context(|| format!("failed to load config {}", path.display()))?;
        tracing::info!(path = %path.display(), "loaded configuration");
        return Ok(settings);
    }

    let Some(path) = settings_path() else {
        tracing::warn!("could not determine configuration path, using defaults");
        return Ok(Settings::default());
    };
    Ok(load_default_settings(&path))
}

fn load_default_settings(path: &Path) -> Settings {
    match fs::read_to_string(path) {
        Ok(content) => match parse_settings(&content) {
            Ok(settings) => {
                tracing::info!(path = %path.display(), "loaded configuration");
                settings
            }
            Err(error) => {
                tracing::warn!("failed to parse {}: {error:#}, using defaults", path.display());
                Settings::default()
            }
        },
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no configuration file, using defaults");
            Settings::default()
        }
        Err(error) => {
            tracing::warn!("failed to read {}: {error}, using defaults", path.display());
            Settings::default()
        }
    }
}

/// Values given on the command line; `None`/`false` leave the file value.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub model: Option<PathBuf>,
    pub imputer: Option<PathBuf>,
    pub threshold: Option<f64>,
    pub lenient: bool,
    pub strict_term: bool,
    pub reject_missing_features: bool,
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub model_path: PathBuf,
    pub imputer_path: Option<PathBuf>,
    pub model_sha256: Option<String>,
    pub policy: RiskPolicy,
    pub options: TransformOptions,
}

impl Settings {
    /// Apply command-line overrides and validate the result.
    pub fn resolve(self, overrides: &CliOverrides) -> Result<ResolvedConfig> {
        let scoring = self.scoring;
        let threshold = overrides.threshold.unwrap_or(scoring.threshold);
        let policy = RiskPolicy::new(threshold).context("invalid decision threshold")?;

        let mut options = self.transform;
        if overrides.lenient {
            options = options.with_matching(MatchingMode::Lenient);
        }
        if overrides.strict_term {
            options = options.with_term_parsing(TermParsing::Strict);
        }
        if overrides.reject_missing_features {
            options = options.with_missing_features(MissingFeaturePolicy::Reject);
        }

        Ok(ResolvedConfig {
            model_path: overrides
                .model
                .clone()
                .or(scoring.model_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),
            imputer_path: overrides.imputer.clone().or(scoring.imputer_path),
            model_sha256: scoring.model_sha256,
            policy,
            options,
        })
    }
}
