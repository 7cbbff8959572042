//! Integration tests for configuration loading and resolution.

use std::fs;
use std::path::PathBuf;

use crs_cli::config::{CliOverrides, DEFAULT_MODEL_PATH, Settings, load_settings, parse_settings};
use crs_model::{MatchingMode, MissingFeaturePolicy, TermParsing};

const CONFIG: &str = r#"
[scoring]
model_path = "models/bundle.json"
imputer_path = "models/imputer.json"
threshold = 0.35
model_sha256 = "ABCDEF"

[transform]
matching = "lenient"
missing_features = "reject"
"#;

#[test]
fn test_parse_full_config() {
    let settings = parse_settings(CONFIG).unwrap();
    assert_eq!(
        settings.scoring.model_path,
        Some(PathBuf::from("models/bundle.json"))
    );
    assert_eq!(settings.scoring.threshold, 0.35);
    assert_eq!(settings.transform.matching, MatchingMode::Lenient);
    assert_eq!(settings.transform.term_parsing, TermParsing::Substring);
    assert_eq!(
        settings.transform.missing_features,
        MissingFeaturePolicy::Reject
    );
}

#[test]
fn test_empty_config_uses_defaults() {
    let resolved = parse_settings("")
        .unwrap()
        .resolve(&CliOverrides::default())
        .unwrap();
    assert_eq!(resolved.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
    assert_eq!(resolved.imputer_path, None);
    assert_eq!(resolved.policy.threshold(), 0.5);
    assert_eq!(resolved.options.term_parsing, TermParsing::Substring);
}

#[test]
fn test_flags_override_file() {
    let overrides = CliOverrides {
        model: Some(PathBuf::from("other.json")),
        threshold: Some(0.7),
        strict_term: true,
        ..CliOverrides::default()
    };
    let resolved = parse_settings(CONFIG).unwrap().resolve(&overrides).unwrap();
    assert_eq!(resolved.model_path, PathBuf::from("other.json"));
    assert_eq!(
        resolved.imputer_path,
        Some(PathBuf::from("models/imputer.json"))
    );
    assert_eq!(resolved.policy.threshold(), 0.7);
    assert_eq!(resolved.options.term_parsing, TermParsing::Strict);
    assert_eq!(resolved.options.matching, MatchingMode::Lenient);
    assert_eq!(resolved.model_sha256.as_deref(), Some("ABCDEF"));
}

#[test]
fn test_threshold_out_of_range_is_rejected() {
    let overrides = CliOverrides {
        threshold: Some(0.95),
        ..CliOverrides::default()
    };
    let error = Settings::default().resolve(&overrides).unwrap_err();
    insta::assert_snapshot!(
        format!("{error:#}"),
        @"invalid decision threshold: decision threshold 0.95 is outside 0.1..=0.9"
    );
}

#[test]
fn test_unknown_option_value_is_an_error() {
    assert!(parse_settings("[transform]\nterm_parsing = \"regex\"\n").is_err());
}

#[test]
fn test_explicit_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("credit-risk.toml");
    fs::write(&path, CONFIG).unwrap();
    let settings = load_settings(Some(&path)).unwrap();
    assert_eq!(settings.scoring.threshold, 0.35);

    fs::write(&path, "[scoring]\nthreshold = \"high\"\n").unwrap();
    assert!(load_settings(Some(&path)).is_err());
    assert!(load_settings(Some(&dir.path().join("missing.toml"))).is_err());
}
