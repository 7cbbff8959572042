//! Integration tests for logging configuration.

use crs_cli::logging::{
    LogConfig, LogFormat, REDACTED_VALUE, default_directives, redact_value, set_log_data,
};
use tracing::level_filters::LevelFilter;

#[test]
fn test_applicant_values_are_redacted_by_default() {
    set_log_data(false);
    assert_eq!(redact_value("50000"), REDACTED_VALUE);
    set_log_data(true);
    assert_eq!(redact_value("50000"), "50000");
    set_log_data(false);
}

#[test]
fn test_default_config() {
    let config = LogConfig::default()
        .with_level(LevelFilter::INFO)
        .with_format(LogFormat::Json);
    assert_eq!(config.level_filter, LevelFilter::INFO);
    assert_eq!(config.format, LogFormat::Json);
    assert!(config.use_env_filter);
    assert!(!config.log_data);
}

#[test]
fn test_directives_cover_workspace_crates() {
    let directives = default_directives(LevelFilter::DEBUG);
    assert!(directives.starts_with("warn,"));
    assert!(directives.contains("crs_transform=debug"));
    assert!(directives.contains("crs_score=debug"));
}
