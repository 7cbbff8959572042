//! Credit risk scoring CLI.

use clap::{ColorChoice, Parser};
use crs_cli::logging::{LogConfig, LogFormat, init_logging};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_batch, run_features, run_predict};
use crate::summary::{print_batch, print_features, print_prediction};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let outcome = match &cli.command {
        Command::Predict(args) => run_predict(&cli.scoring, args).map(|result| {
            print_prediction(&result);
        }),
        Command::Batch(args) => run_batch(&cli.scoring, args).map(|result| {
            print_batch(&result);
        }),
        Command::Features(args) => run_features(args).map(|result| {
            print_features(&result);
        }),
    };
    let exit_code = match outcome {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let level_filter = match cli.log_level {
        Some(LogLevelArg::Error) => LevelFilter::ERROR,
        Some(LogLevelArg::Warn) => LevelFilter::WARN,
        Some(LogLevelArg::Info) => LevelFilter::INFO,
        Some(LogLevelArg::Debug) => LevelFilter::DEBUG,
        Some(LogLevelArg::Trace) => LevelFilter::TRACE,
        None => cli.verbosity.tracing_level_filter(),
    };
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    let mut config = LogConfig::default()
        .with_level(level_filter)
        .with_format(format)
        .with_log_file(cli.log_file.clone())
        .with_log_data(cli.log_data);
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn json_conflicts_with_form_flags() {
        let parsed = Cli::try_parse_from([
            "credit-risk",
            "predict",
            "--json",
            "applicant.json",
            "--grade",
            "B",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn form_flags_fill_defaults() {
        let cli = Cli::try_parse_from(["credit-risk", "predict", "--grade", "C", "--fico", "640"])
            .unwrap();
        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        let form = args.form();
        assert_eq!(form.grade, "C");
        assert_eq!(form.fico_range_low, 640.0);
        assert_eq!(form.term, " 36 months");
        assert_eq!(form.sub_grade, "B1");
    }

    #[test]
    fn shared_options_are_global() {
        let cli = Cli::try_parse_from([
            "credit-risk",
            "batch",
            "loans.csv",
            "--threshold",
            "0.3",
            "--lenient",
        ])
        .unwrap();
        let overrides = cli.scoring.overrides();
        assert_eq!(overrides.threshold, Some(0.3));
        assert!(overrides.lenient);
        assert!(!overrides.strict_term);
    }

    #[test]
    fn log_level_disables_env_filter() {
        let cli = Cli::try_parse_from(["credit-risk", "--log-level", "debug", "features"]).unwrap();
        let config = log_config_from_cli(&cli);
        assert_eq!(config.level_filter, LevelFilter::DEBUG);
        assert!(!config.use_env_filter);
    }

    #[test]
    fn log_file_and_data_flags_reach_config() {
        let cli = Cli::try_parse_from([
            "credit-risk",
            "--log-file",
            "scoring.log",
            "--log-data",
            "--log-format",
            "json",
            "features",
        ])
        .unwrap();
        let config = log_config_from_cli(&cli);
        assert_eq!(config.log_file.as_deref(), Some(std::path::Path::new("scoring.log")));
        assert!(config.log_data);
        assert_eq!(config.format, LogFormat::Json);
        assert!(!config.with_ansi);
        assert!(config.use_env_filter);
    }
}
