//! Numeric imputation with a previously fitted imputer.
//!
//! The fitted statistics are persisted as JSON:
//!
//! ```json
//! { "strategy": "median", "columns": ["dti", "revol_util"], "statistics": [17.9, 52.1] }
//! ```

use std::fmt;
use std::path::Path;

use polars::prelude::{Column, DataFrame};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crs_common::{column_f64, is_numeric_column};

use crate::error::{Result, TransformError};

/// Fills missing values of numeric columns.
pub trait Imputer: Send + Sync {
    /// Short description for reports and logs.
    fn describe(&self) -> String;

    /// Returns a copy of `df` with missing numeric values filled.
    fn transform(&self, df: &DataFrame) -> Result<DataFrame>;
}

/// Statistic the imputer was fitted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputeStrategy {
    Mean,
    Median,
    MostFrequent,
    Constant,
}

impl fmt::Display for ImputeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImputeStrategy::Mean => "mean",
            ImputeStrategy::Median => "median",
            ImputeStrategy::MostFrequent => "most_frequent",
            ImputeStrategy::Constant => "constant",
        };
        f.write_str(name)
    }
}

/// Per-column fill values learned at training time.
///
/// Built only through [`FittedImputer::new`] or the artifact loaders, which
/// check that every column has one finite statistic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedImputer {
    strategy: ImputeStrategy,
    columns: Vec<String>,
    statistics: Vec<f64>,
}

impl FittedImputer {
    pub fn new(
        strategy: ImputeStrategy,
        columns: Vec<String>,
        statistics: Vec<f64>,
    ) -> std::result::Result<Self, String> {
        let imputer = Self {
            strategy,
            columns,
            statistics,
        };
        imputer.validate()?;
        Ok(imputer)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.columns.len() != self.statistics.len() {
            return Err(format!(
                "{} columns but {} statistics",
                self.columns.len(),
                self.statistics.len()
            ));
        }
        if let Some((column, value)) = self
            .columns
            .iter()
            .zip(&self.statistics)
            .find(|(_, value)| !value.is_finite())
        {
            return Err(format!("statistic for {column} is not finite ({value})"));
        }
        Ok(())
    }

    /// Parses and validates a JSON artifact.
    pub fn from_json_str(text: &str) -> std::result::Result<Self, String> {
        let imputer: Self = serde_json::from_str(text).map_err(|err| err.to_string())?;
        imputer.validate()?;
        Ok(imputer)
    }

    /// Loads a JSON artifact from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let load_error = |message: String| TransformError::ImputerLoad {
            path: path.to_path_buf(),
            message,
        };
        let text = std::fs::read_to_string(path).map_err(|err| load_error(err.to_string()))?;
        Self::from_json_str(&text).map_err(load_error)
    }

    pub fn fill_value(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|name| name == column)
            .and_then(|idx| self.statistics.get(idx).copied())
    }
}

impl Imputer for FittedImputer {
    fn describe(&self) -> String {
        format!("{} imputer over {} columns", self.strategy, self.columns.len())
    }

    fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut out = df.clone();
        for (column, fill) in self.columns.iter().zip(&self.statistics) {
            let Ok(source) = df.column(column) else {
                continue;
            };
            if !is_numeric_column(source) {
                debug!(column = %column, "skipping non-numeric column");
                continue;
            }
            let Some(values) = column_f64(df, column) else {
                continue;
            };
            let filled: Vec<f64> = values.iter().map(|value| value.unwrap_or(*fill)).collect();
            out.with_column(Column::new(column.as_str().into(), filled))?;
        }
        Ok(out)
    }
}

/// Loads an imputer, logging a warning when it cannot be read.
///
/// The error text is returned so callers can report why imputation was
/// skipped instead of failing the transform.
pub fn load_imputer(path: &Path) -> std::result::Result<FittedImputer, String> {
    FittedImputer::from_path(path).map_err(|err| {
        warn!(
            path = %path.display(),
            error = %err,
            "imputer unavailable, continuing without imputation"
        );
        err.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn imputer() -> FittedImputer {
        FittedImputer::new(
            ImputeStrategy::Median,
            vec!["dti".into(), "revol_util".into(), "grade".into()],
            vec![17.5, 50.0, 3.0],
        )
        .unwrap()
    }

    #[test]
    fn fills_present_numeric_columns() {
        let df = DataFrame::new(vec![
            Column::new("dti".into(), [Some(10.0), None]),
            Column::new("grade".into(), [Some("B"), None]),
        ])
        .unwrap();

        let out = imputer().transform(&df).unwrap();
        assert_eq!(column_f64(&out, "dti").unwrap(), vec![Some(10.0), Some(17.5)]);
        // text columns and absent columns are left alone
        assert_eq!(out.column("grade").unwrap().null_count(), 1);
        assert!(out.column("revol_util").is_err());
        // input untouched
        assert_eq!(df.column("dti").unwrap().null_count(), 1);
    }

    #[test]
    fn validates_artifact() {
        assert!(FittedImputer::from_json_str(
            r#"{"strategy": "median", "columns": ["a", "b"], "statistics": [1.0]}"#
        )
        .is_err());
        assert!(FittedImputer::from_json_str(r#"{"strategy": "knn", "columns": [], "statistics": []}"#).is_err());
        let parsed = FittedImputer::from_json_str(
            r#"{"strategy": "mean", "columns": ["a"], "statistics": [2.5]}"#,
        )
        .unwrap();
        assert_eq!(parsed.fill_value("a"), Some(2.5));
        assert_eq!(parsed.describe(), "mean imputer over 1 columns");
    }

    #[test]
    fn fill_value_tolerates_short_statistics() {
        let imputer = FittedImputer {
            strategy: ImputeStrategy::Constant,
            columns: vec!["a".into(), "b".into()],
            statistics: vec![1.0],
        };
        assert!(imputer.validate().is_err());
        assert_eq!(imputer.fill_value("a"), Some(1.0));
        assert_eq!(imputer.fill_value("b"), None);
        assert_eq!(imputer.fill_value("c"), None);
    }

    #[test]
    fn load_failure_degrades() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let reason = load_imputer(file.path()).unwrap_err();
        assert!(reason.starts_with("failed to load imputer"));
        assert!(load_imputer(Path::new("/nonexistent/imputer.json")).is_err());
    }
}
