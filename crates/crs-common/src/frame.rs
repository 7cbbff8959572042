//! Column-level DataFrame helpers.
//!
//! The transformation steps read a column into plain Rust values, compute,
//! and write a fresh column back. These helpers do the reading.

use polars::prelude::{AnyValue, Column, DataFrame, DataType};

use crate::polars::{any_to_f64, any_to_string_non_empty};

/// Returns true if the frame has a column with exactly this name.
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

/// Returns true if the column holds numbers (integers, floats or booleans).
pub fn is_numeric_column(column: &Column) -> bool {
    let dtype = column.dtype();
    dtype.is_float() || dtype.is_integer() || matches!(dtype, DataType::Boolean)
}

/// Reads a column as optional strings; blank and null cells become `None`.
///
/// Non-blank values are returned untrimmed so that callers can decide how
/// strict to be about surrounding whitespace.
pub fn column_strings(df: &DataFrame, name: &str) -> Option<Vec<Option<String>>> {
    let column = df.column(name).ok()?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        values.push(any_to_string_non_empty(
            column.get(idx).unwrap_or(AnyValue::Null),
        ));
    }
    Some(values)
}

/// Reads a column as optional floats; missing and non-numeric cells become `None`.
pub fn column_f64(df: &DataFrame, name: &str) -> Option<Vec<Option<f64>>> {
    let column = df.column(name).ok()?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        values.push(any_to_f64(column.get(idx).unwrap_or(AnyValue::Null)));
    }
    Some(values)
}

/// Owned column names in frame order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("grade".into(), [Some("B"), None, Some(" ")]),
            Column::new("dti".into(), [Some(15.0), Some(f64::NAN), None]),
        ])
        .unwrap()
    }

    #[test]
    fn reads_strings_with_missing() {
        let df = frame();
        let values = column_strings(&df, "grade").unwrap();
        assert_eq!(values, vec![Some("B".to_string()), None, None]);
        assert!(column_strings(&df, "missing").is_none());
    }

    #[test]
    fn reads_floats_with_missing() {
        let df = frame();
        let values = column_f64(&df, "dti").unwrap();
        assert_eq!(values, vec![Some(15.0), None, None]);
    }

    #[test]
    fn detects_numeric_columns() {
        let df = frame();
        assert!(is_numeric_column(df.column("dti").unwrap()));
        assert!(!is_numeric_column(df.column("grade").unwrap()));
        assert!(has_column(&df, "grade"));
        assert_eq!(column_names(&df), vec!["grade", "dti"]);
    }
}
