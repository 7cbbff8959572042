//! Dense feature matrix handed to the scoring model.

use polars::prelude::{AnyValue, DataFrame};

use crs_common::{any_to_f64, column_names, is_numeric_column};

use crate::error::{Result, ScoreError};

/// Row-major `f64` matrix with named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    names: Vec<String>,
    rows: usize,
    values: Vec<f64>,
}

impl FeatureMatrix {
    /// Builds a matrix from row vectors; every row must have one value per name.
    pub fn from_rows(names: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        let width = names.len();
        let mut values = Vec::with_capacity(width * rows.len());
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(ScoreError::InvalidModel {
                    message: format!("row {idx} has {} values for {width} features", row.len()),
                });
            }
            values.extend_from_slice(row);
        }
        Ok(Self {
            names,
            rows: rows.len(),
            values,
        })
    }

    /// Builds a matrix from an aligned frame. Every column must be numeric
    /// and complete.
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        let names = column_names(df);
        let rows = df.height();
        let mut values = vec![0.0; rows * names.len()];
        for (col_idx, column) in df.get_columns().iter().enumerate() {
            if !is_numeric_column(column) {
                return Err(ScoreError::NonNumericFeature {
                    column: column.name().to_string(),
                });
            }
            for row in 0..rows {
                let cell = any_to_f64(column.get(row).unwrap_or(AnyValue::Null)).ok_or_else(|| {
                    ScoreError::MissingValue {
                        column: column.name().to_string(),
                        row,
                    }
                })?;
                values[row * names.len() + col_idx] = cell;
            }
        }
        Ok(Self {
            names,
            rows,
            values,
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn width(&self) -> usize {
        self.names.len()
    }

    pub fn row(&self, idx: usize) -> &[f64] {
        let width = self.width();
        &self.values[idx * width..(idx + 1) * width]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.rows).map(|idx| self.row(idx))
    }
}
