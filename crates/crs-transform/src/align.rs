//! Final alignment to the model's feature set.

use polars::prelude::{Column, DataFrame};
use tracing::{debug, warn};

use crs_common::{column_f64, column_names, column_strings, has_column, is_numeric_column, parse_f64};
use crs_model::{FeatureSet, MissingFeaturePolicy};

use crate::error::{Result, TransformError};
use crate::report::{AlignmentAudit, ZeroFill};

fn numeric_values(df: &DataFrame, column: &str) -> Result<Vec<Option<f64>>> {
    let numeric = df.column(column).map(is_numeric_column).unwrap_or(false);
    if numeric {
        return Ok(column_f64(df, column).unwrap_or_default());
    }
    column_strings(df, column)
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            None => Ok(None),
            Some(text) => parse_f64(&text).map(Some).ok_or(TransformError::NonNumeric {
                column: column.to_string(),
                row,
                value: text,
            }),
        })
        .collect()
}

/// Reindexes `df` to exactly the feature list, as `f64` with no missing values.
///
/// Absent features and missing cells become 0, extra columns are dropped.
/// `height` is the row count of the raw input, which the working frame may
/// have lost if every one of its columns was consumed.
pub fn align_features(
    df: &DataFrame,
    features: &FeatureSet,
    height: usize,
    policy: MissingFeaturePolicy,
) -> Result<(DataFrame, AlignmentAudit)> {
    let absent: Vec<String> = features
        .iter()
        .filter(|name| !has_column(df, name))
        .map(str::to_string)
        .collect();
    if !absent.is_empty() {
        match policy {
            MissingFeaturePolicy::Reject => {
                return Err(TransformError::MissingFeatures { columns: absent });
            }
            MissingFeaturePolicy::Warn => {
                warn!(columns = ?absent, "model features absent from input, filling with 0");
            }
        }
    }

    let mut columns = Vec::with_capacity(features.len());
    let mut zero_filled = Vec::new();
    for name in features.iter() {
        if !has_column(df, name) {
            columns.push(Column::new(name.into(), vec![0.0_f64; height]));
            continue;
        }
        let values = numeric_values(df, name)?;
        let cells = values.iter().filter(|value| value.is_none()).count();
        if cells > 0 {
            zero_filled.push(ZeroFill {
                column: name.to_string(),
                cells,
            });
        }
        let filled: Vec<f64> = values.into_iter().map(|value| value.unwrap_or(0.0)).collect();
        columns.push(Column::new(name.into(), filled));
    }

    let dropped: Vec<String> = column_names(df)
        .into_iter()
        .filter(|name| !features.contains(name))
        .collect();
    debug!(
        dropped = dropped.len(),
        zero_filled = zero_filled.len(),
        "aligned to feature set"
    );

    let audit = AlignmentAudit {
        absent,
        dropped,
        zero_filled,
    };
    Ok((DataFrame::new(columns)?, audit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::DataType;

    fn features() -> FeatureSet {
        FeatureSet::new(["dti", "grade", "ME_pce"]).unwrap()
    }

    #[test]
    fn reindexes_and_fills() {
        let df = DataFrame::new(vec![
            Column::new("grade".into(), [Some(2.0), None]),
            Column::new("id".into(), ["x", "y"]),
            Column::new("dti".into(), [Some("15.5"), Some("3")]),
        ])
        .unwrap();

        let (out, audit) =
            align_features(&df, &features(), 2, MissingFeaturePolicy::Warn).unwrap();
        assert_eq!(column_names(&out), ["dti", "grade", "ME_pce"]);
        for column in out.get_columns() {
            assert_eq!(column.dtype(), &DataType::Float64);
            assert_eq!(column.null_count(), 0);
        }
        assert_eq!(column_f64(&out, "dti").unwrap(), vec![Some(15.5), Some(3.0)]);
        assert_eq!(column_f64(&out, "grade").unwrap(), vec![Some(2.0), Some(0.0)]);
        assert_eq!(audit.absent, ["ME_pce"]);
        assert_eq!(audit.dropped, ["id"]);
        assert_eq!(
            audit.zero_filled,
            [ZeroFill {
                column: "grade".into(),
                cells: 1
            }]
        );
    }

    #[test]
    fn reject_policy_lists_absent_features() {
        let df = DataFrame::new(vec![Column::new("dti".into(), [1.0])]).unwrap();
        let err = align_features(&df, &features(), 1, MissingFeaturePolicy::Reject).unwrap_err();
        assert_eq!(
            err.to_string(),
            "input is missing model features: grade, ME_pce"
        );
    }

    #[test]
    fn non_numeric_feature_is_an_error() {
        let df = DataFrame::new(vec![Column::new("dti".into(), ["high"])]).unwrap();
        let err = align_features(&df, &features(), 1, MissingFeaturePolicy::Warn).unwrap_err();
        assert!(matches!(err, TransformError::NonNumeric { row: 0, .. }));
    }

    #[test]
    fn empty_working_frame_keeps_row_count() {
        let df = DataFrame::empty();
        let (out, audit) =
            align_features(&df, &features(), 3, MissingFeaturePolicy::Warn).unwrap();
        assert_eq!(out.shape(), (3, 3));
        assert_eq!(audit.absent.len(), 3);
    }
}
