//! Categorical expansion of nominal columns.

use std::collections::BTreeSet;

use polars::prelude::{Column, DataFrame};

use crs_common::column_strings;

use crate::error::Result;

/// Nominal columns expanded into indicator columns, when present.
pub const NOMINAL_COLUMNS: [&str; 6] = [
    "home_ownership",
    "verification_status",
    "purpose",
    "pymnt_plan",
    "initial_list_status",
    "application_type",
];

/// Replaces each nominal column with k-1 indicator columns.
///
/// Categories are the distinct non-missing values in lexicographic order
/// and the first one is the dropped baseline. A missing value sets every
/// indicator of its row to 0. Indicator columns are appended after the
/// existing columns and named `{column}_{category}`. Returns the names of
/// the columns added.
pub fn one_hot_encode(df: &mut DataFrame, columns: &[&str]) -> Result<Vec<String>> {
    let mut indicators: Vec<Column> = Vec::new();
    for &column in columns {
        let Some(values) = column_strings(df, column) else {
            continue;
        };
        let categories: BTreeSet<&str> = values.iter().flatten().map(String::as_str).collect();
        for category in categories.iter().skip(1) {
            let flags: Vec<i32> = values
                .iter()
                .map(|value| i32::from(value.as_deref() == Some(*category)))
                .collect();
            indicators.push(Column::new(format!("{column}_{category}").into(), flags));
        }
        df.drop_in_place(column)?;
    }

    let added = indicators.iter().map(|col| col.name().to_string()).collect();
    for indicator in indicators {
        df.with_column(indicator)?;
    }
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crs_common::{column_f64, column_names};

    #[test]
    fn drops_first_sorted_category() {
        let mut df = DataFrame::new(vec![
            Column::new("home_ownership".into(), [Some("RENT"), Some("MORTGAGE"), None, Some("OWN")]),
            Column::new("dti".into(), [1.0, 2.0, 3.0, 4.0]),
        ])
        .unwrap();

        let added = one_hot_encode(&mut df, &NOMINAL_COLUMNS).unwrap();
        assert_eq!(added, ["home_ownership_OWN", "home_ownership_RENT"]);
        assert_eq!(
            column_names(&df),
            ["dti", "home_ownership_OWN", "home_ownership_RENT"]
        );
        assert_eq!(
            column_f64(&df, "home_ownership_RENT").unwrap(),
            vec![Some(1.0), Some(0.0), Some(0.0), Some(0.0)]
        );
        assert_eq!(
            column_f64(&df, "home_ownership_OWN").unwrap(),
            vec![Some(0.0), Some(0.0), Some(0.0), Some(1.0)]
        );
    }

    #[test]
    fn single_category_leaves_no_indicator() {
        let mut df = DataFrame::new(vec![
            Column::new("pymnt_plan".into(), ["n", "n"]),
            Column::new("dti".into(), [1.0, 2.0]),
        ])
        .unwrap();
        let added = one_hot_encode(&mut df, &NOMINAL_COLUMNS).unwrap();
        assert!(added.is_empty());
        assert_eq!(column_names(&df), ["dti"]);
    }
}
