//! Missing-value indicator columns.

use polars::prelude::{Column, DataFrame};

use crs_common::{column_names, column_strings};

use crate::error::Result;

/// Columns with this prefix get a `{name}_missing` companion.
pub const MONTHS_SINCE_PREFIX: &str = "mths_since";
pub const MISSING_SUFFIX: &str = "_missing";

/// Name of the indicator column for `column`.
pub fn indicator_name(column: &str) -> String {
    format!("{column}{MISSING_SUFFIX}")
}

/// Adds a 0/1 indicator for every `mths_since*` column present.
///
/// Must run before imputation, otherwise every indicator would be 0.
/// Returns the names of the indicator columns added.
pub fn add_missing_indicators(df: &mut DataFrame) -> Result<Vec<String>> {
    let sources: Vec<String> = column_names(df)
        .into_iter()
        .filter(|name| name.starts_with(MONTHS_SINCE_PREFIX))
        .collect();

    let mut added = Vec::with_capacity(sources.len());
    for source in sources {
        let Some(values) = column_strings(df, &source) else {
            continue;
        };
        let flags: Vec<i32> = values.iter().map(|value| i32::from(value.is_none())).collect();
        let name = indicator_name(&source);
        df.with_column(Column::new(name.as_str().into(), flags))?;
        added.push(name);
    }
    Ok(added)
}
