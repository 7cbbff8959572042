//! Ordinal re-encoding and term binarization.

use polars::prelude::{Column, DataFrame};

use crs_common::column_strings;
use crs_model::{EmpLength, Grade, LoanTerm, MatchingMode, ModelError, SubGrade, TermParsing};

use crate::error::{Result, TransformError};

pub const GRADE: &str = "grade";
pub const SUB_GRADE: &str = "sub_grade";
pub const EMP_LENGTH: &str = "emp_length";
pub const TERM: &str = "term";

fn category_error(column: &str, row: usize, err: ModelError) -> TransformError {
    let value = match err {
        ModelError::UnknownCategory { value, .. } => value,
        other => other.to_string(),
    };
    TransformError::UnknownCategory {
        column: column.to_string(),
        row,
        value,
    }
}

/// Rewrites a text column as codes; missing cells go through `on_missing`.
fn encode_column<F>(
    df: &mut DataFrame,
    column: &str,
    on_missing: Option<i32>,
    lookup: F,
) -> Result<Option<usize>>
where
    F: Fn(&str) -> std::result::Result<i32, ModelError>,
{
    let Some(values) = column_strings(df, column) else {
        return Ok(None);
    };
    let codes: Vec<Option<f64>> = values
        .iter()
        .enumerate()
        .map(|(row, value)| match value {
            Some(text) => lookup(text)
                .map(|code| Some(f64::from(code)))
                .map_err(|err| category_error(column, row, err)),
            None => Ok(on_missing.map(f64::from)),
        })
        .collect::<Result<_>>()?;
    let encoded = codes.iter().filter(|code| code.is_some()).count();
    df.with_column(Column::new(column.into(), codes))?;
    Ok(Some(encoded))
}

/// `A`..`G` to 1..7. Missing grades stay missing.
pub fn encode_grade(df: &mut DataFrame, mode: MatchingMode) -> Result<Option<usize>> {
    encode_column(df, GRADE, None, |value| {
        Grade::parse(value, mode).map(|grade| grade.code())
    })
}

/// `A1`..`G5` to 1..35. Missing sub-grades stay missing.
pub fn encode_sub_grade(df: &mut DataFrame, mode: MatchingMode) -> Result<Option<usize>> {
    encode_column(df, SUB_GRADE, None, |value| {
        SubGrade::parse(value, mode).map(|sub_grade| sub_grade.code())
    })
}

/// `< 1 year`..`10+ years` to 0..10; missing values count as `Unknown` (-1).
pub fn encode_emp_length(df: &mut DataFrame, mode: MatchingMode) -> Result<Option<usize>> {
    encode_column(df, EMP_LENGTH, Some(EmpLength::Unknown.code()), |value| {
        EmpLength::parse(value, mode).map(|length| length.code())
    })
}

/// 60 month loans to 1, 36 month loans to 0.
///
/// In substring mode a missing term is encoded as 0, like any other text
/// without "60" in it. In strict mode it stays missing.
pub fn binarize_term(df: &mut DataFrame, parsing: TermParsing) -> Result<Option<usize>> {
    match parsing {
        TermParsing::Substring => {
            let missing = Some(LoanTerm::ThirtySixMonths.code());
            encode_column(df, TERM, missing, |value| {
                Ok(LoanTerm::from_text_lossy(value).code())
            })
        }
        TermParsing::Strict => encode_column(df, TERM, None, |value| {
            LoanTerm::parse_strict(value).map(|term| term.code())
        }),
    }
}
