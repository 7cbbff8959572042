//! Calendar date parsing and the credit-age derivation.
//!
//! Accepted formats, tried in order:
//!
//! | Format                | Example               |
//! |-----------------------|-----------------------|
//! | `YYYY-MM-DD`          | `2020-01-15`          |
//! | `YYYY-MM-DD hh:mm:ss` | `2020-01-15 08:30:00` |
//! | `YYYY-MM-DDThh:mm:ss` | `2020-01-15T08:30:00` |
//! | `YYYY/MM/DD`          | `2020/01/15`          |
//! | `MM/DD/YYYY`          | `01/15/2020`          |
//! | `Mon-YYYY`            | `Dec-2015`            |
//! | `YYYY-MM`             | `2015-12`             |
//!
//! Month-only formats resolve to the first day of the month, and date-only
//! formats to midnight. Time of day is kept for the credit-age difference.
//!
//! Polars `Date` and `Datetime` columns are read as they are; time zones are
//! ignored and the stored UTC instant is used.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use polars::prelude::{AnyValue, Column, DataFrame, DataType, TimeUnit};

use crs_common::{any_to_string_non_empty, has_column};

use crate::error::{Result, TransformError};

/// Issue date of the loan.
pub const ISSUE_DATE: &str = "issue_d";
/// Date the applicant's earliest credit line was opened.
pub const EARLIEST_CREDIT_LINE: &str = "earliest_cr_line";
/// Derived column: years between the batch reference date and the earliest credit line.
pub const CREDIT_AGE: &str = "credit_age";

const DAYS_PER_YEAR: f64 = 365.0;
const SECONDS_PER_DAY: i64 = 86_400;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parses a timestamp in one of the accepted formats.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
    {
        return Some(date.and_time(NaiveTime::MIN));
    }
    if let Some(datetime) = DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
    {
        return Some(datetime);
    }
    // Month precision: pin to the first of the month.
    NaiveDate::parse_from_str(&format!("01-{value}"), "%d-%b-%Y")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d"))
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// Reads a typed temporal cell. `None` means the cell is not temporal.
fn temporal_value(value: &AnyValue<'_>) -> Option<NaiveDateTime> {
    let (value, unit) = match value {
        AnyValue::Date(days) => {
            return DateTime::from_timestamp(i64::from(*days) * SECONDS_PER_DAY, 0)
                .map(|datetime| datetime.naive_utc());
        }
        AnyValue::Datetime(value, unit, _) => (*value, *unit),
        AnyValue::DatetimeOwned(value, unit, _) => (*value, *unit),
        _ => return None,
    };
    let datetime = match unit {
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(value),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(value),
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(value)),
    };
    datetime.map(|datetime| datetime.naive_utc())
}

fn parse_date_column(df: &DataFrame, column: &str) -> Result<Vec<Option<NaiveDateTime>>> {
    let series = df.column(column)?;
    let typed = matches!(series.dtype(), DataType::Date | DataType::Datetime(_, _));
    (0..df.height())
        .map(|row| {
            let value = series.get(row)?;
            if matches!(value, AnyValue::Null) {
                return Ok(None);
            }
            if typed {
                return temporal_value(&value).map(Some).ok_or_else(|| {
                    TransformError::DateParse {
                        column: column.to_string(),
                        row,
                        value: value.to_string(),
                    }
                });
            }
            let Some(text) = any_to_string_non_empty(value) else {
                return Ok(None);
            };
            parse_datetime(&text).map(Some).ok_or(TransformError::DateParse {
                column: column.to_string(),
                row,
                value: text,
            })
        })
        .collect()
}

/// Years from `earliest` to `reference`, on a 365-day year.
///
/// Whole days are counted with partial days floored, so twelve hours count
/// as 0 days and minus twelve hours as -1 day.
pub fn years_between(reference: NaiveDateTime, earliest: NaiveDateTime) -> f64 {
    let days = (reference - earliest).num_seconds().div_euclid(SECONDS_PER_DAY);
    days as f64 / DAYS_PER_YEAR
}

/// Adds `credit_age` when both date columns are present.
///
/// The reference date is the latest issue date of the whole batch, so the
/// same applicant can get a different age in a different batch. Returns the
/// number of rows with a computed age.
pub fn derive_credit_age(df: &mut DataFrame) -> Result<Option<usize>> {
    if !has_column(df, ISSUE_DATE) || !has_column(df, EARLIEST_CREDIT_LINE) {
        return Ok(None);
    }

    let issued = parse_date_column(df, ISSUE_DATE)?;
    let earliest = parse_date_column(df, EARLIEST_CREDIT_LINE)?;
    let reference = issued.iter().flatten().max().copied();

    let ages: Vec<Option<f64>> = earliest
        .iter()
        .map(|opened| Some(years_between(reference?, (*opened)?)))
        .collect();
    let computed = ages.iter().filter(|age| age.is_some()).count();

    df.with_column(Column::new(CREDIT_AGE.into(), ages))?;
    Ok(Some(computed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crs_common::column_f64;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn parse_day(value: &str) -> Option<NaiveDate> {
        parse_datetime(value).map(|datetime| datetime.date())
    }

    #[test]
    fn parses_supported_formats() {
        assert_eq!(parse_day("2020-01-15"), Some(ymd(2020, 1, 15)));
        assert_eq!(parse_day("2020-01-15 08:30:00"), Some(ymd(2020, 1, 15)));
        assert_eq!(parse_day("2020-01-15T08:30:00"), Some(ymd(2020, 1, 15)));
        assert_eq!(parse_day("2020/01/15"), Some(ymd(2020, 1, 15)));
        assert_eq!(parse_day("01/15/2020"), Some(ymd(2020, 1, 15)));
        assert_eq!(parse_day("Dec-2015"), Some(ymd(2015, 12, 1)));
        assert_eq!(parse_day("2015-12"), Some(ymd(2015, 12, 1)));
        assert_eq!(parse_day(" 2020-01-15 "), Some(ymd(2020, 1, 15)));
        assert_eq!(
            parse_datetime("2020-01-15T08:30:00").map(|datetime| datetime.time()),
            NaiveTime::from_hms_opt(8, 30, 0)
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_day(""), None);
        assert_eq!(parse_day("yesterday"), None);
        assert_eq!(parse_day("2020-13-01"), None);
    }

    #[test]
    fn credit_age_uses_batch_maximum() {
        let mut df = DataFrame::new(vec![
            Column::new(ISSUE_DATE.into(), [Some("2019-01-01"), Some("2020-01-01"), None]),
            Column::new(
                EARLIEST_CREDIT_LINE.into(),
                [Some("2010-01-01"), None, Some("Jan-2019")],
            ),
        ])
        .unwrap();

        assert_eq!(derive_credit_age(&mut df).unwrap(), Some(2));
        let ages = column_f64(&df, CREDIT_AGE).unwrap();
        assert_eq!(ages[0], Some(3652.0 / 365.0));
        assert_eq!(ages[1], None);
        assert_eq!(ages[2], Some(365.0 / 365.0));
    }

    #[test]
    fn credit_age_floors_partial_days() {
        let mut df = DataFrame::new(vec![
            Column::new(
                ISSUE_DATE.into(),
                ["2020-01-01 06:00:00", "2019-06-01"],
            ),
            Column::new(
                EARLIEST_CREDIT_LINE.into(),
                ["2019-12-31 18:00:00", "2020-01-01T18:00:00"],
            ),
        ])
        .unwrap();

        derive_credit_age(&mut df).unwrap();
        let ages = column_f64(&df, CREDIT_AGE).unwrap();
        assert_eq!(ages, vec![Some(0.0), Some(-1.0 / 365.0)]);
    }

    #[test]
    fn credit_age_reads_typed_date_columns() {
        let mut df = DataFrame::new(vec![
            Column::new(ISSUE_DATE.into(), [ymd(2019, 1, 1), ymd(2020, 1, 1)]),
            Column::new(
                EARLIEST_CREDIT_LINE.into(),
                [
                    ymd(2010, 1, 1).and_hms_opt(0, 0, 0).unwrap(),
                    ymd(2019, 12, 31).and_hms_opt(18, 0, 0).unwrap(),
                ],
            ),
        ])
        .unwrap();
        assert_eq!(df.column(ISSUE_DATE).unwrap().dtype(), &DataType::Date);

        assert_eq!(derive_credit_age(&mut df).unwrap(), Some(2));
        let ages = column_f64(&df, CREDIT_AGE).unwrap();
        assert_eq!(ages, vec![Some(3652.0 / 365.0), Some(0.0)]);
    }

    #[test]
    fn non_date_values_are_parse_errors() {
        let mut df = DataFrame::new(vec![
            Column::new(ISSUE_DATE.into(), ["2020-01-01"]),
            Column::new(EARLIEST_CREDIT_LINE.into(), [20100101_i64]),
        ])
        .unwrap();
        let err = derive_credit_age(&mut df).unwrap_err();
        assert!(matches!(err, TransformError::DateParse { row: 0, .. }));
    }

    #[test]
    fn credit_age_needs_both_columns() {
        let mut df =
            DataFrame::new(vec![Column::new(ISSUE_DATE.into(), ["2020-01-01"])]).unwrap();
        assert_eq!(derive_credit_age(&mut df).unwrap(), None);
        assert!(!has_column(&df, CREDIT_AGE));
    }

    #[test]
    fn unparseable_dates_name_column_and_row() {
        let mut df = DataFrame::new(vec![
            Column::new(ISSUE_DATE.into(), ["2020-01-01", "2020-02-01"]),
            Column::new(EARLIEST_CREDIT_LINE.into(), ["2010-01-01", "someday"]),
        ])
        .unwrap();
        let err = derive_credit_age(&mut df).unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot parse earliest_cr_line date 'someday' at row 1"
        );
    }
}
