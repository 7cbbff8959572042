//! Risk report output.

use std::io::Write;
use std::path::{Path, PathBuf};

use polars::prelude::{AnyValue, DataFrame};

use crs_common::{any_to_string, column_names, has_column};

use crate::error::{Result, ScoreError};
use crate::score::{DECISION, PROB_DEFAULT};

/// File name of the report written next to the batch input.
pub const DEFAULT_REPORT_NAME: &str = "reporte_riesgo_crediticio.csv";

/// Columns shown in the batch summary, when present.
pub const SUMMARY_COLUMNS: [&str; 6] = [
    "loan_amnt",
    "term",
    "grade",
    "annual_inc",
    PROB_DEFAULT,
    DECISION,
];

/// Report path used when none is given.
pub fn default_report_path(input: &Path) -> PathBuf {
    input.with_file_name(DEFAULT_REPORT_NAME)
}

/// Summary columns present in `df`, in summary order.
pub fn summary_columns(df: &DataFrame) -> Vec<&'static str> {
    SUMMARY_COLUMNS
        .into_iter()
        .filter(|column| has_column(df, column))
        .collect()
}

/// Writes every column of `df` as CSV. Missing cells are written empty.
pub fn write_report_to<W: Write>(df: &DataFrame, writer: W) -> std::result::Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(column_names(df))?;
    let columns = df.get_columns();
    for row in 0..df.height() {
        let record: Vec<String> = columns
            .iter()
            .map(|column| any_to_string(column.get(row).unwrap_or(AnyValue::Null)))
            .collect();
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes the full report to `path`.
pub fn write_report(df: &DataFrame, path: &Path) -> Result<()> {
    let report_error = |message: String| ScoreError::ReportWrite {
        path: path.to_path_buf(),
        message,
    };
    let file = std::fs::File::create(path).map_err(|err| report_error(err.to_string()))?;
    write_report_to(df, file).map_err(|err| report_error(err.to_string()))?;
    tracing::info!(path = %path.display(), rows = df.height(), "wrote risk report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::Column;

    #[test]
    fn writes_all_columns() {
        let df = DataFrame::new(vec![
            Column::new("grade".into(), [Some("B"), None]),
            Column::new(PROB_DEFAULT.into(), [0.25, 0.75]),
            Column::new(DECISION.into(), ["Approved", "Rejected"]),
        ])
        .unwrap();
        let mut buffer = Vec::new();
        write_report_to(&df, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        insta::assert_snapshot!(text, @r"
        grade,Prob_Default,Decision
        B,0.25,Approved
        ,0.75,Rejected
        ");
    }

    #[test]
    fn summary_keeps_present_columns_in_order() {
        let df = DataFrame::new(vec![
            Column::new(DECISION.into(), ["Approved"]),
            Column::new("grade".into(), ["B"]),
            Column::new("id".into(), [1]),
        ])
        .unwrap();
        assert_eq!(summary_columns(&df), ["grade", DECISION]);
    }

    #[test]
    fn default_path_sits_next_to_input() {
        assert_eq!(
            default_report_path(Path::new("/data/loans.csv")),
            PathBuf::from("/data/reporte_riesgo_crediticio.csv")
        );
    }
}
