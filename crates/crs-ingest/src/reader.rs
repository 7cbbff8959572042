//! Delimited batch file loading.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use polars::prelude::{Column, DataFrame};
use tracing::{debug, info, info_span};

use crs_common::parse_f64;

use crate::error::{IngestError, Result};

/// Maximum file size for batch loading (500 MB).
pub const MAX_CSV_FILE_SIZE: u64 = 500 * 1024 * 1024;

/// Cell values treated as missing.
pub const NULL_TOKENS: [&str; 10] = [
    "", "NA", "N/A", "NaN", "nan", "NULL", "null", "None", "<NA>", "#N/A",
];

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Options for reading a delimited batch file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub max_file_size: u64,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            max_file_size: MAX_CSV_FILE_SIZE,
        }
    }
}

impl CsvOptions {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }
}

fn io_error(path: &Path, err: std::io::Error) -> IngestError {
    if err.kind() == std::io::ErrorKind::NotFound {
        IngestError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else {
        IngestError::FileRead {
            path: path.to_path_buf(),
            source: err,
        }
    }
}

/// Check file size against a limit before loading.
pub fn check_file_size(path: &Path, max_size: u64) -> Result<()> {
    let metadata = std::fs::metadata(path).map_err(|e| io_error(path, e))?;
    if metadata.len() > max_size {
        return Err(IngestError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size,
        });
    }
    Ok(())
}

/// Rejects UTF-16 byte order marks and strips a UTF-8 one.
fn strip_bom<'a>(bytes: &'a [u8], path: &Path) -> Result<&'a [u8]> {
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return Err(IngestError::UnsupportedEncoding {
            path: path.to_path_buf(),
            encoding: "UTF-16 LE",
        });
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return Err(IngestError::UnsupportedEncoding {
            path: path.to_path_buf(),
            encoding: "UTF-16 BE",
        });
    }
    Ok(bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes))
}

/// Returns true if the cell is one of the [`NULL_TOKENS`].
pub fn is_null_token(cell: &str) -> bool {
    NULL_TOKENS.contains(&cell.trim())
}

/// Builds a column from raw cells.
///
/// A column whose non-missing cells all parse as finite numbers becomes a
/// float column, anything else stays text. A column with no values at all
/// is a float column of nulls.
pub fn infer_column(name: &str, cells: Vec<Option<String>>) -> Column {
    let numeric: Option<Vec<Option<f64>>> = cells
        .iter()
        .map(|cell| match cell {
            None => Some(None),
            Some(text) => parse_f64(text).map(Some),
        })
        .collect();
    match numeric {
        Some(values) => Column::new(name.into(), values),
        None => Column::new(name.into(), cells),
    }
}

/// Reads a delimited batch file into a DataFrame.
pub fn read_csv(path: &Path, options: &CsvOptions) -> Result<DataFrame> {
    let span = info_span!("ingest", path = %path.display());
    let _guard = span.enter();

    check_file_size(path, options.max_file_size)?;
    let mut bytes = Vec::new();
    File::open(path)
        .and_then(|mut file| file.read_to_end(&mut bytes))
        .map_err(|e| io_error(path, e))?;
    let df = parse_csv_bytes(&bytes, path, options)?;
    info!(rows = df.height(), columns = df.width(), "loaded batch file");
    Ok(df)
}

/// Parses delimited bytes; `path` is only used for error messages.
pub fn parse_csv_bytes(bytes: &[u8], path: &Path, options: &CsvOptions) -> Result<DataFrame> {
    let bytes = strip_bom(bytes, path)?;
    let parse_error = |err: csv::Error| IngestError::CsvParse {
        path: path.to_path_buf(),
        message: err.to_string(),
    };

    let mut reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(parse_error)?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.is_empty() || (headers.len() == 1 && headers[0].is_empty()) {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }
    let mut seen = HashSet::with_capacity(headers.len());
    for (index, header) in headers.iter().enumerate() {
        if header.is_empty() {
            return Err(IngestError::EmptyColumnName {
                path: path.to_path_buf(),
                index,
            });
        }
        if !seen.insert(header.as_str()) {
            return Err(IngestError::DuplicateColumn {
                path: path.to_path_buf(),
                column: header.clone(),
            });
        }
    }

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record.map_err(parse_error)?;
        for (idx, values) in cells.iter_mut().enumerate() {
            let cell = record.get(idx).unwrap_or("");
            values.push((!is_null_token(cell)).then(|| cell.to_string()));
        }
    }
    if cells.first().is_none_or(Vec::is_empty) {
        return Err(IngestError::NoDataRows {
            path: path.to_path_buf(),
        });
    }
    debug!(rows = cells[0].len(), "parsed delimited rows");

    let columns: Vec<Column> = headers
        .iter()
        .zip(cells)
        .map(|(name, values)| infer_column(name, values))
        .collect();
    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::DataType;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn test_read_csv_infers_types() {
        let file = create_temp_csv(b"loan_amnt,grade,dti\n10000,B,15.5\n5000, C ,NA\n");
        let df = read_csv(file.path(), &CsvOptions::default()).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("loan_amnt").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("grade").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("dti").unwrap().null_count(), 1);
    }

    #[test]
    fn test_read_csv_with_bom_and_delimiter() {
        let file = create_temp_csv("\u{feff}grade;term\nA; 36 months\n".as_bytes());
        let options = CsvOptions::default().with_delimiter(b';');
        let df = read_csv(file.path(), &options).unwrap();
        assert_eq!(df.get_column_names(), ["grade", "term"]);
    }

    #[test]
    fn test_rejects_utf16() {
        let file = create_temp_csv(&[0xFF, 0xFE, b'a', 0]);
        let err = read_csv(file.path(), &CsvOptions::default()).unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedEncoding { encoding: "UTF-16 LE", .. }));
    }

    #[test]
    fn test_rejects_empty_and_headerless_files() {
        let empty = create_temp_csv(b"");
        assert!(matches!(
            read_csv(empty.path(), &CsvOptions::default()),
            Err(IngestError::EmptyCsv { .. })
        ));
        let header_only = create_temp_csv(b"a,b\n");
        assert!(matches!(
            read_csv(header_only.path(), &CsvOptions::default()),
            Err(IngestError::NoDataRows { .. })
        ));
        let blank = create_temp_csv(b"a,,c\n1,2,3\n");
        assert!(matches!(
            read_csv(blank.path(), &CsvOptions::default()),
            Err(IngestError::EmptyColumnName { index: 1, .. })
        ));
    }

    #[test]
    fn test_file_size_limit() {
        let file = create_temp_csv(b"a\n1\n");
        let options = CsvOptions::default().with_max_file_size(2);
        assert!(matches!(
            read_csv(file.path(), &options),
            Err(IngestError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = read_csv(Path::new("/nonexistent/loans.csv"), &CsvOptions::default());
        assert!(matches!(err, Err(IngestError::FileNotFound { .. })));
    }
}
