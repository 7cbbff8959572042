//! Error types for applicant data ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading raw applicant data.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Input file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exceeds the maximum size accepted for in-memory loading.
    #[error("file {path} is {size} bytes, larger than the {max_size} byte limit")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// File is not UTF-8.
    #[error("unsupported encoding {encoding} in {path}; save the file as UTF-8")]
    UnsupportedEncoding {
        path: PathBuf,
        encoding: &'static str,
    },

    // === CSV Parsing Errors ===
    /// Failed to parse delimited data.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// File has no header row.
    #[error("CSV file is empty: {path}")]
    EmptyCsv { path: PathBuf },

    /// Header row present but no data rows follow it.
    #[error("CSV file has no data rows: {path}")]
    NoDataRows { path: PathBuf },

    /// A header cell is blank.
    #[error("column {index} has a blank name in {path}")]
    EmptyColumnName { path: PathBuf, index: usize },

    /// Two header cells share a name.
    #[error("duplicate column '{column}' in {path}")]
    DuplicateColumn { path: PathBuf, column: String },

    // === Record Errors ===
    /// A JSON applicant record is malformed.
    #[error("invalid applicant record: {message}")]
    InvalidRecord { message: String },

    /// A manual form field is out of range.
    #[error("invalid value for {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for IngestError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidRecord {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
