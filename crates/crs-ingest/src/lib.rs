//! Raw applicant data ingestion.
//!
//! Batch files are read with the `csv` crate and typed column by column;
//! single applicants come from the manual form or a JSON object. Both end up
//! as a Polars `DataFrame` of raw attributes ready for the feature pipeline.

pub mod error;
pub mod form;
pub mod reader;
pub mod record;

pub use error::{IngestError, Result};
pub use form::{ApplicantForm, FICO_MAX, FICO_MIN};
pub use reader::{
    CsvOptions, MAX_CSV_FILE_SIZE, NULL_TOKENS, check_file_size, infer_column, is_null_token,
    parse_csv_bytes, read_csv,
};
pub use record::{ApplicantRecord, RawValue};
