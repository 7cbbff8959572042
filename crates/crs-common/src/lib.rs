//! Shared utilities for credit risk scoring crates.
//!
//! This crate provides common utilities used across the workspace,
//! including Polars value conversion and column extraction helpers.

pub mod frame;
pub mod polars;

// Re-export commonly used functions at crate root for convenience
pub use crate::frame::{column_f64, column_names, column_strings, has_column, is_numeric_column};
pub use crate::polars::{
    any_to_f64, any_to_string, any_to_string_non_empty, format_numeric, parse_f64,
};
