//! Library components of the `credit-risk` command-line tool.

pub mod config;
pub mod logging;
