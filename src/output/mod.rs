//! Output formatters for scan results and trash listings.
//!
//! - [`text`] for people at a terminal
//! - [`json`] for automation and scripting
//! - [`csv`] for spreadsheet import

pub mod csv;
pub mod json;
pub mod text;

pub use self::csv::{CsvOutput, CsvOutputError};
pub use self::json::{JsonOutput, JsonOutputError};
