//! JSON output for scan results and trash listings.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "duplicates": [
//!     { "hash": "af13...", "size": 1024, "size_display": "1.0 KB",
//!       "files": ["/photos/a.jpg", "/photos/b.jpg"] }
//!   ],
//!   "summary": {
//!     "total_files": 3, "candidates": 3, "hashed": 3, "failed": 0,
//!     "walk_errors": 0, "duplicate_groups": 1, "duplicate_files": 1,
//!     "reclaimable_bytes": 1024, "scan_duration_ms": 4,
//!     "exit_code": 0, "exit_code_name": "DA000"
//!   }
//! }
//! ```
//!
//! Trash listings are written as the same array of objects the journal
//! stores, so they can be piped back into other tools unchanged.

use std::io::Write;

use serde::Serialize;

use crate::duplicates::{DuplicateGroup, ScanSummary};
use crate::error::ExitCode;
use crate::trash::TrashEntry;

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// BLAKE3 hash as hexadecimal string (64 characters)
    pub hash: String,
    /// File size in bytes
    pub size: u64,
    /// Human-readable size
    pub size_display: String,
    /// Paths in walk order; the first is the one kept
    pub files: Vec<String>,
}

impl From<&DuplicateGroup> for JsonDuplicateGroup {
    fn from(group: &DuplicateGroup) -> Self {
        Self {
            hash: group.hash_hex(),
            size: group.size,
            size_display: group.size_display(),
            files: group
                .files
                .iter()
                .map(|f| f.to_string_lossy().into_owned())
                .collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Files that passed the candidate filter
    pub total_files: usize,
    /// Files in size classes with 2+ members
    pub candidates: usize,
    /// Candidates hashed successfully
    pub hashed: usize,
    /// Candidates that could not be hashed
    pub failed: usize,
    /// Entries skipped during the walk
    pub walk_errors: usize,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Files beyond the first in each group
    pub duplicate_files: usize,
    /// Bytes freed by removing every copy
    pub reclaimable_bytes: u64,
    /// Scan wall time in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// Machine-readable exit code name, e.g. `DA000`
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Build from scan statistics and the exit code of this run.
    #[must_use]
    pub fn new(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            candidates: summary.candidates,
            hashed: summary.hashed,
            failed: summary.failed,
            walk_errors: summary.walk_errors,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            reclaimable_bytes: summary.reclaimable_bytes,
            scan_duration_ms: u64::try_from(summary.duration.as_millis()).unwrap_or(u64::MAX),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON document for a scan.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Duplicate groups in emission order
    pub duplicates: Vec<JsonDuplicateGroup>,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Create the document.
    ///
    /// ```
    /// use dupagent::duplicates::ScanSummary;
    /// use dupagent::error::ExitCode;
    /// use dupagent::output::JsonOutput;
    ///
    /// let output = JsonOutput::new(&[], &ScanSummary::default(), ExitCode::NoDuplicates);
    /// let mut buf = Vec::new();
    /// output.write_to(&mut buf).unwrap();
    /// assert!(String::from_utf8(buf).unwrap().contains("\"DA002\""));
    /// ```
    #[must_use]
    pub fn new(groups: &[DuplicateGroup], summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            duplicates: groups.iter().map(JsonDuplicateGroup::from).collect(),
            summary: JsonSummary::new(summary, exit_code),
        }
    }

    /// Write pretty JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns [`JsonOutputError`] on serialization or I/O failure.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), JsonOutputError> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        Ok(())
    }
}

/// Write trash entries as a pretty JSON array.
///
/// # Errors
///
/// Returns [`JsonOutputError`] on serialization or I/O failure.
pub fn write_entries<W: Write>(entries: &[TrashEntry], mut writer: W) -> Result<(), JsonOutputError> {
    serde_json::to_writer_pretty(&mut writer, entries)?;
    writeln!(writer)?;
    Ok(())
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON output: {0}")]
    Io(#[from] std::io::Error),
}
