//! CSV output for spreadsheets.
//!
//! Duplicate groups produce one row per file:
//! `group_id, hash, path, size, size_display, role` where `role` is
//! `original` for the first file of a group and `copy` otherwise.
//!
//! Trash listings produce one row per entry with the journal's fields.

use std::io;

use serde::Serialize;
use thiserror::Error;

use crate::duplicates::DuplicateGroup;
use crate::trash::TrashEntry;

/// Errors that can occur during CSV output generation.
#[derive(Debug, Error)]
pub enum CsvOutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Serialize)]
struct GroupRow<'a> {
    group_id: usize,
    hash: &'a str,
    path: String,
    size: u64,
    size_display: &'a str,
    role: &'static str,
}

#[derive(Debug, Serialize)]
struct EntryRow<'a> {
    trash_filename: &'a str,
    original_path: String,
    deletion_date: &'a str,
    size: &'a str,
    size_bytes: u64,
    trash_dir: String,
}

/// CSV formatter for duplicate groups.
pub struct CsvOutput<'a> {
    groups: &'a [DuplicateGroup],
}

impl<'a> CsvOutput<'a> {
    /// Create a new CSV output formatter.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup]) -> Self {
        Self { groups }
    }

    /// Write every group to `writer`.
    ///
    /// # Errors
    ///
    /// Returns [`CsvOutputError`] if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), CsvOutputError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        for (idx, group) in self.groups.iter().enumerate() {
            let hash = group.hash_hex();
            let size_display = group.size_display();

            for (pos, path) in group.files.iter().enumerate() {
                csv_writer.serialize(GroupRow {
                    group_id: idx + 1,
                    hash: &hash,
                    path: path.to_string_lossy().into_owned(),
                    size: group.size,
                    size_display: &size_display,
                    role: if pos == 0 { "original" } else { "copy" },
                })?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }
}

/// Write trash entries as CSV.
///
/// # Errors
///
/// Returns [`CsvOutputError`] if writing or serialization fails.
pub fn write_entries<W: io::Write>(entries: &[TrashEntry], writer: W) -> Result<(), CsvOutputError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for entry in entries {
        csv_writer.serialize(EntryRow {
            trash_filename: &entry.trash_filename,
            original_path: entry.original_path.to_string_lossy().into_owned(),
            deletion_date: &entry.deletion_date,
            size: &entry.size,
            size_bytes: entry.size_bytes,
            trash_dir: entry.trash_dir.to_string_lossy().into_owned(),
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}
