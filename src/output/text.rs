//! Human-readable listings for the terminal.

use std::io::{self, Write};

use crate::duplicates::{format_size, DuplicateGroup, ScanSummary};
use crate::trash::TrashEntry;

/// Print each group with its original marked, then a one-line summary.
///
/// # Errors
///
/// Returns any I/O error from `writer`.
pub fn write_groups<W: Write>(
    groups: &[DuplicateGroup],
    summary: &ScanSummary,
    mut writer: W,
) -> io::Result<()> {
    for (idx, group) in groups.iter().enumerate() {
        writeln!(
            writer,
            "Group {} ({} files, {} each)",
            idx + 1,
            group.len(),
            group.size_display()
        )?;
        for (pos, path) in group.files.iter().enumerate() {
            let marker = if pos == 0 { "keep" } else { "copy" };
            writeln!(writer, "  [{marker}] {}", path.display())?;
        }
        writeln!(writer)?;
    }

    writeln!(
        writer,
        "{} duplicate group(s), {} duplicate file(s), {} reclaimable ({} files scanned in {:.2?})",
        summary.duplicate_groups,
        summary.duplicate_files,
        format_size(summary.reclaimable_bytes),
        summary.total_files,
        summary.duration
    )?;
    if summary.had_errors() {
        writeln!(
            writer,
            "{} file(s) could not be read, {} could not be hashed",
            summary.walk_errors, summary.failed
        )?;
    }
    Ok(())
}

/// Print trash entries as aligned columns.
///
/// # Errors
///
/// Returns any I/O error from `writer`.
pub fn write_entries<W: Write>(entries: &[TrashEntry], mut writer: W) -> io::Result<()> {
    if entries.is_empty() {
        return writeln!(writer, "Trash is empty");
    }

    let name_width = entries
        .iter()
        .map(|e| e.trash_filename.chars().count())
        .max()
        .unwrap_or(0);

    for entry in entries {
        writeln!(
            writer,
            "{:<name_width$}  {:>10}  {}  {}",
            entry.trash_filename,
            entry.size,
            entry.deletion_date,
            entry.original_path.display()
        )?;
    }
    let total: u64 = entries.iter().map(|e| e.size_bytes).sum();
    writeln!(writer, "{} item(s), {}", entries.len(), format_size(total))
}
