//! Per-mount trash journal.
//!
//! The journal is a JSON array of [`TrashEntry`] objects stored next to the
//! files it describes (`<mount>/.Trash-<App>/trashdata.json`). Its field
//! names and date format are a durable on-disk contract.
//!
//! Every mutation rewrites the whole file: serialize, write a temp file in the
//! same directory, `sync_all`, rename over the journal.
//!
//! # Example
//!
//! ```no_run
//! use dupagent::trash::Journal;
//! use std::path::Path;
//!
//! let journal = Journal::load(Path::new("/mnt/usb/.Trash-DuplicateAgent/trashdata.json"));
//! for entry in journal.entries() {
//!     println!("{} <- {}", entry.trash_filename, entry.original_path.display());
//! }
//! ```

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// File name of the journal inside a trash directory.
pub const JOURNAL_FILE_NAME: &str = "trashdata.json";

/// Format of [`TrashEntry::deletion_date`].
pub const DELETION_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One file currently held in a fake trash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrashEntry {
    /// Name of the file inside `trash_dir`
    pub trash_filename: String,
    /// Absolute path the file was moved from
    pub original_path: PathBuf,
    /// Local time of the move, `YYYY-MM-DD HH:MM:SS`
    pub deletion_date: String,
    /// Human-readable size, e.g. `1.0 KB`
    pub size: String,
    /// Size in bytes as reported by the caller
    pub size_bytes: u64,
    /// Trash directory holding the file
    #[serde(default)]
    pub trash_dir: PathBuf,
}

impl TrashEntry {
    /// Location of the trashed file on disk.
    #[must_use]
    pub fn trash_path(&self) -> PathBuf {
        self.trash_dir.join(&self.trash_filename)
    }

    /// Parsed deletion timestamp, if the stored string is well formed.
    #[must_use]
    pub fn deleted_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.deletion_date, DELETION_DATE_FORMAT).ok()
    }

    /// Whether this entry is the one identified by the pair.
    #[must_use]
    pub fn matches(&self, trash_filename: &str, original_path: &Path) -> bool {
        self.trash_filename == trash_filename && self.original_path == original_path
    }
}

/// Current local time in the journal's date format.
#[must_use]
pub fn now_timestamp() -> String {
    Local::now().format(DELETION_DATE_FORMAT).to_string()
}

/// Errors from reading or writing a journal file.
#[derive(thiserror::Error, Debug)]
pub enum JournalError {
    /// The journal file could not be read.
    #[error("Failed to read journal {path}: {source}")]
    Read {
        /// Journal path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The journal content is not a valid entry list.
    #[error("Corrupt journal {path}: {source}")]
    Parse {
        /// Journal path
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The journal could not be serialized.
    #[error("Failed to serialize journal: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The journal file could not be written.
    #[error("Failed to write journal {path}: {source}")]
    Write {
        /// Journal path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// In-memory copy of one journal file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Journal {
    path: PathBuf,
    entries: Vec<TrashEntry>,
}

impl Journal {
    /// Empty journal bound to `path`; nothing is written until [`save`](Self::save).
    #[must_use]
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Vec::new(),
        }
    }

    /// Read the journal strictly.
    ///
    /// Entries without `trash_dir` get the journal's own directory.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::Read`] or [`JournalError::Parse`].
    pub fn read(path: &Path) -> Result<Self, JournalError> {
        let content = fs::read_to_string(path).map_err(|source| JournalError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut entries: Vec<TrashEntry> =
            serde_json::from_str(&content).map_err(|source| JournalError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        if let Some(dir) = path.parent() {
            for entry in entries.iter_mut().filter(|e| e.trash_dir.as_os_str().is_empty()) {
                entry.trash_dir = dir.to_path_buf();
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Read the journal, treating a missing or corrupt file as empty.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(journal) => journal,
            Err(JournalError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                Self::empty(path)
            }
            Err(e) => {
                log::warn!("{}; treating as empty", e);
                Self::empty(path)
            }
        }
    }

    /// Create an empty journal file if none exists yet.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::Write`] if the file cannot be created.
    pub fn ensure_exists(path: &Path) -> Result<(), JournalError> {
        if path.exists() {
            return Ok(());
        }
        log::debug!("Creating empty journal {}", path.display());
        Self::empty(path).save()
    }

    /// Path of the journal file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[TrashEntry] {
        &self.entries
    }

    /// Consume the journal, returning its entries.
    #[must_use]
    pub fn into_entries(self) -> Vec<TrashEntry> {
        self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the journal has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry.
    pub fn push(&mut self, entry: TrashEntry) {
        self.entries.push(entry);
    }

    /// Remove every entry matching the `(trash_filename, original_path)` pair.
    ///
    /// Returns the number of entries removed.
    pub fn remove(&mut self, trash_filename: &str, original_path: &Path) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|e| !e.matches(trash_filename, original_path));
        before - self.entries.len()
    }

    /// Rewrite the journal file atomically.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::Serialize`] or [`JournalError::Write`].
    pub fn save(&self) -> Result<(), JournalError> {
        let json = to_pretty_json(&self.entries)?;
        let write_err = |source| JournalError::Write {
            path: self.path.clone(),
            source,
        };

        let tmp_path = self.path.with_extension("json.tmp");
        {
            let mut file = File::create(&tmp_path).map_err(write_err)?;
            file.write_all(&json).map_err(write_err)?;
            file.sync_all().map_err(write_err)?;
        }
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(write_err(e));
        }

        log::trace!(
            "Wrote {} entries to {}",
            self.entries.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Pretty JSON with a four-space indent.
fn to_pretty_json(entries: &[TrashEntry]) -> Result<Vec<u8>, JournalError> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    entries
        .serialize(&mut serializer)
        .map_err(JournalError::Serialize)?;
    Ok(out)
}
