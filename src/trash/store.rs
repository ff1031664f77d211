//! The fake trash: move, restore, purge and list.
//!
//! # Overview
//!
//! Each mount point gets its own trash directory, `<mount>/.Trash-<App>`, and
//! its own journal inside it. Moving a file is a single `rename` within the
//! same device, never a copy. The journal on disk is the only source of
//! truth; every operation re-reads it before rewriting it.
//!
//! Calls are expected to come from one controlling context. Concurrent
//! writers to the same journal are not coordinated.
//!
//! # Example
//!
//! ```no_run
//! use dupagent::trash::TrashStore;
//! use std::path::Path;
//!
//! let store = TrashStore::default();
//! let entry = store.move_to_trash(Path::new("/data/copy.jpg"), 1024)?;
//! store.restore(&entry.trash_filename, &entry.original_path, &entry.trash_dir)?;
//! # Ok::<(), dupagent::trash::TrashError>(())
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::batch::{BatchKind, BatchResult};
use super::journal::{now_timestamp, Journal, JournalError, TrashEntry, JOURNAL_FILE_NAME};
use super::mount::{absolutize, MountResolver, SystemMountResolver};
use crate::duplicates::format_size;

/// Application name used in trash directory names.
pub const APP_NAME: &str = "DuplicateAgent";

/// Errors from trash operations.
#[derive(thiserror::Error, Debug)]
pub enum TrashError {
    /// The file to trash does not exist.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// The owning mount could not be determined.
    #[error("Cannot resolve mount for {path}: {source}")]
    Resolve {
        /// Path being resolved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The trash directory could not be created.
    #[error("Cannot create trash directory {path}: {source}")]
    Setup {
        /// Trash directory
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Renaming the file into the trash failed; the file is untouched.
    #[error("Failed to move {path} to trash: {source}")]
    Move {
        /// Original path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The trashed file is no longer in the trash directory.
    #[error("Not in trash: {0}")]
    NotInTrash(PathBuf),

    /// Restoring would overwrite an existing file.
    #[error("Restore destination already exists: {0}")]
    DestinationExists(PathBuf),

    /// Renaming the file back to its original location failed.
    #[error("Failed to restore {path}: {source}")]
    Restore {
        /// Original path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Deleting the trashed file failed.
    #[error("Failed to purge {path}: {source}")]
    Purge {
        /// Trashed file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The journal could not be read or written.
    #[error(transparent)]
    Journal(#[from] JournalError),

    /// A batch operation was given nothing to do.
    #[error("No files selected")]
    EmptySelection,
}

impl TrashError {
    /// Path associated with the error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound(p) | Self::NotInTrash(p) | Self::DestinationExists(p) => Some(p),
            Self::Resolve { path, .. }
            | Self::Setup { path, .. }
            | Self::Move { path, .. }
            | Self::Restore { path, .. }
            | Self::Purge { path, .. } => Some(path),
            Self::Journal(_) | Self::EmptySelection => None,
        }
    }
}

/// Mount-aware, journal-backed fake trash.
#[derive(Debug)]
pub struct TrashStore {
    app_name: String,
    resolver: Box<dyn MountResolver>,
}

impl Default for TrashStore {
    fn default() -> Self {
        Self::new(APP_NAME)
    }
}

impl TrashStore {
    /// Store using the platform mount resolver.
    #[must_use]
    pub fn new(app_name: impl Into<String>) -> Self {
        Self::with_resolver(app_name, SystemMountResolver)
    }

    /// Store using a custom mount resolver.
    #[must_use]
    pub fn with_resolver(app_name: impl Into<String>, resolver: impl MountResolver + 'static) -> Self {
        Self {
            app_name: app_name.into(),
            resolver: Box::new(resolver),
        }
    }

    /// Application name embedded in trash directory names.
    #[must_use]
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// Trash directory for a mount root.
    #[must_use]
    pub fn trash_dir_for(&self, mount: &Path) -> PathBuf {
        mount.join(format!(".Trash-{}", self.app_name))
    }

    /// Journal file for a mount root.
    #[must_use]
    pub fn journal_path_for(&self, mount: &Path) -> PathBuf {
        self.trash_dir_for(mount).join(JOURNAL_FILE_NAME)
    }

    /// Mount root owning `path`.
    ///
    /// # Errors
    ///
    /// Returns [`TrashError::Resolve`] if the path cannot be made absolute.
    pub fn resolve_mount(&self, path: &Path) -> Result<PathBuf, TrashError> {
        self.resolver
            .resolve_mount(path)
            .map_err(|source| TrashError::Resolve {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Move a file into the trash of its own mount.
    ///
    /// The trash directory and an empty journal are created on first use.
    /// On rename failure nothing changes. If the journal cannot be written
    /// afterwards, the file is moved back before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`TrashError`] describing the step that failed.
    pub fn move_to_trash(&self, path: &Path, size_bytes: u64) -> Result<TrashEntry, TrashError> {
        if path.symlink_metadata().is_err() {
            return Err(TrashError::NotFound(path.to_path_buf()));
        }
        let original = absolute_source(path).map_err(|source| TrashError::Resolve {
            path: path.to_path_buf(),
            source,
        })?;

        let mount = self.resolve_mount(&original)?;
        let trash_dir = self.trash_dir_for(&mount);
        let journal_path = trash_dir.join(JOURNAL_FILE_NAME);

        fs::create_dir_all(&trash_dir).map_err(|source| TrashError::Setup {
            path: trash_dir.clone(),
            source,
        })?;
        Journal::ensure_exists(&journal_path)?;

        let trash_filename = unique_trash_name(&trash_dir, &original);
        let target = trash_dir.join(&trash_filename);

        fs::rename(&original, &target).map_err(|source| TrashError::Move {
            path: original.clone(),
            source,
        })?;

        let entry = TrashEntry {
            trash_filename,
            original_path: original.clone(),
            deletion_date: now_timestamp(),
            size: format_size(size_bytes),
            size_bytes,
            trash_dir,
        };

        let mut journal = Journal::load(&journal_path);
        journal.push(entry.clone());
        if let Err(e) = journal.save() {
            log::error!("Journal write failed, moving {} back", original.display());
            if let Err(back) = fs::rename(&target, &original) {
                log::error!(
                    "Could not move {} back to {}: {}",
                    target.display(),
                    original.display(),
                    back
                );
            }
            return Err(e.into());
        }

        log::info!("Trashed {} as {}", original.display(), target.display());
        Ok(entry)
    }

    /// Move a trashed file back to where it came from.
    ///
    /// Missing parent directories of `original_path` are recreated. The
    /// journal entry matching the `(trash_filename, original_path)` pair is
    /// removed afterwards. If that journal rewrite fails the restore still
    /// succeeds and the stale entry is logged.
    ///
    /// # Errors
    ///
    /// Returns [`TrashError::NotInTrash`] (journal untouched) if the trashed
    /// file is gone, [`TrashError::DestinationExists`] if something already
    /// sits at the original path.
    pub fn restore(
        &self,
        trash_filename: &str,
        original_path: &Path,
        trash_dir: &Path,
    ) -> Result<PathBuf, TrashError> {
        let trash_path = trash_dir.join(trash_filename);
        if trash_path.symlink_metadata().is_err() {
            return Err(TrashError::NotInTrash(trash_path));
        }
        if original_path.symlink_metadata().is_ok() {
            return Err(TrashError::DestinationExists(original_path.to_path_buf()));
        }

        let restore_err = |source| TrashError::Restore {
            path: original_path.to_path_buf(),
            source,
        };
        if let Some(parent) = original_path.parent() {
            fs::create_dir_all(parent).map_err(restore_err)?;
        }
        fs::rename(&trash_path, original_path).map_err(restore_err)?;

        // The file is already back; a failed rewrite only leaves a stale
        // entry, which a later purge of that entry clears.
        let mut journal = Journal::load(&trash_dir.join(JOURNAL_FILE_NAME));
        if journal.remove(trash_filename, original_path) > 0 {
            if let Err(e) = journal.save() {
                log::warn!(
                    "Restored {} but left a stale journal entry: {}",
                    original_path.display(),
                    e
                );
            }
        } else {
            log::debug!("No journal entry for {}", trash_path.display());
        }

        log::info!("Restored {}", original_path.display());
        Ok(original_path.to_path_buf())
    }

    /// Restore using a listed entry.
    ///
    /// # Errors
    ///
    /// See [`restore`](Self::restore).
    pub fn restore_entry(&self, entry: &TrashEntry) -> Result<PathBuf, TrashError> {
        self.restore(&entry.trash_filename, &entry.original_path, &entry.trash_dir)
    }

    /// Delete a trashed file permanently and drop its journal entry.
    ///
    /// A file that is already gone is not an error, so purging twice succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`TrashError::Purge`] if the file exists but cannot be removed,
    /// or a journal error if the rewrite fails.
    pub fn purge(
        &self,
        trash_filename: &str,
        original_path: &Path,
        trash_dir: &Path,
    ) -> Result<(), TrashError> {
        let trash_path = trash_dir.join(trash_filename);
        match fs::remove_file(&trash_path) {
            Ok(()) => log::info!("Purged {}", trash_path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("Already gone: {}", trash_path.display());
            }
            Err(source) => {
                return Err(TrashError::Purge {
                    path: trash_path,
                    source,
                })
            }
        }

        let mut journal = Journal::load(&trash_dir.join(JOURNAL_FILE_NAME));
        if journal.remove(trash_filename, original_path) > 0 {
            journal.save()?;
        }
        Ok(())
    }

    /// Purge using a listed entry.
    ///
    /// # Errors
    ///
    /// See [`purge`](Self::purge).
    pub fn purge_entry(&self, entry: &TrashEntry) -> Result<(), TrashError> {
        self.purge(&entry.trash_filename, &entry.original_path, &entry.trash_dir)
    }

    /// Entries of one mount's journal, freshly read from disk.
    ///
    /// Missing or corrupt journals yield an empty list.
    #[must_use]
    pub fn list_entries(&self, mount: &Path) -> Vec<TrashEntry> {
        Journal::load(&self.journal_path_for(mount)).into_entries()
    }

    /// Entries across the mounts owning `dirs`, each mount read once.
    ///
    /// Directories that do not exist or cannot be resolved are skipped.
    #[must_use]
    pub fn collect_entries(&self, dirs: &[PathBuf]) -> Vec<TrashEntry> {
        let mut mounts: Vec<PathBuf> = Vec::new();
        for dir in dirs.iter().filter(|d| d.exists()) {
            match self.resolve_mount(dir) {
                Ok(mount) if !mounts.contains(&mount) => mounts.push(mount),
                Ok(_) => {}
                Err(e) => log::debug!("Skipping {}: {}", dir.display(), e),
            }
        }

        mounts
            .iter()
            .flat_map(|mount| self.list_entries(mount))
            .collect()
    }

    /// Move every `(path, size)` pair, continuing past failures.
    ///
    /// # Errors
    ///
    /// Returns [`TrashError::EmptySelection`] when `files` is empty.
    pub fn move_batch(&self, files: &[(PathBuf, u64)]) -> Result<BatchResult<TrashEntry>, TrashError> {
        if files.is_empty() {
            return Err(TrashError::EmptySelection);
        }
        let mut result = BatchResult::new(BatchKind::Move);
        for (path, size) in files {
            result.record(path.clone(), self.move_to_trash(path, *size));
        }
        log::info!("{}", result.summary());
        Ok(result)
    }

    /// Restore every entry, continuing past failures.
    ///
    /// # Errors
    ///
    /// Returns [`TrashError::EmptySelection`] when `entries` is empty.
    pub fn restore_batch(&self, entries: &[TrashEntry]) -> Result<BatchResult<PathBuf>, TrashError> {
        if entries.is_empty() {
            return Err(TrashError::EmptySelection);
        }
        let mut result = BatchResult::new(BatchKind::Restore);
        for entry in entries {
            result.record(entry.original_path.clone(), self.restore_entry(entry));
        }
        log::info!("{}", result.summary());
        Ok(result)
    }

    /// Purge every entry, continuing past failures.
    ///
    /// # Errors
    ///
    /// Returns [`TrashError::EmptySelection`] when `entries` is empty.
    pub fn purge_batch(&self, entries: &[TrashEntry]) -> Result<BatchResult<PathBuf>, TrashError> {
        if entries.is_empty() {
            return Err(TrashError::EmptySelection);
        }
        let mut result = BatchResult::new(BatchKind::Purge);
        for entry in entries {
            let purged = self.purge_entry(entry).map(|()| entry.trash_path());
            result.record(entry.trash_path(), purged);
        }
        log::info!("{}", result.summary());
        Ok(result)
    }
}

/// Absolute path of `path` with its parent resolved but the final component
/// kept as-is, so a symlink is trashed itself rather than its target.
fn absolute_source(path: &Path) -> io::Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "path has no file name")
    })?;
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    Ok(absolutize(parent)?.join(name))
}

/// `<stem>_<millis><.ext>`, then `<stem>_<millis>_<n><.ext>` until free.
fn unique_trash_name(trash_dir: &Path, original: &Path) -> String {
    let stem = original
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = original
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let millis = chrono::Utc::now().timestamp_millis();

    let mut candidate = format!("{stem}_{millis}{ext}");
    let mut counter = 0u64;
    while trash_dir.join(&candidate).symlink_metadata().is_ok() {
        counter += 1;
        candidate = format!("{stem}_{millis}_{counter}{ext}");
    }
    candidate
}
