//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a scan root and
//! yielding the regular files that pass the candidate filter. The walk runs
//! on the caller's thread; the scan engine drives it from its single worker.
//!
//! # Features
//!
//! - Depth-first traversal, children sorted by file name
//! - Hidden directories pruned before descent (their subtrees are never read)
//! - Zero-byte, hidden and extension filters applied cheapest-first
//! - Symbolic links are never followed and never become candidates
//! - Cooperative stop via atomic flag, checked per directory entry
//!
//! # Example
//!
//! ```no_run
//! use dupagent::scanner::{ScanOptions, Walker};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Pictures"), &ScanOptions::default());
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("{} candidates before size grouping", files.len());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::{DirEntry, WalkDir};

use super::{FileEntry, ScanError, ScanOptions};

/// Directory walker for file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Candidate filter policy
    options: ScanOptions,
    /// Optional flag for cooperative cancellation
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given root.
    #[must_use]
    pub fn new(root: &Path, options: &ScanOptions) -> Self {
        Self {
            root: root.to_path_buf(),
            options: options.clone(),
            shutdown_flag: None,
        }
    }

    /// Set the flag that stops iteration once it becomes `true`.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Walk the tree, yielding candidate files.
    ///
    /// Errors (permission denied, entries vanishing mid-walk) are yielded as
    /// [`ScanError`] values and never stop the iteration. Iteration ends early
    /// when the shutdown flag is raised.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        let prune_hidden = self.options.ignore_hidden;

        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| {
                if !prune_hidden || entry.depth() == 0 || !entry.file_type().is_dir() {
                    return true;
                }
                let hidden = is_hidden(entry);
                if hidden {
                    log::trace!("Pruning hidden directory: {}", entry.path().display());
                }
                !hidden
            })
            .take_while(move |_| {
                let stop = self.is_shutdown_requested();
                if stop {
                    log::debug!("Walker: shutdown requested, stopping iteration");
                }
                !stop
            })
            .filter_map(move |result| match result {
                Ok(entry) => self.process_entry(&entry),
                Err(e) => Some(Err(self.convert_error(e))),
            })
    }

    fn process_entry(&self, entry: &DirEntry) -> Option<Result<FileEntry, ScanError>> {
        let file_type = entry.file_type();
        let path = entry.path();

        if file_type.is_dir() {
            return None;
        }
        if file_type.is_symlink() {
            log::trace!("Skipping symlink: {}", path.display());
            return None;
        }
        if !file_type.is_file() {
            return None;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => return Some(Err(self.convert_error(e))),
        };
        let size = metadata.len();

        if self.options.ignore_zero_byte && size == 0 {
            log::trace!("Skipping empty file: {}", path.display());
            return None;
        }

        if self.options.ignore_hidden && is_hidden(entry) {
            log::trace!("Skipping hidden file: {}", path.display());
            return None;
        }

        if !self.options.allows_extension(path) {
            log::trace!("Skipping file due to extension filter: {}", path.display());
            return None;
        }

        Some(Ok(FileEntry::new(path.to_path_buf(), size)))
    }

    fn convert_error(&self, err: walkdir::Error) -> ScanError {
        let path = err
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);
        log::debug!("Walk error at {}: {}", path.display(), err);
        ScanError::from_io(&path, err.into())
    }
}

/// Dot-prefixed names are hidden on every platform; Windows also honours the
/// hidden and system attributes.
fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.') || has_hidden_attribute(entry)
}

#[cfg(windows)]
fn has_hidden_attribute(entry: &DirEntry) -> bool {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
    const FILE_ATTRIBUTE_SYSTEM: u32 = 0x4;

    entry.metadata().is_ok_and(|m| {
        m.file_attributes() & (FILE_ATTRIBUTE_HIDDEN | FILE_ATTRIBUTE_SYSTEM) != 0
    })
}

#[cfg(not(windows))]
fn has_hidden_attribute(_entry: &DirEntry) -> bool {
    false
}
