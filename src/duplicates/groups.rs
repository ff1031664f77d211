//! Size-based candidate indexing and confirmed duplicate groups.
//!
//! # Overview
//!
//! Files with different sizes cannot be duplicates, so the walk records every
//! candidate into a [`SizeIndex`]. Size classes with a single member are
//! discarded before any file is hashed.
//!
//! # Example
//!
//! ```
//! use dupagent::duplicates::SizeIndex;
//! use std::path::PathBuf;
//!
//! let mut index = SizeIndex::new();
//! index.insert(1024, PathBuf::from("/a.jpg"));
//! index.insert(1024, PathBuf::from("/b.jpg"));
//! index.insert(2048, PathBuf::from("/c.jpg"));
//!
//! assert_eq!(index.total_files(), 3);
//! let candidates = index.into_candidates();
//! assert_eq!(candidates.len(), 1);  // only the 1024-byte class survives
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::scanner::{hash_to_hex, Hash};

/// Files sharing one exact byte size, in first-encountered order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeClass {
    /// File size in bytes (shared by all files in this class)
    pub size: u64,
    /// Paths with this exact size
    pub files: Vec<PathBuf>,
}

impl SizeClass {
    /// Number of files in this class.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this class is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// A class is a candidate once it has two or more members.
    #[must_use]
    pub fn is_candidate(&self) -> bool {
        self.files.len() > 1
    }
}

/// Mapping from byte size to the ordered list of paths with that size.
///
/// Size classes keep the order in which their first member was seen, so the
/// hash phase (and therefore group emission) follows walk order.
#[derive(Debug, Default)]
pub struct SizeIndex {
    slots: HashMap<u64, usize>,
    classes: Vec<SizeClass>,
    total_files: usize,
}

impl SizeIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one file.
    pub fn insert(&mut self, size: u64, path: PathBuf) {
        self.total_files += 1;
        match self.slots.get(&size) {
            Some(&slot) => self.classes[slot].files.push(path),
            None => {
                self.slots.insert(size, self.classes.len());
                self.classes.push(SizeClass {
                    size,
                    files: vec![path],
                });
            }
        }
    }

    /// Number of files recorded so far.
    #[must_use]
    pub fn total_files(&self) -> usize {
        self.total_files
    }

    /// Number of distinct sizes recorded so far.
    #[must_use]
    pub fn distinct_sizes(&self) -> usize {
        self.classes.len()
    }

    /// Consume the index, keeping only size classes with 2+ members.
    #[must_use]
    pub fn into_candidates(self) -> Vec<SizeClass> {
        self.classes
            .into_iter()
            .filter(SizeClass::is_candidate)
            .collect()
    }
}

/// Confirmed duplicate group of files.
///
/// `files[0]` is conventionally the original to keep; the rest are copies.
/// Order is first-encountered walk order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// BLAKE3 hash of the file content
    pub hash: Hash,
    /// Byte size of the size class the group came from
    pub size: u64,
    /// Paths with identical content (always 2 or more)
    pub files: Vec<PathBuf>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    #[must_use]
    pub fn new(hash: Hash, size: u64, files: Vec<PathBuf>) -> Self {
        debug_assert!(files.len() >= 2, "duplicate group needs 2+ files");
        Self { hash, size, files }
    }

    /// Content hash as lowercase hex.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.hash)
    }

    /// Human-readable size, e.g. `1.0 KB`.
    #[must_use]
    pub fn size_display(&self) -> String {
        format_size(self.size)
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The file kept by convention.
    #[must_use]
    pub fn original(&self) -> Option<&Path> {
        self.files.first().map(PathBuf::as_path)
    }

    /// Candidates for removal (every file after the first).
    #[must_use]
    pub fn copies(&self) -> &[PathBuf] {
        self.files.get(1..).unwrap_or_default()
    }

    /// Bytes freed by removing every copy.
    #[must_use]
    pub fn reclaimable(&self) -> u64 {
        self.size * self.copies().len() as u64
    }
}

/// Format a byte size as a human-readable string.
///
/// Uses 1024-based units with one decimal place (`512.0 B`, `1.5 KB`). The
/// same rendering is stored in the trash journal's `size` field.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let mut size = bytes as f64;
    for unit in UNITS {
        if size < 1024.0 {
            return format!("{size:3.1} {unit}");
        }
        size /= 1024.0;
    }
    format!("{size:3.1} PB")
}
