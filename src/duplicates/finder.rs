//! Duplicate finder implementation.
//!
//! # Overview
//!
//! This module runs the whole scan on the calling thread:
//! 1. **Walk** - traverse every root, filter candidates, fill a [`SizeIndex`]
//! 2. **Candidate selection** - keep size classes with 2+ members
//! 3. **Hash** - digest every candidate, one file at a time
//! 4. **Grouping** - group by digest inside each size class
//!
//! Per-file failures are counted and skipped. Cancellation is cooperative:
//! the shared flag is checked per root, per directory entry and per
//! candidate file, and a cancelled scan emits no groups.
//!
//! # Example
//!
//! ```no_run
//! use dupagent::duplicates::{DuplicateFinder, NullSink, ScanOutcome};
//! use dupagent::scanner::ScanOptions;
//! use std::path::PathBuf;
//!
//! let mut finder = DuplicateFinder::new(ScanOptions::default());
//! let roots = vec![PathBuf::from(".")];
//! if let ScanOutcome::Completed { groups, summary } = finder.scan(&roots, &NullSink) {
//!     println!("{} groups, {} bytes reclaimable", groups.len(), summary.reclaimable_bytes);
//! }
//! ```

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use super::events::{EventSink, ScanEvent, ScanOutcome, ScanState, ScanStatus, ScanSummary};
use super::groups::{DuplicateGroup, SizeClass, SizeIndex};
use crate::scanner::{Hash, Hasher, ScanOptions, Walker};

/// Errors that prevent a scan from starting.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// No scan root was given.
    #[error("No directory to scan")]
    NoRoots,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The worker thread could not be spawned.
    #[error("Failed to start scan worker: {0}")]
    Spawn(#[source] io::Error),

    /// The worker thread panicked before finishing.
    #[error("Scan worker terminated unexpectedly")]
    WorkerPanicked,
}

/// Reject roots that do not exist or are not directories.
///
/// # Errors
///
/// Returns the first precondition violation found.
pub fn validate_roots(roots: &[PathBuf]) -> Result<(), FinderError> {
    if roots.is_empty() {
        return Err(FinderError::NoRoots);
    }
    for root in roots {
        if !root.exists() {
            return Err(FinderError::PathNotFound(root.clone()));
        }
        if !root.is_dir() {
            return Err(FinderError::NotADirectory(root.clone()));
        }
    }
    Ok(())
}

/// Scan engine that orchestrates walk, hash and grouping.
#[derive(Debug)]
pub struct DuplicateFinder {
    options: ScanOptions,
    hasher: Hasher,
    shutdown_flag: Option<Arc<AtomicBool>>,
    state: ScanState,
}

impl DuplicateFinder {
    /// Create a finder with the given candidate policy.
    #[must_use]
    pub fn new(options: ScanOptions) -> Self {
        let hasher = Hasher::new().with_chunk_size(options.chunk_size);
        Self {
            options,
            hasher,
            shutdown_flag: None,
            state: ScanState::Idle,
        }
    }

    /// Set the cancellation flag.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Candidate policy in use.
    #[must_use]
    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    fn transition(&mut self, next: ScanState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal scan transition {:?} -> {:?}",
            self.state,
            next
        );
        log::debug!("Scan state: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn cancel(&mut self, sink: &dyn EventSink) -> ScanOutcome {
        log::info!("Scan cancelled during {:?}", self.state);
        self.transition(ScanState::Cancelled);
        sink.emit(ScanEvent::Status(ScanStatus::Cancelled));
        ScanOutcome::Cancelled
    }

    /// Run a full scan over `roots`, publishing progress to `sink`.
    ///
    /// Roots are expected to be validated with [`validate_roots`] first; an
    /// invalid root only produces a counted walk error here. The last status
    /// emitted is always `Finished`, `NoDuplicates` or `Cancelled`. The
    /// terminal [`ScanEvent::Finished`] is left to the caller, which owns the
    /// returned outcome.
    ///
    /// A finder runs one scan; calling this again after a terminal state
    /// returns [`ScanOutcome::Cancelled`] without doing any work.
    pub fn scan(&mut self, roots: &[PathBuf], sink: &dyn EventSink) -> ScanOutcome {
        if self.state != ScanState::Idle {
            log::warn!("Scan requested on a finder in state {:?}", self.state);
            return ScanOutcome::Cancelled;
        }

        let start_time = Instant::now();
        let mut summary = ScanSummary::default();

        self.transition(ScanState::Walking);
        sink.emit(ScanEvent::Status(ScanStatus::Walking));

        let Some(index) = self.walk_roots(roots, &mut summary) else {
            return self.cancel(sink);
        };
        if self.is_shutdown_requested() {
            return self.cancel(sink);
        }

        summary.total_files = index.total_files();
        let distinct_sizes = index.distinct_sizes();
        let candidates = index.into_candidates();
        summary.candidates = candidates.iter().map(SizeClass::len).sum();

        log::info!(
            "Walk complete: {} files in {} sizes, {} candidates in {} size classes",
            summary.total_files,
            distinct_sizes,
            summary.candidates,
            candidates.len()
        );

        if summary.candidates == 0 {
            summary.duration = start_time.elapsed();
            self.transition(ScanState::Completed);
            sink.emit(ScanEvent::Status(ScanStatus::NoDuplicates {
                total_files: summary.total_files,
            }));
            return ScanOutcome::Completed {
                groups: Vec::new(),
                summary,
            };
        }

        self.transition(ScanState::Hashing);
        sink.emit(ScanEvent::Status(ScanStatus::Hashing {
            candidates: summary.candidates,
        }));

        let Some(groups) = self.hash_candidates(candidates, &mut summary, sink) else {
            return self.cancel(sink);
        };

        summary.duplicate_groups = groups.len();
        summary.duplicate_files = groups.iter().map(|g| g.copies().len()).sum();
        summary.reclaimable_bytes = groups.iter().map(DuplicateGroup::reclaimable).sum();
        summary.duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} duplicate groups, {} duplicate files, {} hash failures",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.failed
        );

        self.transition(ScanState::Completed);
        sink.emit(ScanEvent::Progress(100));
        sink.emit(ScanEvent::Status(ScanStatus::Finished {
            groups: groups.len(),
        }));

        ScanOutcome::Completed { groups, summary }
    }

    /// Walk phase. Returns `None` when cancellation was observed.
    fn walk_roots(&self, roots: &[PathBuf], summary: &mut ScanSummary) -> Option<SizeIndex> {
        let mut index = SizeIndex::new();

        for root in roots {
            if self.is_shutdown_requested() {
                return None;
            }

            // Group members are reported as absolute paths.
            let root = match std::path::absolute(root) {
                Ok(root) => root,
                Err(e) => {
                    log::warn!("Cannot resolve {}: {}", root.display(), e);
                    summary.walk_errors += 1;
                    continue;
                }
            };
            log::info!("Walking {}", root.display());

            let mut walker = Walker::new(&root, &self.options);
            if let Some(ref flag) = self.shutdown_flag {
                walker = walker.with_shutdown_flag(flag.clone());
            }

            for result in walker.walk() {
                match result {
                    Ok(file) => index.insert(file.size, file.path),
                    Err(e) => {
                        log::debug!("Skipping unreadable entry: {}", e);
                        summary.walk_errors += 1;
                    }
                }
            }
        }

        Some(index)
    }

    /// Hash phase plus grouping. Returns `None` when cancellation was observed.
    fn hash_candidates(
        &self,
        candidates: Vec<SizeClass>,
        summary: &mut ScanSummary,
        sink: &dyn EventSink,
    ) -> Option<Vec<DuplicateGroup>> {
        let total = summary.candidates;
        let mut processed = 0usize;
        let mut groups = Vec::new();

        for class in candidates {
            let mut order: Vec<Hash> = Vec::new();
            let mut by_hash: HashMap<Hash, Vec<PathBuf>> = HashMap::new();

            for path in class.files {
                if self.is_shutdown_requested() {
                    return None;
                }

                processed += 1;
                sink.emit(ScanEvent::Progress(percent(processed, total)));
                sink.emit(ScanEvent::Status(ScanStatus::HashingFile {
                    name: base_name(&path),
                }));

                match self.hasher.digest(&path) {
                    Ok(hash) => {
                        summary.hashed += 1;
                        by_hash
                            .entry(hash)
                            .or_insert_with(|| {
                                order.push(hash);
                                Vec::new()
                            })
                            .push(path);
                    }
                    Err(e) => {
                        log::warn!("Failed to hash {}: {}", path.display(), e);
                        summary.failed += 1;
                    }
                }
            }

            for hash in order {
                if let Some(files) = by_hash.remove(&hash) {
                    if files.len() >= 2 {
                        groups.push(DuplicateGroup::new(hash, class.size, files));
                    }
                }
            }
        }

        Some(groups)
    }
}

/// Integer percentage, clamped to 100.
fn percent(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let pct = (processed.saturating_mul(100) / total).min(100);
    u8::try_from(pct).unwrap_or(100)
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
