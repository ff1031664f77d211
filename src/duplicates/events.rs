//! Structured notifications published by the scan engine.
//!
//! The engine never produces localized text. Presenters receive
//! [`ScanEvent`] values and decide how to render them; the `Display`
//! implementations here are a plain English fallback used by the CLI.

use std::fmt;
use std::time::Duration;

use crossbeam_channel::Sender;

use super::DuplicateGroup;

/// Lifecycle of a single scan.
///
/// `Idle -> Walking -> Hashing -> Completed`, with `Cancelled` reachable from
/// `Walking` or `Hashing`. A scan that finds no candidates goes straight from
/// `Walking` to `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Not started yet.
    Idle,
    /// Traversing the roots and building the size index.
    Walking,
    /// Hashing size-class candidates.
    Hashing,
    /// Terminal: results were produced.
    Completed,
    /// Terminal: cancellation was observed, no results.
    Cancelled,
}

impl ScanState {
    /// Whether the state is terminal.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Whether moving to `next` is a legal transition.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Walking)
                | (Self::Walking, Self::Hashing)
                | (Self::Walking, Self::Completed)
                | (Self::Walking, Self::Cancelled)
                | (Self::Hashing, Self::Completed)
                | (Self::Hashing, Self::Cancelled)
        )
    }
}

/// Status payloads, rendered by the presenter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanStatus {
    /// The walk phase started.
    Walking,
    /// The hash phase started with this many candidate files.
    Hashing {
        /// Files across all size classes with 2+ members
        candidates: usize,
    },
    /// A file is about to be hashed.
    HashingFile {
        /// Base name of the file
        name: String,
    },
    /// No size class had two members; hashing was skipped.
    NoDuplicates {
        /// Files that passed the candidate filter
        total_files: usize,
    },
    /// The scan completed.
    Finished {
        /// Number of duplicate groups found
        groups: usize,
    },
    /// The scan stopped on request.
    Cancelled,
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Walking => write!(f, "Scanning files..."),
            Self::Hashing { candidates } => {
                write!(f, "Hashing {candidates} candidate files...")
            }
            Self::HashingFile { name } => write!(f, "Currently hashing: {name}"),
            Self::NoDuplicates { total_files } => {
                write!(f, "Scan finished: no duplicates among {total_files} files")
            }
            Self::Finished { groups } => write!(f, "Scan finished: {groups} duplicate groups"),
            Self::Cancelled => write!(f, "Scan cancelled"),
        }
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Files that passed the candidate filter
    pub total_files: usize,
    /// Files in size classes with 2+ members
    pub candidates: usize,
    /// Candidates hashed successfully
    pub hashed: usize,
    /// Candidates dropped because hashing failed
    pub failed: usize,
    /// Entries skipped during the walk (permission errors, vanished files)
    pub walk_errors: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Files beyond the first in each group
    pub duplicate_files: usize,
    /// Bytes freed by removing every copy
    pub reclaimable_bytes: u64,
    /// Wall time of the scan
    pub duration: Duration,
}

impl ScanSummary {
    /// Whether any per-file error was recovered during the scan.
    #[must_use]
    pub fn had_errors(&self) -> bool {
        self.failed > 0 || self.walk_errors > 0
    }
}

/// Terminal result of a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The scan ran to the end.
    Completed {
        /// Confirmed duplicate groups, in emission order
        groups: Vec<DuplicateGroup>,
        /// Scan statistics
        summary: ScanSummary,
    },
    /// The scan observed cancellation; nothing was emitted.
    Cancelled,
}

impl ScanOutcome {
    /// Whether this outcome is the cancelled terminal.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Everything the worker publishes, in order. `Finished` is always last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// Integer percentage of hashed candidates, non-decreasing.
    Progress(u8),
    /// A status change.
    Status(ScanStatus),
    /// The scan reached a terminal state.
    Finished(ScanOutcome),
}

/// Destination for engine notifications.
pub trait EventSink {
    /// Deliver one event. Delivery failures are ignored by the engine.
    fn emit(&self, event: ScanEvent);
}

impl EventSink for Sender<ScanEvent> {
    fn emit(&self, event: ScanEvent) {
        if self.send(event).is_err() {
            log::trace!("Scan event dropped: receiver disconnected");
        }
    }
}

/// Sink that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: ScanEvent) {}
}
