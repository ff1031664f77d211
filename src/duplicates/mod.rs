//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based candidate grouping ([`groups`])
//! - The scan pipeline and its state machine ([`finder`])
//! - Structured progress/status notifications ([`events`])
//! - The background worker and its presenter handle ([`engine`])

pub mod engine;
pub mod events;
pub mod finder;
pub mod groups;

pub use engine::{start_scan, start_scan_with_token, ScanHandle};
pub use events::{
    EventSink, NullSink, ScanEvent, ScanOutcome, ScanState, ScanStatus, ScanSummary,
};
pub use finder::{validate_roots, DuplicateFinder, FinderError};
pub use groups::{format_size, DuplicateGroup, SizeClass, SizeIndex};
