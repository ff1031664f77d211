//! Outcome of a trash operation applied to a selection.
//!
//! A batch never aborts on a single item: every item is attempted and ends up
//! in either `successes` or `failures`.

use std::path::PathBuf;

/// Which trash operation a batch performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchKind {
    /// Files moved into a fake trash
    Move,
    /// Trashed files moved back
    Restore,
    /// Trashed files deleted permanently
    Purge,
}

impl BatchKind {
    fn verb(self) -> &'static str {
        match self {
            Self::Move => "Moved",
            Self::Restore => "Restored",
            Self::Purge => "Purged",
        }
    }
}

/// Per-item results of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult<T> {
    /// Operation performed
    pub kind: BatchKind,
    /// Results of the items that succeeded
    pub successes: Vec<T>,
    /// Items that failed, with the rendered error
    pub failures: Vec<(PathBuf, String)>,
}

impl<T> BatchResult<T> {
    /// Empty result for `kind`.
    #[must_use]
    pub fn new(kind: BatchKind) -> Self {
        Self {
            kind,
            successes: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Number of successful items.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    /// Number of failed items.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Check if every item succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Some items succeeded and some failed.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.successes.is_empty() && !self.failures.is_empty()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.all_succeeded() {
            format!("{} {} file(s)", self.kind.verb(), self.success_count())
        } else {
            format!(
                "{} {} file(s), {} failed",
                self.kind.verb(),
                self.success_count(),
                self.failure_count()
            )
        }
    }

    pub(crate) fn record<E: std::fmt::Display>(&mut self, item: PathBuf, result: Result<T, E>) {
        match result {
            Ok(value) => self.successes.push(value),
            Err(e) => {
                log::warn!("{}", e);
                self.failures.push((item, e.to_string()));
            }
        }
    }
}
