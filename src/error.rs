//! Exit codes and structured error output.

use serde::Serialize;

/// Process exit codes.
///
/// - 0: success (duplicates found, or a trash operation fully succeeded)
/// - 1: general error
/// - 2: scan completed without duplicates
/// - 3: partial success (some items of a batch failed, or files were skipped)
/// - 130: interrupted by Ctrl+C
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Completed normally.
    Success = 0,
    /// An unexpected error occurred.
    GeneralError = 1,
    /// Scan completed but no duplicates were found.
    NoDuplicates = 2,
    /// Completed with some per-item failures.
    PartialSuccess = 3,
    /// Interrupted by the user.
    Interrupted = 130,
}

impl ExitCode {
    /// Numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Machine-readable code.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DA000",
            Self::GeneralError => "DA001",
            Self::NoDuplicates => "DA002",
            Self::PartialSuccess => "DA003",
            Self::Interrupted => "DA130",
        }
    }

    /// The more severe of two exit codes (interrupted > error > partial > ok).
    #[must_use]
    pub fn max_severity(self, other: Self) -> Self {
        fn rank(code: ExitCode) -> u8 {
            match code {
                ExitCode::Success => 0,
                ExitCode::NoDuplicates => 1,
                ExitCode::PartialSuccess => 2,
                ExitCode::GeneralError => 3,
                ExitCode::Interrupted => 4,
            }
        }
        if rank(other) > rank(self) {
            other
        } else {
            self
        }
    }
}

/// Error rendered as JSON for `--json-errors`.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// Machine-readable code, e.g. `DA001`
    pub code: String,
    /// Numeric exit code
    pub exit_code: i32,
    /// Error message including its cause chain
    pub message: String,
    /// Whether the run was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Build from an anyhow error and the exit code it maps to.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
