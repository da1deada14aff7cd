//! Structured error handling and exit codes.

use serde::Serialize;

use crate::duplicates::FinderError;

/// Exit codes for the duplicate-cleaner application.
///
/// - 0: Success (duplicates listed, or every listed path cleaned)
/// - 1: General error (configuration, malformed list, unreadable root)
/// - 2: No duplicates found (nothing to do)
/// - 3: Partial success (some files could not be hashed or deleted)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the requested pass completed without per-item failures.
    Success = 0,
    /// General error: An unexpected or configuration error occurred.
    GeneralError = 1,
    /// No duplicates: Scan completed but no duplicates were found.
    NoDuplicates = 2,
    /// Partial success: completed, but some files failed to hash or delete.
    PartialSuccess = 3,
    /// Interrupted: Scan was interrupted by user (Ctrl+C).
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DC000",
            Self::GeneralError => "DC001",
            Self::NoDuplicates => "DC002",
            Self::PartialSuccess => "DC003",
            Self::Interrupted => "DC130",
        }
    }

    /// Exit code for a fatal error returned by `run_app`.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        let interrupted = err.chain().any(|cause| {
            matches!(
                cause.downcast_ref::<FinderError>(),
                Some(FinderError::Interrupted)
            )
        });
        if interrupted {
            Self::Interrupted
        } else {
            Self::GeneralError
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DC001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including its causes
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
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
