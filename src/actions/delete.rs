//! Permanent deletion of a user-curated path list.
//!
//! # Overview
//!
//! [`clean_paths`] removes every path it is given, one at a time, and keeps
//! going when a removal fails. Nothing is moved to a trash can and nothing is
//! checked against an earlier detection pass: the list is trusted as-is,
//! since choosing which copies to keep happens before this runs.
//!
//! # Example
//!
//! ```no_run
//! use duplicate_cleaner::actions::clean_paths;
//! use std::path::PathBuf;
//!
//! let outcome = clean_paths(&[PathBuf::from("/tmp/copy-of-report.pdf")], None);
//! println!("{}", outcome.summary());
//! for failure in &outcome.failures {
//!     eprintln!("{}", failure.error);
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::progress::ProgressCallback;

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path that could not be removed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) | Self::Io { path: p, .. } => p,
        }
    }
}

/// One path that could not be removed.
#[derive(Debug)]
pub struct DeleteFailure {
    /// The path as it appeared in the input list
    pub path: PathBuf,
    /// Why removal failed
    pub error: DeleteError,
}

/// Result of a cleanup pass.
#[derive(Debug, Default)]
pub struct DeletionOutcome {
    /// Number of paths removed.
    pub succeeded: usize,
    /// Failed removals, in input order.
    pub failures: Vec<DeleteFailure>,
}

impl DeletionOutcome {
    /// Number of failed removals.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Check if all deletions succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.all_succeeded() {
            format!("{} files cleaned", self.succeeded)
        } else {
            format!(
                "{} files cleaned, {} failed",
                self.succeeded,
                self.failure_count()
            )
        }
    }
}

/// Permanently remove a single file.
///
/// # Errors
///
/// Returns the classified [`DeleteError`] if `fs::remove_file` fails.
pub fn delete_file(path: &Path) -> Result<(), DeleteError> {
    fs::remove_file(path).map_err(|e| DeleteError::from_io(path, e))?;
    log::debug!("Deleted: {}", path.display());
    Ok(())
}

/// Remove every path in `paths`, independently of each other.
///
/// A failure is recorded and the remaining paths are still attempted.
/// Repeated paths are attempted again (and fail with `NotFound`). An empty
/// list touches nothing and returns `(0, no failures)`.
///
/// Shutdown requests are not observed here: every removal is already
/// irreversible, so a started pass runs to the end of the list.
#[must_use]
pub fn clean_paths(
    paths: &[PathBuf],
    callback: Option<&dyn ProgressCallback>,
) -> DeletionOutcome {
    let mut outcome = DeletionOutcome::default();

    if paths.is_empty() {
        log::debug!("Cleaning: No paths to remove");
        return outcome;
    }

    if let Some(cb) = callback {
        cb.on_phase_start("cleaning", paths.len());
    }

    for (index, path) in paths.iter().enumerate() {
        match delete_file(path) {
            Ok(()) => outcome.succeeded += 1,
            Err(error) => {
                log::warn!("Failed to delete {}: {}", path.display(), error);
                outcome.failures.push(DeleteFailure {
                    path: path.clone(),
                    error,
                });
            }
        }

        if let Some(cb) = callback {
            cb.on_progress(index + 1, &path.to_string_lossy());
        }
    }

    if let Some(cb) = callback {
        cb.on_phase_end("cleaning");
    }

    log::info!("{}", outcome.summary());

    outcome
}
