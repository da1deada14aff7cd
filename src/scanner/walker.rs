//! Directory walker implementation using walkdir for sequential traversal.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing one or more
//! root directories and collecting a [`FileRecord`] for every regular,
//! non-empty file found beneath them.
//!
//! # Traversal rules
//!
//! - Each root is made absolute first; a root that cannot be made absolute is
//!   skipped with a warning.
//! - A root that does not exist (or cannot be stat'ed) is skipped with a
//!   warning; the remaining roots are still walked.
//! - A root that is itself a symlink is not followed.
//! - Directories named `.git` or `.svn` (any case) are pruned.
//! - Unreadable entries are skipped together with their subtree.
//! - Symlinks, devices, sockets and empty files are never reported.
//!
//! # Example
//!
//! ```no_run
//! use duplicate_cleaner::scanner::Walker;
//! use std::path::PathBuf;
//!
//! let walker = Walker::new(vec![PathBuf::from("/home/user/Downloads")]);
//! let records = walker.walk().expect("walk failed");
//! println!("Found {} candidate files", records.len());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::{DirEntry, WalkDir};

use super::{FileRecord, ScanError};
use crate::progress::ProgressCallback;

/// Directory names that are never descended into.
const PRUNED_DIRS: &[&str] = &[".git", ".svn"];

/// Directory walker for file discovery.
///
/// Traversal is single-threaded and depth-first; roots are visited in the
/// order they were given.
pub struct Walker {
    /// Root paths to walk
    roots: Vec<PathBuf>,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress sink, fed the running count of visited entries
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for Walker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
            .field("roots", &self.roots)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Walker {
    /// Create a new walker over the given roots.
    ///
    /// # Arguments
    ///
    /// * `roots` - Directories (or files) to scan
    #[must_use]
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            shutdown_flag: None,
            progress_callback: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops as soon as it
    /// reaches the next entry and returns what it has collected so far.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Walk every root, returning the records of all regular non-empty files.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::NoRoots`] if the walker was built with no roots.
    /// Roots that cannot be resolved or stat'ed, and errors below a root,
    /// are logged and skipped.
    pub fn walk(&self) -> Result<Vec<FileRecord>, ScanError> {
        if self.roots.is_empty() {
            return Err(ScanError::NoRoots);
        }

        let mut records = Vec::new();
        let mut visited = 0usize;

        for root in &self.roots {
            let root = match std::path::absolute(root) {
                Ok(path) => path,
                Err(e) => {
                    log::warn!("Cannot resolve absolute path of {}: {}", root.display(), e);
                    continue;
                }
            };

            if let Err(e) = std::fs::symlink_metadata(&root) {
                log::warn!("Skipping root {}: {}", root.display(), e);
                continue;
            }

            log::debug!("Walking {}", root.display());
            self.walk_root(&root, &mut records, &mut visited);

            if self.is_shutdown_requested() {
                log::debug!("Walker: Shutdown requested, stopping traversal");
                break;
            }
        }

        log::info!(
            "Walk complete: {} entries visited, {} candidate files",
            visited,
            records.len()
        );

        Ok(records)
    }

    /// Walk a single, already-resolved root.
    fn walk_root(&self, root: &Path, records: &mut Vec<FileRecord>, visited: &mut usize) {
        let entries = WalkDir::new(root)
            .follow_links(false)
            .follow_root_links(false)
            .into_iter()
            .filter_entry(|entry| !is_pruned_dir(entry));

        for entry in entries {
            if self.is_shutdown_requested() {
                return;
            }

            *visited += 1;

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    // walkdir does not descend into a directory it failed to read
                    let path = e.path().unwrap_or(root);
                    log::warn!("Skipping unreadable entry {}: {}", path.display(), e);
                    self.report_progress(*visited, path);
                    continue;
                }
            };

            self.report_progress(*visited, entry.path());

            if let Some(record) = Self::process_entry(&entry) {
                records.push(record);
            }
        }
    }

    /// Turn a directory entry into a record if it is a regular non-empty file.
    fn process_entry(entry: &DirEntry) -> Option<FileRecord> {
        let file_type = entry.file_type();

        // Symlinks, devices, sockets, fifos and directories
        if !file_type.is_file() {
            if !file_type.is_dir() {
                log::trace!("Skipping non-regular file: {}", entry.path().display());
            }
            return None;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                log::warn!("Cannot stat {}: {}", entry.path().display(), e);
                return None;
            }
        };

        let size = metadata.len();
        if size == 0 {
            log::trace!("Skipping empty file: {}", entry.path().display());
            return None;
        }

        Some(FileRecord::new(entry.path().to_path_buf(), size))
    }

    fn report_progress(&self, visited: usize, path: &Path) {
        if let Some(ref callback) = self.progress_callback {
            callback.on_progress(visited, path.to_string_lossy().as_ref());
        }
    }
}

/// Whether an entry is a version-control directory that must not be descended into.
fn is_pruned_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    entry.file_name().to_str().is_some_and(|name| {
        PRUNED_DIRS
            .iter()
            .any(|pruned| name.eq_ignore_ascii_case(pruned))
    })
}
