//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Sequential depth-first directory walking using walkdir
//! - Content hashing with a selectable digest (MD5, SHA-1, SHA-256, SHA-512)
//! - Bounded-concurrency hashing of many files at once
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: Streaming digests and the bounded hashing pool
//!
//! # Example
//!
//! ```no_run
//! use duplicate_cleaner::scanner::Walker;
//! use std::path::PathBuf;
//!
//! let walker = Walker::new(vec![PathBuf::from(".")]);
//! let records = walker.walk().unwrap();
//! for record in &records {
//!     println!("{}: {} bytes", record.path.display(), record.size);
//! }
//! ```

pub mod hasher;
pub mod walker;

use std::path::PathBuf;
use std::sync::Arc;

// Re-export main types
pub use hasher::{hash_file, hash_records, HashAlgorithm, HashStats, HasherConfig, PoolError};
pub use walker::Walker;

/// A regular, non-empty file discovered by the walker.
///
/// `hash` starts out as `None` and is filled in exactly once by the hashing
/// task that owns the record. A record whose hash stays `None` failed to hash
/// and is dropped by [`crate::duplicates::group_by_hash`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes (always > 0 for walked records)
    pub size: u64,
    /// Lowercase hex digest of the full content, once computed
    pub hash: Option<String>,
}

impl FileRecord {
    /// Create a new record with no hash.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the file
    /// * `size` - File size in bytes
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self {
            path,
            size,
            hash: None,
        }
    }

    /// Whether the record has been hashed successfully.
    #[must_use]
    pub fn is_hashed(&self) -> bool {
        self.hash.as_deref().is_some_and(|h| !h.is_empty())
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// No root directories were given.
    #[error("no roots specified")]
    NoRoots,
}

/// Errors that can occur during file hashing.
///
/// Clonable so the same failure can be both reported and kept in the summary.
#[derive(thiserror::Error, Debug, Clone)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl HashError {
    /// Classify an I/O error raised while opening or reading `path`.
    #[must_use]
    pub fn from_io(path: PathBuf, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io {
                path,
                source: Arc::new(error),
            },
        }
    }

    /// Path of the file that failed to hash.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) | Self::Io { path: p, .. } => p,
        }
    }
}
