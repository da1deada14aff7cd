//! Detection pass orchestration.
//!
//! # Overview
//!
//! [`DuplicateFinder`] runs the full detection pipeline:
//! 1. **Walk** - Collect every regular, non-empty file under the roots
//! 2. **Size grouping** - Drop files with a unique size (see [`super::group_by_size`])
//! 3. **Hashing** - Digest the survivors on the bounded pool (see [`crate::scanner::hash_records`])
//! 4. **Hash grouping** - Drop files with a unique digest (see [`super::group_by_hash`])
//!
//! Each stage finishes completely before the next one starts.
//!
//! # Example
//!
//! ```no_run
//! use duplicate_cleaner::duplicates::{DuplicateFinder, FinderConfig};
//! use duplicate_cleaner::scanner::HashAlgorithm;
//! use std::path::PathBuf;
//!
//! let config = FinderConfig::default()
//!     .with_io_threads(4)
//!     .with_algorithm(HashAlgorithm::Sha256);
//! let finder = DuplicateFinder::new(config);
//!
//! let (groups, summary) = finder.find_duplicates(&[PathBuf::from(".")]).unwrap();
//! println!("{} groups, {} reclaimable", groups.len(), summary.reclaimable_display());
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;

use super::groups::{group_by_hash, group_by_size, DuplicateGroups};
use crate::progress::ProgressCallback;
use crate::scanner::{
    hash_records, HashAlgorithm, HashError, HasherConfig, PoolError, ScanError, Walker,
};

/// Configuration for a detection pass.
#[derive(Clone)]
pub struct FinderConfig {
    /// Maximum number of files hashed concurrently. Must be at least 1.
    pub io_threads: usize,
    /// Digest used to compare file contents.
    pub algorithm: HashAlgorithm,
    /// Treat any per-file hashing failure as fatal.
    pub strict: bool,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("algorithm", &self.algorithm)
            .field("strict", &self.strict)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: 10,
            algorithm: HashAlgorithm::default(),
            strict: false,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the number of concurrent hashing tasks.
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads;
        self
    }

    /// Set the digest algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Enable or disable strict mode.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set the shutdown flag for graceful termination.
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

    fn hasher_config(&self) -> HasherConfig {
        let mut config = HasherConfig::default()
            .with_io_threads(self.io_threads)
            .with_algorithm(self.algorithm);
        if let Some(ref flag) = self.shutdown_flag {
            config = config.with_shutdown_flag(flag.clone());
        }
        if let Some(ref callback) = self.progress_callback {
            config = config.with_progress_callback(callback.clone());
        }
        config
    }
}

/// Summary statistics from a detection pass.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Total number of files walked
    pub total_files: usize,
    /// Total size of all walked files in bytes
    pub total_size: u64,
    /// Number of files eliminated by size grouping (unique sizes)
    pub eliminated_by_size: usize,
    /// Number of sizes shared by two or more files
    pub shared_sizes: usize,
    /// Number of files that received a digest
    pub hashed_files: usize,
    /// Bytes read to compute those digests
    pub bytes_hashed: u64,
    /// Per-file hashing failures (files left out of the result)
    pub hash_errors: Vec<HashError>,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding one copy per group)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Duration of the entire pass
    pub scan_duration: Duration,
}

impl ScanSummary {
    /// Whether some files could not be hashed.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.hash_errors.is_empty()
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Format hashed bytes as human-readable string.
    #[must_use]
    pub fn bytes_hashed_display(&self) -> String {
        ByteSize::b(self.bytes_hashed).to_string()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize::b(self.total_size).to_string()
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The pass was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The pass was started without any root.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// The hashing pool could not run.
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// Strict mode: at least one file could not be hashed.
    #[error("{count} file(s) could not be hashed, first failure: {first}")]
    Hash {
        /// The first failure collected
        first: HashError,
        /// Total number of failures
        count: usize,
    },
}

/// Duplicate finder that runs the detection pipeline.
///
/// # Example
///
/// ```no_run
/// use duplicate_cleaner::duplicates::DuplicateFinder;
/// use std::path::PathBuf;
///
/// let finder = DuplicateFinder::with_defaults();
/// match finder.find_duplicates(&[PathBuf::from(".")]) {
///     Ok((groups, summary)) => {
///         println!("Found {} duplicate groups", groups.len());
///         println!("Can reclaim {} bytes", summary.reclaimable_space);
///     }
///     Err(e) => eprintln!("Scan failed: {}", e),
/// }
/// ```
#[derive(Debug)]
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Find all duplicate files under `roots`.
    ///
    /// Per-file hashing failures do not abort the pass: the affected files
    /// are left out of the result and listed in [`ScanSummary::hash_errors`],
    /// unless strict mode is on.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - `io_threads` is zero (checked before any work starts)
    /// - `roots` is empty (roots that cannot be read are skipped with a warning)
    /// - shutdown was requested while the pass was running
    /// - strict mode is on and some file failed to hash
    pub fn find_duplicates(
        &self,
        roots: &[PathBuf],
    ) -> Result<(DuplicateGroups, ScanSummary), FinderError> {
        let start_time = Instant::now();
        let mut summary = ScanSummary::default();

        if self.config.io_threads < 1 {
            return Err(PoolError::InvalidConcurrency(self.config.io_threads).into());
        }
        if roots.is_empty() {
            return Err(ScanError::NoRoots.into());
        }
        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        // Walk
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("walking", 0);
        }

        let mut walker = Walker::new(roots.to_vec());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }
        if let Some(ref callback) = self.config.progress_callback {
            walker = walker.with_progress_callback(callback.clone());
        }
        let walked = walker.walk();

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("walking");
        }
        let files = walked?;

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        summary.total_files = files.len();
        summary.total_size = files.iter().map(|f| f.size).sum();
        log::info!(
            "Found {} files ({})",
            summary.total_files,
            summary.total_size_display()
        );

        // Size grouping
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("grouping", files.len());
        }
        let (mut candidates, size_stats) = group_by_size(files);
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_progress(size_stats.total_files, "size");
            callback.on_phase_end("grouping");
            callback.on_message(&format!(
                "{} of {} files share a size with another file",
                size_stats.potential_duplicates, size_stats.total_files
            ));
        }
        summary.eliminated_by_size = size_stats.eliminated_unique;
        summary.shared_sizes = size_stats.duplicate_groups;

        if candidates.is_empty() {
            log::info!("No potential duplicates found after size grouping");
            summary.scan_duration = start_time.elapsed();
            return Ok((DuplicateGroups::default(), summary));
        }

        // Hashing
        let hash_stats = hash_records(&mut candidates, &self.config.hasher_config())?;

        if hash_stats.interrupted || self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        summary.hashed_files = hash_stats.hashed_files;
        summary.bytes_hashed = hash_stats.bytes_hashed;
        if !hash_stats.errors.is_empty() {
            if self.config.strict {
                let count = hash_stats.errors.len();
                let first = hash_stats.errors.into_iter().next();
                if let Some(first) = first {
                    return Err(FinderError::Hash { first, count });
                }
            } else {
                log::warn!(
                    "{} file(s) could not be hashed and were left out",
                    hash_stats.errors.len()
                );
                summary.hash_errors = hash_stats.errors;
            }
        }

        // Hash grouping
        let groups = group_by_hash(candidates);

        summary.duplicate_groups = groups.len();
        summary.duplicate_files = groups.duplicate_count();
        summary.reclaimable_space = groups.wasted_space();
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} duplicate groups, {} duplicate files, {} reclaimable",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display()
        );

        Ok((groups, summary))
    }
}
