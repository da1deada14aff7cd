//! Streaming file digests and the bounded hashing pool.
//!
//! # Overview
//!
//! [`HashAlgorithm`] selects one of four digests. [`hash_file`] streams a
//! file through a freshly constructed accumulator and returns the lowercase
//! hex digest. [`hash_records`] annotates many [`FileRecord`]s at once on a
//! dedicated rayon pool of `io_threads` workers, so no more than
//! `io_threads` files are ever open for reading at the same time.
//!
//! # Example
//!
//! ```no_run
//! use duplicate_cleaner::scanner::{hash_records, FileRecord, HashAlgorithm, HasherConfig};
//! use std::path::PathBuf;
//!
//! let mut records = vec![
//!     FileRecord::new(PathBuf::from("/a.bin"), 10),
//!     FileRecord::new(PathBuf::from("/b.bin"), 10),
//! ];
//! let config = HasherConfig::default()
//!     .with_io_threads(2)
//!     .with_algorithm(HashAlgorithm::Sha256);
//!
//! let stats = hash_records(&mut records, &config).unwrap();
//! println!("{} hashed, {} failed", stats.hashed_files, stats.failed_files);
//! ```

use std::fmt::LowerHex;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use md5::Md5;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::digest::Output;
use sha2::{Digest, Sha256, Sha512};

use super::{FileRecord, HashError};
use crate::progress::ProgressCallback;

/// Content digest used to compare files.
///
/// MD5 is the default: fast, and collisions between files on one disk are
/// not a practical concern for finding accidental copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// MD5 (128-bit)
    #[default]
    Md5,
    /// SHA-1 (160-bit)
    Sha1,
    /// SHA-256
    Sha256,
    /// SHA-512
    Sha512,
}

impl HashAlgorithm {
    /// All supported algorithms.
    pub const ALL: [HashAlgorithm; 4] = [Self::Md5, Self::Sha1, Self::Sha256, Self::Sha512];

    /// Look up an algorithm by case-insensitive name.
    ///
    /// Returns `None` for anything other than `md5`, `sha1`, `sha256` or `sha512`.
    #[must_use]
    pub fn parse_strict(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|algorithm| name.trim().eq_ignore_ascii_case(algorithm.name()))
    }

    /// Look up an algorithm by case-insensitive name, falling back to MD5.
    ///
    /// Unrecognized names select the default rather than failing; a warning
    /// is logged so the fallback does not go unnoticed.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self::parse_strict(name).unwrap_or_else(|| {
            log::warn!(
                "Unknown hash algorithm '{}', falling back to {}",
                name,
                Self::default()
            );
            Self::default()
        })
    }

    /// Canonical lowercase name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }

    /// Length of the hex-encoded digest.
    #[must_use]
    pub fn hex_len(self) -> usize {
        match self {
            Self::Md5 => 32,
            Self::Sha1 => 40,
            Self::Sha256 => 64,
            Self::Sha512 => 128,
        }
    }

    /// Digest everything `reader` yields and return it as lowercase hex.
    ///
    /// A new accumulator is created for every call.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised while reading.
    pub fn digest_reader<R: Read + ?Sized>(self, reader: &mut R) -> io::Result<String> {
        match self {
            Self::Md5 => digest_with::<Md5, R>(reader),
            Self::Sha1 => digest_with::<Sha1, R>(reader),
            Self::Sha256 => digest_with::<Sha256, R>(reader),
            Self::Sha512 => digest_with::<Sha512, R>(reader),
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn digest_with<D, R>(reader: &mut R) -> io::Result<String>
where
    D: Digest + Write,
    Output<D>: LowerHex,
    R: Read + ?Sized,
{
    let mut hasher = D::new();
    io::copy(reader, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Compute the digest of a file's full content.
///
/// The file handle is closed before this returns, on success and on error.
///
/// # Errors
///
/// Returns a [`HashError`] if the file cannot be opened or read.
pub fn hash_file(path: &Path, algorithm: HashAlgorithm) -> Result<String, HashError> {
    let mut file = File::open(path).map_err(|e| HashError::from_io(path.to_path_buf(), e))?;
    algorithm
        .digest_reader(&mut file)
        .map_err(|e| HashError::from_io(path.to_path_buf(), e))
}

/// Errors that prevent the hashing pool from running at all.
#[derive(thiserror::Error, Debug)]
pub enum PoolError {
    /// The concurrency bound was zero.
    #[error("concurrency must be at least 1, got {0}")]
    InvalidConcurrency(usize),

    /// The worker pool could not be created.
    #[error("failed to build hashing pool: {0}")]
    Build(#[from] rayon::ThreadPoolBuildError),
}

/// Configuration for the hashing phase.
#[derive(Clone)]
pub struct HasherConfig {
    /// Maximum number of files hashed (and open) at once.
    pub io_threads: usize,
    /// Digest to compute.
    pub algorithm: HashAlgorithm,
    /// Optional shutdown flag, checked before each file is opened.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for HasherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HasherConfig")
            .field("io_threads", &self.io_threads)
            .field("algorithm", &self.algorithm)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            io_threads: 10,
            algorithm: HashAlgorithm::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl HasherConfig {
    /// Set the concurrency bound. Zero is rejected by [`hash_records`].
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

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Statistics from the hashing phase.
#[derive(Debug, Clone, Default)]
pub struct HashStats {
    /// Records handed to the pool
    pub input_files: usize,
    /// Records that received a digest
    pub hashed_files: usize,
    /// Records that failed to hash
    pub failed_files: usize,
    /// Total bytes of successfully hashed files
    pub bytes_hashed: u64,
    /// Per-file failures, in completion order
    pub errors: Vec<HashError>,
    /// Whether some records were skipped because shutdown was requested
    pub interrupted: bool,
}

/// Hash every record in place on a pool of `config.io_threads` workers.
///
/// Each worker owns the record it is processing and writes its `hash`
/// field; failures leave `hash` as `None` and are collected into
/// [`HashStats::errors`] without stopping the other workers. The call
/// returns only once every record has been processed.
///
/// # Errors
///
/// Returns [`PoolError`] if `io_threads` is zero or the pool cannot be built.
/// Per-file failures are never returned as `Err`.
pub fn hash_records(
    records: &mut [FileRecord],
    config: &HasherConfig,
) -> Result<HashStats, PoolError> {
    if config.io_threads < 1 {
        return Err(PoolError::InvalidConcurrency(config.io_threads));
    }

    let mut stats = HashStats {
        input_files: records.len(),
        ..Default::default()
    };

    if records.is_empty() {
        log::debug!("Hashing: No files to process");
        return Ok(stats);
    }

    // Never more workers than records; the bound on open files still holds
    let workers = config.io_threads.min(records.len());
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("hasher-{i}"))
        .build()?;

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start("hashing", records.len());
    }

    log::info!(
        "Hashing {} files with {} ({} concurrent)",
        records.len(),
        config.algorithm,
        config.io_threads
    );

    let errors: Mutex<Vec<HashError>> = Mutex::new(Vec::new());
    // Held across the callback so reported counts only ever increase
    let completed: Mutex<usize> = Mutex::new(0);
    let interrupted = AtomicBool::new(false);

    pool.install(|| {
        records.par_iter_mut().for_each(|record| {
            if config.is_shutdown_requested() {
                interrupted.store(true, Ordering::SeqCst);
                return;
            }

            match hash_file(&record.path, config.algorithm) {
                Ok(digest) => {
                    log::trace!("Hashed {}: {}", record.path.display(), digest);
                    record.hash = Some(digest);
                    if let Some(ref callback) = config.progress_callback {
                        callback.on_item_completed(record.size);
                    }
                }
                Err(e) => {
                    log::warn!("Failed to hash {}: {}", record.path.display(), e);
                    errors
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(e);
                }
            }

            let mut done = completed.lock().unwrap_or_else(PoisonError::into_inner);
            *done += 1;
            if let Some(ref callback) = config.progress_callback {
                callback.on_progress(*done, record.path.to_string_lossy().as_ref());
            }
        });
    });

    stats.errors = errors.into_inner().unwrap_or_else(PoisonError::into_inner);
    stats.failed_files = stats.errors.len();
    stats.interrupted = interrupted.load(Ordering::SeqCst);
    for record in records.iter().filter(|r| r.is_hashed()) {
        stats.hashed_files += 1;
        stats.bytes_hashed += record.size;
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end("hashing");
    }

    log::info!(
        "Hashing complete: {} hashed, {} failed{}",
        stats.hashed_files,
        stats.failed_files,
        if stats.interrupted {
            " (interrupted)"
        } else {
            ""
        }
    );

    Ok(stats)
}
