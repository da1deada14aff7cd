//! Size and content-hash grouping.
//!
//! # Overview
//!
//! Grouping happens twice in the detection pass:
//!
//! 1. [`group_by_size`] drops every file whose size is unique. Comparing
//!    sizes costs nothing, hashing costs a full read, so only files that
//!    share a size with at least one other file are ever hashed.
//! 2. [`group_by_hash`] drops every file whose digest is unique (and every
//!    file that failed to hash). What is left is the [`DuplicateGroups`]
//!    result.
//!
//! Neither stage preserves any order: groups come out of a `HashMap`, and
//! files inside a hash group appear in whatever order hashing finished.
//!
//! # Example
//!
//! ```
//! use duplicate_cleaner::duplicates::{group_by_hash, group_by_size};
//! use duplicate_cleaner::scanner::FileRecord;
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileRecord::new(PathBuf::from("/file1.txt"), 1024),
//!     FileRecord::new(PathBuf::from("/file2.txt"), 1024),
//!     FileRecord::new(PathBuf::from("/file3.txt"), 2048),
//! ];
//!
//! let (candidates, stats) = group_by_size(files);
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(candidates.len(), 2);  // The two 1024-byte files
//!
//! // Nothing hashed yet, so nothing can be a confirmed duplicate
//! assert!(group_by_hash(candidates).is_empty());
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use crate::scanner::FileRecord;

/// Confirmed duplicate groups, keyed by content digest.
///
/// Every group holds at least two records, every record has a non-empty
/// hash and a size above zero, and no record appears in two groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateGroups {
    groups: HashMap<String, Vec<FileRecord>>,
}

impl DuplicateGroups {
    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Check if no duplicates were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Records sharing `hash`, if that digest formed a group.
    #[must_use]
    pub fn get(&self, hash: &str) -> Option<&[FileRecord]> {
        self.groups.get(hash).map(Vec::as_slice)
    }

    /// Iterate over `(hash, records)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FileRecord])> {
        self.groups
            .iter()
            .map(|(hash, files)| (hash.as_str(), files.as_slice()))
    }

    /// Total number of files across all groups.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Number of redundant copies (every file beyond the first of each group).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.groups
            .values()
            .map(|files| files.len().saturating_sub(1))
            .sum()
    }

    /// Bytes that would be reclaimed by keeping one copy per group.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.groups
            .values()
            .map(|files| {
                let size = files.first().map_or(0, |f| f.size);
                size * files.len().saturating_sub(1) as u64
            })
            .sum()
    }

    /// Every path in every group.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.groups
            .values()
            .flatten()
            .map(|f| f.path.clone())
            .collect()
    }
}

/// Statistics from the size grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of distinct file sizes seen
    pub unique_sizes: usize,
    /// Number of files that could be duplicates (in groups of 2+)
    pub potential_duplicates: usize,
    /// Number of files eliminated as unique (singleton groups)
    pub eliminated_unique: usize,
    /// Number of size groups with 2+ files
    pub duplicate_groups: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Keep only the files whose size is shared by at least one other file.
///
/// Returns the surviving records (partitions concatenated in no particular
/// order) together with grouping statistics. Empty input yields empty output.
///
/// # Example
///
/// ```
/// use duplicate_cleaner::scanner::FileRecord;
/// use duplicate_cleaner::duplicates::group_by_size;
/// use std::path::PathBuf;
///
/// let files = vec![
///     FileRecord::new(PathBuf::from("/a.txt"), 100),
///     FileRecord::new(PathBuf::from("/b.txt"), 100),
///     FileRecord::new(PathBuf::from("/c.txt"), 200),
/// ];
///
/// let (candidates, stats) = group_by_size(files);
///
/// assert_eq!(candidates.len(), 2);
/// assert!(candidates.iter().all(|f| f.size == 100));
/// assert_eq!(stats.eliminated_unique, 1);  // The 200-byte file
/// ```
#[must_use]
pub fn group_by_size(
    files: impl IntoIterator<Item = FileRecord>,
) -> (Vec<FileRecord>, GroupingStats) {
    let mut by_size: HashMap<u64, Vec<FileRecord>> = HashMap::new();
    let mut stats = GroupingStats::default();

    for file in files {
        stats.total_files += 1;
        stats.total_size += file.size;
        by_size.entry(file.size).or_default().push(file);
    }

    stats.unique_sizes = by_size.len();

    let mut candidates = Vec::new();
    for (size, files) in by_size {
        if files.len() == 1 {
            stats.eliminated_unique += 1;
            log::trace!("Eliminated unique size {}: {}", size, files[0].path.display());
        } else {
            stats.potential_duplicates += files.len();
            stats.duplicate_groups += 1;
            log::debug!(
                "Size group {} bytes: {} potential duplicates",
                size,
                files.len()
            );
            candidates.extend(files);
        }
    }

    log::info!(
        "Size grouping: {} files, {} sizes ({} shared), {} candidates ({:.1}% eliminated)",
        stats.total_files,
        stats.unique_sizes,
        stats.duplicate_groups,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (candidates, stats)
}

/// Partition hashed records by digest and keep the groups of two or more.
///
/// Records without a hash (hashing failed or was skipped) are ignored. If no
/// record has a hash the result is empty.
#[must_use]
pub fn group_by_hash(files: impl IntoIterator<Item = FileRecord>) -> DuplicateGroups {
    let mut by_hash: HashMap<String, Vec<FileRecord>> = HashMap::new();

    for file in files {
        if !file.is_hashed() {
            log::trace!("Ignoring unhashed file: {}", file.path.display());
            continue;
        }
        if let Some(hash) = file.hash.clone() {
            by_hash.entry(hash).or_default().push(file);
        }
    }

    by_hash.retain(|hash, files| {
        if files.len() > 1 {
            log::debug!("Duplicate group {}: {} files", hash, files.len());
            true
        } else {
            false
        }
    });

    DuplicateGroups { groups: by_hash }
}
