//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (cheap pre-filter)
//! - Content-hash grouping (authoritative classification)
//! - The end-to-end detection pass ([`DuplicateFinder`])

pub mod finder;
pub mod groups;

pub use finder::{DuplicateFinder, FinderConfig, FinderError, ScanSummary};
pub use groups::{group_by_hash, group_by_size, DuplicateGroups, GroupingStats};
