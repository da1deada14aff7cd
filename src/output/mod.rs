//! Output formats for detection results.
//!
//! There is a single format: the editable duplicate list written by the
//! detection pass and read back by the cleanup pass.
//!
//! # Example
//!
//! ```no_run
//! use duplicate_cleaner::duplicates::DuplicateFinder;
//! use duplicate_cleaner::output::save_list;
//! use std::path::{Path, PathBuf};
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (groups, _summary) = finder.find_duplicates(&[PathBuf::from(".")]).unwrap();
//!
//! let mut stdout = std::io::stdout();
//! save_list(Path::new("list.txt"), &groups, Some(&mut stdout)).unwrap();
//! ```

pub mod list;

pub use list::{parse_list, read_delete_lists, save_list, write_groups, ListError, GROUP_DELIMITER};
