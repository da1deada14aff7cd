//! File actions module.
//!
//! The only action is permanent deletion of a curated path list, see
//! [`delete::clean_paths`]. There is no trash and no undo.

pub mod delete;

pub use delete::{clean_paths, delete_file, DeleteError, DeleteFailure, DeletionOutcome};
