//! Command-line interface definitions for duplicate-cleaner.
//!
//! Two modes share one flat flag set:
//!
//! ```bash
//! # Find duplicates under two roots, write them to dups.txt (and stdout)
//! duplicate-cleaner -l -o dups.txt ~/Pictures /mnt/backup/Pictures
//!
//! # ...edit dups.txt, removing the lines of the copies to keep...
//!
//! # Delete every path still listed
//! duplicate-cleaner -c dups.txt
//! ```
//!
//! Mode selection and value checks happen in [`crate::config::Plan::resolve`],
//! not in clap, so they report the same errors whether a value came from a
//! flag, the environment, or a config file.

use clap::Parser;
use std::path::PathBuf;

/// Find byte-identical files, then delete a hand-curated list of copies.
///
/// List mode (-l) walks the given directories and writes every group of
/// identical files to a list file. Clean mode (-c) reads one or more list
/// files and permanently deletes every path they still contain.
#[derive(Debug, Default, Parser)]
#[command(name = "duplicate-cleaner")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// List duplicate files under PATHS
    #[arg(short, long)]
    pub list: bool,

    /// Delete every path in the list files given as PATHS
    #[arg(short, long)]
    pub clean: bool,

    /// Digest used to compare files: md5, sha1, sha256 or sha512 [default: md5]
    ///
    /// Unknown names fall back to md5 with a warning.
    #[arg(short = 'f', long, value_name = "NAME")]
    pub hash: Option<String>,

    /// File the duplicate list is written to [default: list.txt]
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Maximum number of files hashed at the same time [default: 10]
    #[arg(short = 'n', long, value_name = "N", allow_negative_numbers = true)]
    pub count: Option<i64>,

    /// Read settings from this TOML file instead of the default location
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Fail the list pass if any file cannot be hashed
    #[arg(long)]
    pub strict: bool,

    /// Print fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,

    /// Print the resolved settings as TOML and exit
    #[arg(long)]
    pub print_config: bool,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress bars, the console copy of the list, and all logging except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Directories to scan (list mode) or list files to read (clean mode)
    #[arg(value_name = "PATHS")]
    pub paths: Vec<PathBuf>,
}
