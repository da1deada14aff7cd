//! duplicate-cleaner - find byte-identical files and delete a curated list of copies.
//!
//! A list pass walks one or more roots, groups files by size and then by
//! content digest, and writes the duplicate groups to an editable text file.
//! After the user removes the lines of the copies to keep, a clean pass
//! deletes every path still listed.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::actions::clean_paths;
use crate::cli::Cli;
use crate::config::{Mode, Plan, Settings};
use crate::duplicates::{DuplicateFinder, FinderConfig};
use crate::error::ExitCode;
use crate::output::{read_delete_lists, save_list, ListError};
use crate::progress::{Progress, ProgressCallback};
use crate::signal::install_handler;

/// Run the application for parsed command-line arguments.
///
/// Logging is not initialized here; the binary does that first.
///
/// # Errors
///
/// Returns an error for anything fatal: invalid configuration, an
/// unreadable root, a malformed list file, an interrupted pass, or strict
/// mode hash failures. Per-item failures are reported on stderr and mapped
/// to [`ExitCode::PartialSuccess`] instead.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    if cli.print_config {
        let settings = Settings::load(&cli).context("invalid configuration")?;
        print!("{}", settings.to_toml().context("cannot render settings")?);
        return Ok(ExitCode::Success);
    }

    let plan = Plan::resolve(&cli).context("invalid configuration")?;
    log::debug!("Resolved plan: {:?}", plan);

    let progress: Arc<dyn ProgressCallback> = Arc::new(Progress::new(plan.quiet));

    match plan.mode {
        Mode::List => run_list(&plan, progress),
        Mode::Clean => run_clean(&plan, progress.as_ref()),
    }
}

fn run_list(plan: &Plan, progress: Arc<dyn ProgressCallback>) -> Result<ExitCode> {
    let handler = install_handler()?;

    let config = FinderConfig::default()
        .with_io_threads(plan.io_threads)
        .with_algorithm(plan.algorithm)
        .with_strict(plan.strict)
        .with_shutdown_flag(handler.get_flag())
        .with_progress_callback(progress);

    let (groups, summary) = DuplicateFinder::new(config)
        .find_duplicates(&plan.paths)
        .context("detection pass failed")?;

    for err in &summary.hash_errors {
        eprintln!("warning: {err}");
    }
    let partial = summary.is_partial();

    let mut stdout = io::stdout().lock();
    let mirror: Option<&mut dyn Write> = if plan.quiet { None } else { Some(&mut stdout) };

    match save_list(&plan.output, &groups, mirror) {
        Ok(()) => {}
        Err(ListError::NoDuplicates) => {
            eprintln!("No duplicates found ({} files scanned)", summary.total_files);
            return Ok(if partial {
                ExitCode::PartialSuccess
            } else {
                ExitCode::NoDuplicates
            });
        }
        Err(e) => return Err(e.into()),
    }

    if !plan.quiet {
        eprintln!(
            "{} files scanned, {} share one of {} sizes, {} hashed ({}) in {:.2?}",
            summary.total_files,
            summary.total_files - summary.eliminated_by_size,
            summary.shared_sizes,
            summary.hashed_files,
            summary.bytes_hashed_display(),
            summary.scan_duration
        );
        eprintln!(
            "{} duplicate groups, {} redundant files, {} reclaimable",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display()
        );
        eprintln!("List written to {}", plan.output.display());
    }
    if partial {
        eprintln!(
            "{} file(s) could not be hashed and are not listed",
            summary.hash_errors.len()
        );
        return Ok(ExitCode::PartialSuccess);
    }

    Ok(ExitCode::Success)
}

fn run_clean(plan: &Plan, progress: &dyn ProgressCallback) -> Result<ExitCode> {
    let paths = read_delete_lists(&plan.paths).context("cannot read deletion list")?;
    log::info!("Cleaning {} paths from {} list(s)", paths.len(), plan.paths.len());

    let outcome = clean_paths(&paths, Some(progress));

    for failure in &outcome.failures {
        eprintln!("error: {}", failure.error);
    }
    println!("{} files cleaned", outcome.succeeded);

    if outcome.all_succeeded() {
        Ok(ExitCode::Success)
    } else {
        Ok(ExitCode::PartialSuccess)
    }
}
