//! Ctrl+C handling.
//!
//! Pressing Ctrl+C sets a shared `AtomicBool`. The walker checks it
//! between entries and each hashing task checks it before opening its
//! file, so a detection pass winds down quickly and reports
//! `FinderError::Interrupted` (exit code 130). A cleanup pass ignores the
//! flag and finishes its list.
//!
//! ```rust,no_run
//! use duplicate_cleaner::duplicates::FinderConfig;
//! use duplicate_cleaner::signal::install_handler;
//!
//! let handler = install_handler().expect("Failed to install signal handler");
//! let config = FinderConfig::default().with_shutdown_flag(handler.get_flag());
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Shared shutdown flag.
///
/// Clones share the same flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// Create a handler with no shutdown requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The flag to hand to the walker and the hashing pool.
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Clear the flag.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_HANDLER: OnceLock<ShutdownHandler> = OnceLock::new();

/// Install the process-wide Ctrl+C handler and return its flag.
///
/// The hook can only be registered once per process. Later calls (for
/// example from several tests driving `run_app`) return the already
/// registered handler with its flag cleared.
///
/// # Errors
///
/// Returns [`SignalError`] if the hook cannot be registered on first use.
pub fn install_handler() -> Result<ShutdownHandler, SignalError> {
    if let Some(handler) = GLOBAL_HANDLER.get() {
        handler.reset();
        return Ok(handler.clone());
    }

    let handler = GLOBAL_HANDLER.get_or_init(ShutdownHandler::new).clone();
    let flag = handler.get_flag();

    match ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
        let _ = writeln!(std::io::stderr(), "\nInterrupted. Stopping...");
        log::info!("Shutdown signal received");
    }) {
        Ok(()) => Ok(handler),
        Err(ctrlc::Error::MultipleHandlers) => {
            log::debug!("Ctrl+C handler already registered, using unhooked handler");
            Ok(handler)
        }
        Err(e) => Err(e.into()),
    }
}
