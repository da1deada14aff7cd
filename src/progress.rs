//! Progress reporting utilities using indicatif.
//!
//! The detection and cleanup passes report progress through the
//! [`ProgressCallback`] trait. [`Progress`] draws terminal spinners and bars
//! with indicatif; tests and library callers can pass their own sink or none
//! at all. A sink never influences the result of a pass.
//!
//! # Phases
//!
//! | Phase      | Total known | Reported by |
//! |------------|-------------|-------------|
//! | `walking`  | no          | walker, one tick per visited entry |
//! | `grouping` | yes         | finder, once per grouping stage |
//! | `hashing`  | yes         | hashing pool, one tick per file |
//! | `cleaning` | yes         | cleaner, one tick per path |

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Progress callback for detection and cleanup phases.
///
/// Implement this trait to receive progress updates. Implementations must be
/// cheap and must not panic: they are called from hashing worker threads.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase (e.g., "walking", "hashing")
    /// * `total` - Total number of items to process, `0` if unknown
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called for each item processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Number of items processed so far (1-based, increasing)
    /// * `path` - Path being processed
    fn on_progress(&self, current: usize, path: &str);

    /// Called when an item has been hashed, providing its size.
    fn on_item_completed(&self, _bytes: u64) {}

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);

    /// Called with a status line for the active phase, or between phases.
    fn on_message(&self, _message: &str) {}
}

/// Progress reporter using indicatif.
///
/// Keeps one bar per phase; only the most recently started phase receives
/// `on_progress` updates.
pub struct Progress {
    multi: MultiProgress,
    active: Mutex<Option<(String, ProgressBar)>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no progress bars will be displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use duplicate_cleaner::progress::Progress;
    ///
    /// let progress = Progress::new(false);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        let multi = if quiet {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::stderr())
        };
        Self {
            multi,
            active: Mutex::new(None),
            quiet,
        }
    }

    fn active(&self) -> MutexGuard<'_, Option<(String, ProgressBar)>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Spinner style for phases with an unknown total.
    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} entries")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    /// Bar style for phases with a known total.
    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn phase_label(phase: &str) -> String {
        match phase {
            "walking" => "Walking directories".to_string(),
            "grouping" => "Grouping".to_string(),
            "hashing" => "Hashing".to_string(),
            "cleaning" => "Cleaning".to_string(),
            other => other.to_string(),
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        let pb = if total == 0 {
            let pb = self.multi.add(ProgressBar::new_spinner());
            pb.set_style(Self::spinner_style());
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        } else {
            let pb = self.multi.add(ProgressBar::new(total as u64));
            pb.set_style(Self::bar_style());
            pb
        };
        pb.set_message(Self::phase_label(phase));

        if let Some((_, previous)) = self.active().replace((phase.to_string(), pb)) {
            previous.finish();
        }
    }

    fn on_progress(&self, current: usize, path: &str) {
        if self.quiet {
            return;
        }

        if let Some((ref phase, ref pb)) = *self.active() {
            pb.set_position(current as u64);
            pb.set_message(format!(
                "{}: {}",
                Self::phase_label(phase),
                truncate_path(path, 30)
            ));
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }

        let mut active = self.active();
        if active.as_ref().is_some_and(|(name, _)| name == phase) {
            if let Some((_, pb)) = active.take() {
                pb.finish_with_message(format!("{} complete", Self::phase_label(phase)));
            }
        }
    }

    fn on_message(&self, message: &str) {
        if self.quiet {
            return;
        }

        match *self.active() {
            Some((_, ref pb)) => pb.set_message(message.to_string()),
            None => {
                let _ = self.multi.println(message);
            }
        }
    }
}

/// Truncate a path for display in the progress bar.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = std::path::Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let name_len = file_name.chars().count();
    if name_len >= max_len {
        let tail: String = file_name.chars().skip(name_len - (max_len - 3)).collect();
        return format!("...{tail}");
    }

    format!(".../{file_name}")
}
