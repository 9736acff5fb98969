//! Progress reporting utilities using indicatif.
//!
//! The engine phases report through the [`ProgressCallback`] trait:
//! listing and precompute fire per-file ticks, the comparison scheduler
//! fires one `(valid, found)` increment per completed task. [`Progress`]
//! renders these as a multi-bar terminal display; callbacks are advisory
//! and may be driven from multiple call sites.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Phase name for file discovery.
pub const PHASE_LISTING: &str = "listing";
/// Phase name for metadata precomputation.
pub const PHASE_PRECOMPUTE: &str = "precompute";
/// Phase name for the pairwise comparison sweep.
pub const PHASE_COMPARE: &str = "compare";

/// Progress callback for the duplicate-candidate pipeline.
///
/// All methods have no-op defaults so implementations can pick the
/// notifications they care about.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// `total` is the number of items the phase expects to process, or 0
    /// when unknown (listing).
    fn on_phase_start(&self, _phase: &str, _total: u64) {}

    /// Called with an increment of processed items during listing and
    /// precompute. Fires once per attempted file, success or not.
    fn on_tick(&self, _phase: &str, _delta: u64) {}

    /// Called once per completed comparison task with the number of valid
    /// (same-directory) comparisons it performed and the candidates found.
    fn on_compared(&self, _valid: u64, _found: u64) {}

    /// Called when a phase completes.
    fn on_phase_end(&self, _phase: &str) {}
}

/// No-op callback for callers that do not want progress output.
pub struct NullProgress;

impl ProgressCallback for NullProgress {}

/// Terminal progress display backed by indicatif.
///
/// Shows a spinner while listing files, a bar for precompute, and a bar
/// plus running candidate counter for the comparison sweep.
pub struct Progress {
    multi: MultiProgress,
    listing: Mutex<Option<ProgressBar>>,
    precompute: Mutex<Option<ProgressBar>>,
    compare: Mutex<Option<ProgressBar>>,
    found: AtomicU64,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// When `quiet` is true no bars are displayed.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            listing: Mutex::new(None),
            precompute: Mutex::new(None),
            compare: Mutex::new(None),
            found: AtomicU64::new(0),
            quiet,
        }
    }

    fn listing_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn precompute_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn compare_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.green/blue}] {pos}/{len} pairs ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn bar_slot(&self, phase: &str) -> Option<&Mutex<Option<ProgressBar>>> {
        match phase {
            PHASE_LISTING => Some(&self.listing),
            PHASE_PRECOMPUTE => Some(&self.precompute),
            PHASE_COMPARE => Some(&self.compare),
            _ => None,
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: u64) {
        if self.quiet {
            return;
        }

        match phase {
            PHASE_LISTING => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::listing_style());
                pb.set_message("Listing files");
                pb.enable_steady_tick(Duration::from_millis(100));
                *self.listing.lock().unwrap() = Some(pb);
            }
            PHASE_PRECOMPUTE => {
                let pb = self.multi.add(ProgressBar::new(total));
                pb.set_style(Self::precompute_style());
                pb.set_message("Reading metadata");
                *self.precompute.lock().unwrap() = Some(pb);
            }
            PHASE_COMPARE => {
                let pb = self.multi.add(ProgressBar::new(total));
                pb.set_style(Self::compare_style());
                pb.set_message("0 candidates");
                *self.compare.lock().unwrap() = Some(pb);
            }
            _ => {}
        }
    }

    fn on_tick(&self, phase: &str, delta: u64) {
        if self.quiet {
            return;
        }
        if let Some(slot) = self.bar_slot(phase) {
            if let Some(ref pb) = *slot.lock().unwrap() {
                pb.inc(delta);
            }
        }
    }

    fn on_compared(&self, valid: u64, found: u64) {
        if self.quiet {
            return;
        }
        let total_found = self.found.fetch_add(found, Ordering::Relaxed) + found;
        if let Some(ref pb) = *self.compare.lock().unwrap() {
            pb.inc(valid);
            pb.set_message(format!("{} candidates", total_found));
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }
        if let Some(slot) = self.bar_slot(phase) {
            if let Some(pb) = slot.lock().unwrap().take() {
                match phase {
                    PHASE_LISTING => pb.finish_with_message("Listing complete"),
                    PHASE_PRECOMPUTE => pb.finish_with_message("Metadata complete"),
                    PHASE_COMPARE => {
                        let found = self.found.load(Ordering::Relaxed);
                        pb.finish_with_message(format!("{} candidates", found));
                    }
                    _ => pb.finish(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_progress_accepts_all_calls() {
        let progress = NullProgress;
        progress.on_phase_start(PHASE_LISTING, 0);
        progress.on_tick(PHASE_LISTING, 1);
        progress.on_compared(10, 2);
        progress.on_phase_end(PHASE_LISTING);
    }

    #[test]
    fn test_quiet_progress_ignores_phases() {
        let progress = Progress::new(true);
        progress.on_phase_start(PHASE_COMPARE, 100);
        progress.on_compared(50, 1);
        progress.on_phase_end(PHASE_COMPARE);
        assert!(progress.compare.lock().unwrap().is_none());
    }

    #[test]
    fn test_unknown_phase_is_ignored() {
        let progress = Progress::new(false);
        progress.on_phase_start("mystery", 10);
        progress.on_tick("mystery", 1);
        progress.on_phase_end("mystery");
    }
}
