//! Progress reporting for archive downloads.
//!
//! Wraps `indicatif` with the updater's styling. A bar is shown when the
//! server announces a content length, a byte-counting spinner otherwise.
//! Progress output is suppressed with `--no-progress` or by setting the
//! `ROMBOT_UPDATER_NO_PROGRESS` environment variable.

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};
use std::time::Duration;

/// Environment variable that hides every progress indicator.
pub const NO_PROGRESS_ENV: &str = "ROMBOT_UPDATER_NO_PROGRESS";

fn is_progress_disabled() -> bool {
    std::env::var(NO_PROGRESS_ENV).is_ok()
}

/// A download progress indicator.
#[derive(Clone)]
pub struct ProgressBar {
    inner: IndicatifBar,
}

impl ProgressBar {
    /// Create a download indicator for a body of `total` bytes, if known.
    ///
    /// When `enabled` is false or progress is disabled through the
    /// environment the indicator is hidden and every call is a no-op.
    #[must_use]
    pub fn download(total: Option<u64>, enabled: bool) -> Self {
        if !enabled || is_progress_disabled() {
            return Self::hidden();
        }

        let bar = match total {
            Some(len) => {
                let bar = IndicatifBar::new(len);
                bar.set_style(download_style());
                bar
            }
            None => {
                let bar = IndicatifBar::new_spinner();
                bar.set_style(spinner_style());
                bar.enable_steady_tick(Duration::from_millis(100));
                bar
            }
        };

        Self {
            inner: bar,
        }
    }

    /// A progress bar that never draws anything.
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            inner: IndicatifBar::hidden(),
        }
    }

    pub fn set_prefix(&self, prefix: impl Into<String>) {
        self.inner.set_prefix(prefix.into());
    }

    pub fn inc(&self, delta: u64) {
        self.inner.inc(delta);
    }

    #[must_use]
    pub fn position(&self) -> u64 {
        self.inner.position()
    }

    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.inner.is_hidden()
    }
}

fn download_style() -> IndicatifStyle {
    IndicatifStyle::default_bar()
        .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
        .unwrap_or_else(|_| IndicatifStyle::default_bar())
        .progress_chars("━╸━")
}

fn spinner_style() -> IndicatifStyle {
    IndicatifStyle::default_spinner()
        .template("{prefix:.bold.cyan} {spinner:.cyan} {bytes} ({bytes_per_sec})")
        .unwrap_or_else(|_| IndicatifStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
}
