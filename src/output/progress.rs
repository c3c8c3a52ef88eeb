//! Progress reporting
//!
//! The aggregator reports page-by-page progress against GitHub's displayed
//! total through this sink. Events are fire-and-forget; nothing in the
//! pipeline consumes a return value from them.

use indicatif::{ProgressBar, ProgressStyle};

/// Fire-and-forget progress events emitted during pagination
pub trait ProgressSink {
    /// Called once with the expected total before the first page is parsed.
    /// The total is GitHub's display estimate, not authoritative.
    fn start(&mut self, total: u64);

    /// Called after each page with the clamped running row count
    fn update(&mut self, current: u64);

    /// Called once when pagination ends
    fn stop(&mut self);
}

/// Sink that ignores all events; used in JSON/quiet modes and by embedders
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn start(&mut self, _total: u64) {}
    fn update(&mut self, _current: u64) {}
    fn stop(&mut self) {}
}

/// Terminal progress bar backed by indicatif
#[derive(Default)]
pub struct BarProgress {
    bar: Option<ProgressBar>,
}

impl BarProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressSink for BarProgress {
    fn start(&mut self, total: u64) {
        // A zero estimate gives the bar nothing to scale against
        if total == 0 {
            return;
        }
        let bar = ProgressBar::new(total);
        let style = ProgressStyle::with_template(
            "Progress |{bar:40}| {percent}% | {pos}/{len} Dependencies",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█░ ");
        bar.set_style(style);
        self.bar = Some(bar);
    }

    fn update(&mut self, current: u64) {
        if let Some(bar) = &self.bar {
            bar.set_position(current);
        }
    }

    fn stop(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish();
        }
    }
}
