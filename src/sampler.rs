//! Scroll position sampling.
//!
//! Converts raw document/viewport metrics into a progress percent in
//! `[0, 100]`. Degenerate geometry (a page no taller than its viewport) and
//! non-finite metrics map to 0 rather than an error.

use log::trace;

use crate::reactive::WriteSignal;

/// Scroll metrics as reported by the host at the time of an event.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollMetrics {
    /// Distance scrolled from the top of the document.
    pub scroll_top: f64,
    /// Full scrollable height of the document.
    pub document_height: f64,
    /// Height of the visible viewport.
    pub viewport_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f64, document_height: f64, viewport_height: f64) -> Self {
        Self {
            scroll_top,
            document_height,
            viewport_height,
        }
    }

    pub fn max_scrollable(&self) -> f64 {
        self.document_height - self.viewport_height
    }
}

/// Progress percent for `metrics`, clamped to `[0, 100]`.
pub fn sample_progress(metrics: &ScrollMetrics) -> f64 {
    let max_scrollable = metrics.max_scrollable();
    // `!(x > 0)` also rejects NaN
    if !(max_scrollable > 0.0) {
        return 0.0;
    }
    let percent = 100.0 * metrics.scroll_top / max_scrollable;
    if percent.is_nan() {
        return 0.0;
    }
    percent.clamp(0.0, 100.0)
}

/// Sole writer of the global progress target.
pub struct ProgressSampler {
    target: WriteSignal<f64>,
}

impl ProgressSampler {
    pub fn new(target: WriteSignal<f64>) -> Self {
        Self { target }
    }

    /// Sample `metrics` and store the result as the new target.
    pub fn sample(&self, metrics: &ScrollMetrics) -> f64 {
        let percent = sample_progress(metrics);
        if self.target.set(percent) {
            trace!("scroll target -> {:.3}%", percent);
        }
        percent
    }
}
