//! The global progress smoother.
//!
//! Once started it runs every frame for as long as the scene lives, whether or
//! not the scroll target moved: each frame relaxes the displayed percent
//! toward the sampled target and republishes progress, color and the active
//! section index. Publishing is deduplicated by the signals themselves.

use std::sync::Arc;
use std::time::Instant;

use log::trace;

use crate::animation::{RelaxState, Settle};
use crate::color::{BreakpointTable, Rgb};
use crate::config::{SmoothingConfig, Tuning};
use crate::reactive::{create_signal, ChangeFlags, ReadSignal, WriteSignal};
use crate::scheduler::{Animator, FrameAction};
use crate::stats::FrameStats;

/// Read side of everything the smoother publishes.
#[derive(Clone)]
pub struct Published {
    /// Smoothed progress as a fraction in `[0, 1]`.
    pub progress: ReadSignal<f64>,
    /// Smoothed progress in `[0, 100]`.
    pub percent: ReadSignal<f64>,
    /// Breakpoint color at the smoothed percent, after brightness.
    pub color: ReadSignal<Rgb>,
    /// Breakpoint nearest to the smoothed percent.
    pub section_index: ReadSignal<usize>,
    pub fps: ReadSignal<u32>,
}

struct Outputs {
    progress: WriteSignal<f64>,
    percent: WriteSignal<f64>,
    color: WriteSignal<Rgb>,
    section_index: WriteSignal<usize>,
    fps: WriteSignal<u32>,
}

pub struct ProgressSmoother {
    target: ReadSignal<f64>,
    state: RelaxState,
    easing: f64,
    table: Arc<BreakpointTable>,
    tuning: ReadSignal<Tuning>,
    outputs: Outputs,
    stats: FrameStats,
}

impl ProgressSmoother {
    /// Build a smoother reading `target` and return it with its outputs.
    ///
    /// The displayed value starts at 0 so the first frames ease in from the
    /// top of the page, and the initial outputs are published immediately.
    pub fn new(
        target: ReadSignal<f64>,
        smoothing: &SmoothingConfig,
        table: Arc<BreakpointTable>,
        tuning: ReadSignal<Tuning>,
    ) -> (Self, Published) {
        let brightness = tuning.with(|t| t.brightness);
        let stats = FrameStats::new();

        let (progress_r, progress) = create_signal(0.0).split();
        let (percent_r, percent) = create_signal(0.0).split();
        let (color_r, color) = create_signal(table.color_at(0.0).scaled(brightness)).split();
        let (section_index_r, section_index) = create_signal(table.nearest_index(0.0)).split();
        let (fps_r, fps) = create_signal(stats.fps()).split();

        let smoother = Self {
            target,
            state: RelaxState::new(0.0, smoothing.snap_epsilon, Settle::Snap),
            easing: smoothing.easing,
            table,
            tuning,
            outputs: Outputs {
                progress,
                percent,
                color,
                section_index,
                fps,
            },
            stats,
        };
        let published = Published {
            progress: progress_r,
            percent: percent_r,
            color: color_r,
            section_index: section_index_r,
            fps: fps_r,
        };
        (smoother, published)
    }

    pub fn current(&self) -> f64 {
        self.state.current()
    }

    /// Relax one step and publish. Returns which outputs changed.
    pub fn step(&mut self) -> ChangeFlags {
        let target = self.target.get();
        self.state.advance(target, self.easing);
        let current = self.state.current();

        let mut changes = ChangeFlags::empty();
        let percent_changed = self.outputs.percent.set(current);
        let progress_changed = self.outputs.progress.set(current / 100.0);
        changes.mark(ChangeFlags::PROGRESS, percent_changed || progress_changed);

        // Brightness may change while progress is settled, so color is always
        // recomputed.
        let brightness = self.tuning.with(|t| t.brightness);
        let color = self.table.color_at(current).scaled(brightness);
        changes.mark(ChangeFlags::COLOR, self.outputs.color.set(color));
        changes.mark(
            ChangeFlags::SECTION_INDEX,
            self.outputs
                .section_index
                .set(self.table.nearest_index(current)),
        );
        changes
    }
}

impl Animator for ProgressSmoother {
    fn name(&self) -> &str {
        "progress"
    }

    fn frame(&mut self) -> FrameAction {
        let changes = self.step();
        if let Some(fps) = self.stats.record(Instant::now()) {
            self.outputs.fps.set(fps);
        }
        if !changes.is_empty() {
            trace!("progress {:.3}% -> {:?}", self.state.current(), changes);
        }
        FrameAction::Continue
    }
}
