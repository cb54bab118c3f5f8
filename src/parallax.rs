//! Per-section parallax offsets.
//!
//! Each mounted section splits into two halves sharing one
//! [`ParallaxTarget`]: a [`ParallaxTracker`] fed on every scroll event with the
//! section's measured geometry, and a [`ParallaxAnimator`] that relaxes the
//! displayed offset toward the target once per frame.
//!
//! The target ramps in quadratically away from the viewport center and is
//! forced to zero right at it, so a section coming to rest in the middle of
//! the screen settles flat. Near the center the relaxation also runs faster.

use log::trace;

use crate::animation::{RelaxState, Settle};
use crate::config::{ParallaxConfig, Tuning};
use crate::reactive::{create_signal, ChangeFlags, ReadSignal, WriteSignal};
use crate::scheduler::{Animator, FrameAction};

/// Vertical extent of a section, relative to the top of the viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SectionRect {
    pub top: f64,
    pub height: f64,
}

impl SectionRect {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn center(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// Signed displacement of the section center from the viewport center, in
/// viewport heights. Positive below center.
pub fn relative_position(rect: &SectionRect, viewport_height: f64) -> f64 {
    if !(viewport_height > 0.0) {
        return 0.0;
    }
    let rp = (rect.center() - viewport_height / 2.0) / viewport_height;
    if rp.is_finite() {
        rp
    } else {
        0.0
    }
}

pub fn target_offset(relative_position: f64, config: &ParallaxConfig) -> f64 {
    let distance = relative_position.abs();
    if distance < config.center_snap {
        return 0.0;
    }
    let factor = if distance > config.ramp_extent {
        1.0
    } else {
        (distance / config.ramp_extent).powi(2)
    };
    relative_position * config.max_offset * factor
}

/// Scroll-side state of a section.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ParallaxTarget {
    pub target_offset: f64,
    pub last_relative_position: f64,
}

impl ParallaxTarget {
    pub fn from_relative_position(relative_position: f64, config: &ParallaxConfig) -> Self {
        Self {
            target_offset: target_offset(relative_position, config),
            last_relative_position: relative_position,
        }
    }

    pub fn measure(rect: &SectionRect, viewport_height: f64, config: &ParallaxConfig) -> Self {
        Self::from_relative_position(relative_position(rect, viewport_height), config)
    }
}

/// Sole writer of a section's target.
pub struct ParallaxTracker {
    target: WriteSignal<ParallaxTarget>,
    config: ParallaxConfig,
}

impl ParallaxTracker {
    /// Recompute the target from fresh geometry.
    pub fn on_scroll(&self, rect: &SectionRect, viewport_height: f64) -> ParallaxTarget {
        let target = ParallaxTarget::measure(rect, viewport_height, &self.config);
        self.target.set(target);
        target
    }

    pub fn target(&self) -> ParallaxTarget {
        self.target.get()
    }
}

/// Frame-side relaxation of a section's offset.
pub struct ParallaxAnimator {
    name: String,
    target: ReadSignal<ParallaxTarget>,
    state: RelaxState,
    config: ParallaxConfig,
    tuning: ReadSignal<Tuning>,
    offset: WriteSignal<f64>,
}

impl ParallaxAnimator {
    pub fn current(&self) -> f64 {
        self.state.current()
    }

    /// Easing for the current frame: faster while the section sits near the
    /// viewport center.
    fn easing(&self, last_relative_position: f64) -> f64 {
        if last_relative_position.abs() < self.config.near_center {
            self.config.near_easing
        } else {
            self.config.far_easing
        }
    }

    pub fn step(&mut self) -> ChangeFlags {
        let target = self.target.get();
        let easing = self.easing(target.last_relative_position);
        self.state.advance(target.target_offset, easing);

        let variation = self.tuning.with(|t| t.variation);
        let mut changes = ChangeFlags::empty();
        changes.mark(ChangeFlags::OFFSET, self.offset.set(self.state.current() * variation));
        changes
    }
}

impl Animator for ParallaxAnimator {
    fn name(&self) -> &str {
        &self.name
    }

    fn frame(&mut self) -> FrameAction {
        if !self.step().is_empty() {
            trace!("{}: offset {:.3}", self.name, self.state.current());
        }
        FrameAction::Continue
    }
}

/// Build the two halves of a section plus the reader of its published offset.
///
/// The displayed offset starts at zero and eases toward `initial`.
pub fn parallax_section(
    name: impl Into<String>,
    initial: ParallaxTarget,
    config: ParallaxConfig,
    tuning: ReadSignal<Tuning>,
) -> (ParallaxTracker, ParallaxAnimator, ReadSignal<f64>) {
    let (target_r, target_w) = create_signal(initial).split();
    let (offset_r, offset_w) = create_signal(0.0).split();
    let tracker = ParallaxTracker {
        target: target_w,
        config,
    };
    let animator = ParallaxAnimator {
        name: name.into(),
        target: target_r,
        state: RelaxState::new(0.0, config.epsilon, Settle::Hold),
        config,
        tuning,
        offset: offset_w,
    };
    (tracker, animator, offset_r)
}
