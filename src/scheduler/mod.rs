//! Independently scheduled per-frame tasks.
//!
//! Every continuously running process (the global progress smoother and one
//! parallax relaxation per mounted section) is an [`Animator`]: a small state
//! object whose [`Animator::frame`] is called once per display frame. A
//! [`FrameScheduler`] owns the animators it runs and hands back an
//! [`AnimatorHandle`] for each.
//!
//! Cancellation is structural. Every handle carries a [`CancelToken`] that is
//! checked before each frame, so a cancelled animator never runs again, and
//! dropping the handle cancels it. [`FrameScheduler::cancel`] additionally
//! drops the animator's state synchronously.

mod event_loop;
mod manual;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

pub use event_loop::CalloopScheduler;
pub use manual::ManualScheduler;

use crate::error::Result;

/// What an animator wants after a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameAction {
    /// Re-arm for the next frame.
    Continue,
    /// Remove this animator; its state is dropped.
    Stop,
}

/// A per-frame task.
pub trait Animator {
    fn name(&self) -> &str;
    fn frame(&mut self) -> FrameAction;
}

/// Unique identifier for a scheduled animator
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct AnimatorId(u64);

static NEXT_ANIMATOR_ID: AtomicU64 = AtomicU64::new(1);

impl AnimatorId {
    /// Generate a new unique animator ID
    pub fn next() -> Self {
        AnimatorId(NEXT_ANIMATOR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Shared flag observed by a scheduler before every frame.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Owner-side handle of a scheduled animator. Dropping it cancels the task.
#[derive(Debug)]
#[must_use = "dropping an AnimatorHandle cancels the animator"]
pub struct AnimatorHandle {
    id: AnimatorId,
    token: CancelToken,
}

impl AnimatorHandle {
    pub(crate) fn new(id: AnimatorId, token: CancelToken) -> Self {
        Self { id, token }
    }

    pub fn id(&self) -> AnimatorId {
        self.id
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for AnimatorHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// The host's request-frame / cancel-frame pair.
pub trait FrameScheduler {
    /// Start running `animator` once per frame.
    fn schedule(&mut self, animator: Box<dyn Animator>) -> Result<AnimatorHandle>;

    /// Stop an animator and drop its state before returning.
    fn cancel(&mut self, handle: &AnimatorHandle);

    /// Number of animators that will run on the next frame.
    fn active(&self) -> usize;
}
