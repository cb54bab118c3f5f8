use log::{debug, trace};

use super::{Animator, AnimatorHandle, AnimatorId, CancelToken, FrameAction, FrameScheduler};
use crate::error::Result;

struct Entry {
    id: AnimatorId,
    token: CancelToken,
    animator: Box<dyn Animator>,
}

/// Deterministic scheduler driven by explicit [`ManualScheduler::run_frame`]
/// calls. Suits hosts that own their frame clock, and tests.
#[derive(Default)]
pub struct ManualScheduler {
    entries: Vec<Entry>,
    frame: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one frame of every live animator. Returns how many ran.
    pub fn run_frame(&mut self) -> usize {
        self.frame += 1;
        let mut ran = 0;
        let frame = self.frame;
        self.entries.retain_mut(|entry| {
            // Tokens cancelled by a dropped handle are freed here
            if entry.token.is_cancelled() {
                return false;
            }
            ran += 1;
            match entry.animator.frame() {
                FrameAction::Continue => true,
                FrameAction::Stop => {
                    trace!("frame {}: {} stopped", frame, entry.animator.name());
                    entry.token.cancel();
                    false
                }
            }
        });
        ran
    }

    pub fn run_frames(&mut self, count: usize) {
        for _ in 0..count {
            self.run_frame();
        }
    }

    /// Frames run so far.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }
}

impl FrameScheduler for ManualScheduler {
    fn schedule(&mut self, animator: Box<dyn Animator>) -> Result<AnimatorHandle> {
        let id = AnimatorId::next();
        let token = CancelToken::new();
        debug!("scheduling {} as {:?}", animator.name(), id);
        self.entries.push(Entry {
            id,
            token: token.clone(),
            animator,
        });
        Ok(AnimatorHandle::new(id, token))
    }

    fn cancel(&mut self, handle: &AnimatorHandle) {
        handle.cancel();
        self.entries.retain(|entry| entry.id != handle.id());
    }

    fn active(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| !entry.token.is_cancelled())
            .count()
    }
}
