use std::collections::HashMap;
use std::time::Duration;

use calloop::timer::{TimeoutAction, Timer};
use calloop::{LoopHandle, RegistrationToken};
use log::{debug, trace};

use super::{Animator, AnimatorHandle, AnimatorId, CancelToken, FrameAction, FrameScheduler};
use crate::error::Result;

/// Runs each animator on its own calloop timer, re-armed every `interval`.
pub struct CalloopScheduler<'l, D> {
    handle: LoopHandle<'l, D>,
    interval: Duration,
    registrations: HashMap<AnimatorId, (RegistrationToken, CancelToken)>,
}

impl<'l, D> CalloopScheduler<'l, D> {
    pub fn new(handle: LoopHandle<'l, D>, interval: Duration) -> Self {
        Self {
            handle,
            interval,
            registrations: HashMap::new(),
        }
    }

    /// Forget entries whose task already ended, through a dropped handle or
    /// `FrameAction::Stop`. Their timers return `Drop` on their own.
    fn prune(&mut self) {
        self.registrations.retain(|_, (_, token)| !token.is_cancelled());
    }
}

impl<'l, D> FrameScheduler for CalloopScheduler<'l, D> {
    fn schedule(&mut self, mut animator: Box<dyn Animator>) -> Result<AnimatorHandle> {
        self.prune();
        let id = AnimatorId::next();
        let token = CancelToken::new();
        let interval = self.interval;
        debug!("scheduling {} as {:?} every {:?}", animator.name(), id, interval);

        let frame_token = token.clone();
        let registration = self
            .handle
            .insert_source(Timer::from_duration(interval), move |_, _, _| {
                if frame_token.is_cancelled() {
                    return TimeoutAction::Drop;
                }
                match animator.frame() {
                    FrameAction::Continue => TimeoutAction::ToDuration(interval),
                    FrameAction::Stop => {
                        trace!("{} stopped", animator.name());
                        frame_token.cancel();
                        TimeoutAction::Drop
                    }
                }
            })
            .map_err(|e| e.error)?;

        self.registrations.insert(id, (registration, token.clone()));
        Ok(AnimatorHandle::new(id, token))
    }

    fn cancel(&mut self, handle: &AnimatorHandle) {
        handle.cancel();
        if let Some((registration, _)) = self.registrations.remove(&handle.id()) {
            self.handle.remove(registration);
        }
        self.prune();
    }

    fn active(&self) -> usize {
        self.registrations
            .values()
            .filter(|(_, token)| !token.is_cancelled())
            .count()
    }
}

impl<'l, D> Drop for CalloopScheduler<'l, D> {
    fn drop(&mut self) {
        for (_, (registration, token)) in self.registrations.drain() {
            token.cancel();
            self.handle.remove(registration);
        }
    }
}
