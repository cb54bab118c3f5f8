//! Per-frame exponential relaxation toward a moving target.
//!
//! Each step closes a fixed fraction (`easing`) of the remaining gap, which
//! converges like an exponential decay with a time constant of roughly
//! `1 / easing` frames. Two settle behaviours exist for the tail of the
//! approach:
//!
//! - [`Settle::Snap`]: once the gap is below `epsilon` the value jumps onto the
//!   target, so the approach terminates and further steps are no-ops.
//! - [`Settle::Hold`]: while the gap is at most `epsilon` the step is skipped
//!   entirely and the value stays where it is.

/// How a relaxation behaves once the remaining gap is negligible.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Settle {
    /// Jump onto the target when `|diff| < epsilon`.
    Snap,
    /// Leave the value untouched while `|diff| <= epsilon`.
    Hold,
}

/// Result of advancing an animation, indicating whether the value changed
#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceResult<T> {
    /// Value did not change
    NoChange,
    /// Value changed to a new value
    Changed(T),
}

impl<T> AdvanceResult<T> {
    /// Returns true if the value changed
    pub fn is_changed(&self) -> bool {
        matches!(self, AdvanceResult::Changed(_))
    }
}

/// State of one relaxing scalar.
#[derive(Clone, Debug, PartialEq)]
pub struct RelaxState {
    current: f64,
    epsilon: f64,
    settle: Settle,
}

impl RelaxState {
    pub fn new(initial: f64, epsilon: f64, settle: Settle) -> Self {
        Self {
            current: initial,
            epsilon,
            settle,
        }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    /// Whether the value has settled relative to `target`.
    pub fn is_settled(&self, target: f64) -> bool {
        let diff = (target - self.current).abs();
        match self.settle {
            Settle::Snap => diff == 0.0,
            Settle::Hold => diff <= self.epsilon,
        }
    }

    /// Advance one frame toward `target`, closing `easing` of the gap.
    pub fn advance(&mut self, target: f64, easing: f64) -> AdvanceResult<f64> {
        let diff = target - self.current;

        let next = match self.settle {
            Settle::Snap if diff.abs() < self.epsilon => target,
            Settle::Hold if diff.abs() <= self.epsilon => return AdvanceResult::NoChange,
            _ => self.current + diff * easing,
        };

        if next == self.current {
            return AdvanceResult::NoChange;
        }
        self.current = next;
        AdvanceResult::Changed(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapping(initial: f64) -> RelaxState {
        RelaxState::new(initial, 0.01, Settle::Snap)
    }

    #[test]
    fn test_first_steps_close_ten_percent() {
        let mut state = snapping(0.0);
        state.advance(50.0, 0.1);
        assert!((state.current() - 5.0).abs() < 1e-12);
        state.advance(50.0, 0.1);
        assert!((state.current() - 9.5).abs() < 1e-12);
    }

    #[test]
    fn test_converges_monotonically_without_overshoot() {
        for &(start, target) in &[(0.0, 50.0), (100.0, 3.0), (42.0, 42.5), (0.0, 100.0)] {
            let mut state = snapping(start);
            let mut previous_gap = (target - start).abs();
            let mut steps = 0;
            while !state.is_settled(target) {
                state.advance(target, 0.1);
                let gap = (target - state.current()).abs();
                assert!(gap <= previous_gap, "gap grew from {} to {}", previous_gap, gap);
                if start < target {
                    assert!(state.current() <= target);
                } else {
                    assert!(state.current() >= target);
                }
                previous_gap = gap;
                steps += 1;
                assert!(steps < 200, "did not snap within 200 steps");
            }
            assert_eq!(state.current(), target);
        }
    }

    #[test]
    fn test_snapped_state_is_idempotent() {
        let mut state = snapping(20.0);
        state.advance(20.005, 0.1);
        assert_eq!(state.current(), 20.005);
        for _ in 0..10 {
            assert_eq!(state.advance(20.005, 0.1), AdvanceResult::NoChange);
            assert_eq!(state.current(), 20.005);
        }
    }

    #[test]
    fn test_hold_skips_inside_dead_zone() {
        let mut state = RelaxState::new(10.0, 0.01, Settle::Hold);
        assert_eq!(state.advance(10.01, 0.25), AdvanceResult::NoChange);
        assert_eq!(state.current(), 10.0);

        assert!(state.advance(11.0, 0.25).is_changed());
        assert!((state.current() - 10.25).abs() < 1e-12);
    }

    #[test]
    fn test_hold_never_reaches_target_exactly() {
        let mut state = RelaxState::new(0.0, 0.01, Settle::Hold);
        for _ in 0..500 {
            state.advance(10.0, 0.08);
        }
        assert!(state.is_settled(10.0));
        assert!(state.current() < 10.0);
    }
}
