//! Frame rate measurement for the inspector readout.

use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_secs(1);

/// Counts frames and reports a rounded FPS figure once per one-second window.
#[derive(Clone, Debug)]
pub struct FrameStats {
    window_start: Option<Instant>,
    frames_in_window: u32,
    last_fps: u32,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self {
            window_start: None,
            frames_in_window: 0,
            // Readout before the first window closes
            last_fps: 60,
        }
    }
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame at `now`. Returns the new FPS when a window closes.
    pub fn record(&mut self, now: Instant) -> Option<u32> {
        let start = *self.window_start.get_or_insert(now);
        self.frames_in_window += 1;

        let elapsed = now.saturating_duration_since(start);
        if elapsed < WINDOW {
            return None;
        }
        let fps = (f64::from(self.frames_in_window) / elapsed.as_secs_f64()).round() as u32;
        self.last_fps = fps;
        self.frames_in_window = 0;
        self.window_start = Some(now);
        Some(fps)
    }

    pub fn fps(&self) -> u32 {
        self.last_fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_once_per_window() {
        let mut stats = FrameStats::new();
        let start = Instant::now();
        assert_eq!(stats.fps(), 60);

        // 30 frames spread over 0..=0.96s, none closes the window
        for i in 0..30 {
            assert_eq!(stats.record(start + Duration::from_millis(i * 33)), None);
        }
        // The 31st frame lands at exactly one second: 31 frames / 1s
        assert_eq!(stats.record(start + Duration::from_secs(1)), Some(31));
        assert_eq!(stats.fps(), 31);
    }

    #[test]
    fn test_next_window_starts_fresh() {
        let mut stats = FrameStats::new();
        let start = Instant::now();
        stats.record(start);
        assert_eq!(stats.record(start + Duration::from_secs(1)), Some(2));

        let second = start + Duration::from_secs(1);
        for i in 1..10 {
            assert_eq!(stats.record(second + Duration::from_millis(i * 100)), None);
        }
        // 10 frames after the window reset, over 2 seconds
        assert_eq!(stats.record(second + Duration::from_secs(2)), Some(5));
    }
}
