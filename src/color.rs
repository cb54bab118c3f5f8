//! Piecewise-linear color blending across ordered breakpoints.
//!
//! A [`BreakpointTable`] anchors colors at fixed scroll positions. Mapping a
//! progress percent (0..=100) to a color finds the segment the percent falls
//! into and blends its two end colors channel by channel.
//!
//! Edge policy: a percent sitting exactly on a breakpoint resolves to the
//! segment that *starts* there with a local factor of 0, so the output equals
//! that breakpoint's color. A percent of 100 resolves to the last segment with
//! a local factor of 1.

use serde::{Deserialize, Serialize};

use crate::animation::Animatable;
use crate::error::BreakpointError;

/// An 8-bit RGB triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Multiply every channel by `factor`, rounding and saturating to 0..=255.
    pub fn scaled(self, factor: f64) -> Self {
        let scale = |c: u8| round_channel(c as f64 * factor);
        Self {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
        }
    }

    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(color: Rgb) -> Self {
        color.channels()
    }
}

/// Round half away from zero and clamp into a channel value.
pub(crate) fn round_channel(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

/// A color anchored at a fractional scroll position in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub position: f64,
    pub color: Rgb,
}

impl Breakpoint {
    pub const fn new(position: f64, color: Rgb) -> Self {
        Self { position, color }
    }
}

/// Section palette of the reference page, evenly spaced at 12.5% intervals.
pub const DEFAULT_PALETTE: [Rgb; 9] = [
    Rgb::new(99, 102, 241),
    Rgb::new(244, 63, 94),
    Rgb::new(139, 92, 246),
    Rgb::new(236, 72, 153),
    Rgb::new(34, 211, 238),
    Rgb::new(234, 179, 8),
    Rgb::new(52, 211, 153),
    Rgb::new(168, 85, 247),
    Rgb::new(59, 130, 246),
];

const UNIFORM_TOLERANCE: f64 = 1e-9;

/// Validated, immutable sequence of breakpoints.
#[derive(Clone, Debug, PartialEq)]
pub struct BreakpointTable {
    breakpoints: Vec<Breakpoint>,
    uniform: bool,
}

impl BreakpointTable {
    /// Validate and build a table. Positions must start at 0, end at 1 and
    /// strictly increase.
    pub fn new(breakpoints: Vec<Breakpoint>) -> Result<Self, BreakpointError> {
        let n = breakpoints.len();
        if n < 2 {
            return Err(BreakpointError::TooFew(n));
        }

        let first = breakpoints[0].position;
        if first != 0.0 {
            return Err(BreakpointError::FirstNotZero(first));
        }
        let last = breakpoints[n - 1].position;
        if last != 1.0 {
            return Err(BreakpointError::LastNotOne(last));
        }

        for (index, pair) in breakpoints.windows(2).enumerate() {
            // NaN fails this comparison too
            if !(pair[1].position > pair[0].position) {
                return Err(BreakpointError::NotIncreasing {
                    index: index + 1,
                    position: pair[1].position,
                    previous: pair[0].position,
                });
            }
        }

        let step = 1.0 / (n - 1) as f64;
        let uniform = breakpoints
            .iter()
            .enumerate()
            .all(|(i, bp)| (bp.position - i as f64 * step).abs() < UNIFORM_TOLERANCE);

        Ok(Self {
            breakpoints,
            uniform,
        })
    }

    /// Build a table from colors placed at equal intervals over `[0, 1]`.
    pub fn evenly_spaced(colors: &[Rgb]) -> Result<Self, BreakpointError> {
        if colors.len() < 2 {
            return Err(BreakpointError::TooFew(colors.len()));
        }
        let last = (colors.len() - 1) as f64;
        let breakpoints = colors
            .iter()
            .enumerate()
            .map(|(i, &color)| Breakpoint::new(i as f64 / last, color))
            .collect();
        Self::new(breakpoints)
    }

    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    /// Whether the positions are evenly spaced (mapped with the floor formula).
    pub fn is_uniform(&self) -> bool {
        self.uniform
    }

    /// Resolve `percent` (0..=100) into `(segment, local_t)`.
    ///
    /// `segment` is in `0..=len-2`, `local_t` in `[0, 1]`. Out-of-range and
    /// NaN inputs are clamped first.
    pub fn locate(&self, percent: f64) -> (usize, f64) {
        let percent = clamp_percent(percent);
        let last_segment = self.breakpoints.len() - 2;

        if self.uniform {
            let spacing = 100.0 / (self.breakpoints.len() - 1) as f64;
            let segment = ((percent / spacing).floor() as usize).min(last_segment);
            let local_t = ((percent - segment as f64 * spacing) / spacing).clamp(0.0, 1.0);
            return (segment, local_t);
        }

        let reached = self
            .breakpoints
            .partition_point(|bp| bp.position * 100.0 <= percent);
        let segment = reached.saturating_sub(1).min(last_segment);
        let start = self.breakpoints[segment].position * 100.0;
        let end = self.breakpoints[segment + 1].position * 100.0;
        let local_t = ((percent - start) / (end - start)).clamp(0.0, 1.0);
        (segment, local_t)
    }

    /// Interpolated color for a progress percent.
    pub fn color_at(&self, percent: f64) -> Rgb {
        let (segment, local_t) = self.locate(percent);
        Rgb::lerp(
            &self.breakpoints[segment].color,
            &self.breakpoints[segment + 1].color,
            local_t,
        )
    }

    /// Index of the breakpoint nearest to `percent`.
    pub fn nearest_index(&self, percent: f64) -> usize {
        let (segment, local_t) = self.locate(percent);
        if local_t >= 0.5 {
            segment + 1
        } else {
            segment
        }
    }
}

impl Default for BreakpointTable {
    fn default() -> Self {
        let last = (DEFAULT_PALETTE.len() - 1) as f64;
        let breakpoints = DEFAULT_PALETTE
            .iter()
            .enumerate()
            .map(|(i, &color)| Breakpoint::new(i as f64 / last, color))
            .collect();
        Self {
            breakpoints,
            uniform: true,
        }
    }
}

fn clamp_percent(percent: f64) -> f64 {
    if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_stop(from: Rgb, to: Rgb) -> BreakpointTable {
        BreakpointTable::evenly_spaced(&[from, to]).unwrap()
    }

    #[test]
    fn test_endpoints_match_first_and_last() {
        let table = BreakpointTable::default();
        assert_eq!(table.color_at(0.0), DEFAULT_PALETTE[0]);
        assert_eq!(table.color_at(100.0), DEFAULT_PALETTE[8]);
    }

    #[test]
    fn test_exact_breakpoint_has_no_interpolation() {
        let table = BreakpointTable::default();
        assert_eq!(table.locate(37.5), (3, 0.0));
        assert_eq!(table.color_at(37.5), DEFAULT_PALETTE[3]);
    }

    #[test]
    fn test_segment_midpoint_is_rounded_average() {
        let table = BreakpointTable::default();
        // (236,72,153) -> (34,211,238): 135, 141.5, 195.5
        assert_eq!(table.color_at(43.75), Rgb::new(135, 142, 196));
    }

    #[test]
    fn test_hundred_lands_on_last_segment_end() {
        let table = BreakpointTable::default();
        assert_eq!(table.locate(100.0), (7, 1.0));
    }

    #[test]
    fn test_half_rounds_up() {
        let table = two_stop(Rgb::new(0, 10, 255), Rgb::new(1, 11, 254));
        // 0.5, 10.5, 254.5 all round away from zero
        assert_eq!(table.color_at(50.0), Rgb::new(1, 11, 255));
    }

    #[test]
    fn test_every_boundary_is_continuous() {
        let table = BreakpointTable::default();
        for (k, bp) in table.breakpoints().iter().enumerate() {
            let at = k as f64 * 12.5;
            assert_eq!(table.color_at(at), bp.color, "breakpoint {}", k);

            let below = table.color_at(at - 1e-9);
            for (a, b) in below.channels().iter().zip(bp.color.channels()) {
                assert!((*a as i32 - b as i32).abs() <= 1, "jump below breakpoint {}", k);
            }
        }
    }

    #[test]
    fn test_sweep_has_no_jumps() {
        let table = BreakpointTable::default();
        let mut previous = table.color_at(0.0);
        for step in 1..=10_000 {
            let color = table.color_at(step as f64 * 0.01);
            for (a, b) in color.channels().iter().zip(previous.channels()) {
                assert!((*a as i32 - b as i32).abs() <= 1, "jump at {}", step);
            }
            previous = color;
        }
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        let table = BreakpointTable::default();
        assert_eq!(table.color_at(-20.0), DEFAULT_PALETTE[0]);
        assert_eq!(table.color_at(250.0), DEFAULT_PALETTE[8]);
        assert_eq!(table.color_at(f64::NAN), DEFAULT_PALETTE[0]);
    }

    #[test]
    fn test_non_uniform_table() {
        let table = BreakpointTable::new(vec![
            Breakpoint::new(0.0, Rgb::new(0, 0, 0)),
            Breakpoint::new(0.2, Rgb::new(100, 100, 100)),
            Breakpoint::new(1.0, Rgb::new(200, 200, 200)),
        ])
        .unwrap();
        assert!(!table.is_uniform());
        assert_eq!(table.color_at(10.0), Rgb::new(50, 50, 50));
        assert_eq!(table.color_at(20.0), Rgb::new(100, 100, 100));
        assert_eq!(table.color_at(60.0), Rgb::new(150, 150, 150));
        assert_eq!(table.color_at(100.0), Rgb::new(200, 200, 200));
    }

    #[test]
    fn test_nearest_index() {
        let table = BreakpointTable::default();
        assert_eq!(table.nearest_index(0.0), 0);
        assert_eq!(table.nearest_index(6.0), 0);
        assert_eq!(table.nearest_index(6.25), 1);
        assert_eq!(table.nearest_index(99.0), 8);
    }

    #[test]
    fn test_rejects_invalid_tables() {
        let black = Rgb::default();
        assert_eq!(
            BreakpointTable::new(vec![Breakpoint::new(0.0, black)]),
            Err(BreakpointError::TooFew(1))
        );
        assert_eq!(
            BreakpointTable::new(vec![
                Breakpoint::new(0.1, black),
                Breakpoint::new(1.0, black)
            ]),
            Err(BreakpointError::FirstNotZero(0.1))
        );
        assert_eq!(
            BreakpointTable::new(vec![
                Breakpoint::new(0.0, black),
                Breakpoint::new(0.9, black)
            ]),
            Err(BreakpointError::LastNotOne(0.9))
        );
        assert!(matches!(
            BreakpointTable::new(vec![
                Breakpoint::new(0.0, black),
                Breakpoint::new(0.5, black),
                Breakpoint::new(0.5, black),
                Breakpoint::new(1.0, black),
            ]),
            Err(BreakpointError::NotIncreasing { index: 2, .. })
        ));
    }

    #[test]
    fn test_default_matches_evenly_spaced_palette() {
        assert_eq!(
            BreakpointTable::default(),
            BreakpointTable::evenly_spaced(&DEFAULT_PALETTE).unwrap()
        );
    }

    #[test]
    fn test_scaled_saturates() {
        assert_eq!(Rgb::new(200, 100, 0).scaled(1.5), Rgb::new(255, 150, 0));
        assert_eq!(Rgb::new(200, 100, 1).scaled(0.5), Rgb::new(100, 50, 1));
    }
}
