use crate::color::{round_channel, Rgb};

/// Trait for types that can be animated by interpolating between values
pub trait Animatable: Clone + PartialEq + Send + Sync + 'static {
    /// Linear interpolation between two values
    /// t = 0.0 returns `from`, t = 1.0 returns `to`
    fn lerp(from: &Self, to: &Self, t: f64) -> Self;
}

impl Animatable for f64 {
    fn lerp(from: &Self, to: &Self, t: f64) -> Self {
        from + (to - from) * t
    }
}

impl Animatable for Rgb {
    /// Channels are blended in floating point and rounded half away from zero.
    fn lerp(from: &Self, to: &Self, t: f64) -> Self {
        let channel = |a: u8, b: u8| round_channel(f64::lerp(&(a as f64), &(b as f64), t));
        Rgb {
            r: channel(from.r, to.r),
            g: channel(from.g, to.g),
            b: channel(from.b, to.b),
        }
    }
}
