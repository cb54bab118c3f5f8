//! Tunable constants, breakpoint table and frame cadence.
//!
//! Every empirically tuned number of the animation core lives here with its
//! reference default. A config file is plain TOML:
//!
//! ```toml
//! frame_interval_ms = 16
//!
//! [smoothing]
//! easing = 0.1
//!
//! [parallax]
//! max_offset = 50.0
//!
//! [[breakpoints]]
//! position = 0.0
//! color = [99, 102, 241]
//!
//! [[breakpoints]]
//! position = 1.0
//! color = [59, 130, 246]
//! ```
//!
//! Missing keys fall back to their defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::color::{Breakpoint, BreakpointTable, Rgb};
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Cadence of every per-frame task.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,

    /// How often [`crate::Scene::run`] polls the host for scroll metrics.
    #[serde(default = "default_scroll_poll_ms")]
    pub scroll_poll_ms: u64,

    #[serde(default)]
    pub smoothing: SmoothingConfig,

    #[serde(default)]
    pub parallax: ParallaxConfig,

    #[serde(default)]
    pub tuning: Tuning,

    #[serde(default = "default_breakpoints")]
    pub breakpoints: Vec<Breakpoint>,
}

/// Global progress relaxation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Fraction of the remaining gap closed each frame.
    pub easing: f64,
    /// Gap (in percent points) below which the value snaps onto its target.
    pub snap_epsilon: f64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            easing: 0.1,
            snap_epsilon: 0.01,
        }
    }
}

/// Per-section parallax targets and their two-speed relaxation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallaxConfig {
    /// Offset at full strength for a relative position of 1, in display units.
    pub max_offset: f64,
    /// Relative positions closer to center than this force a zero target.
    pub center_snap: f64,
    /// Extent of the quadratic ramp-in; full strength beyond it.
    pub ramp_extent: f64,
    /// Relative positions closer than this use `near_easing`.
    pub near_center: f64,
    pub near_easing: f64,
    pub far_easing: f64,
    /// Dead zone in which the current offset is left untouched.
    pub epsilon: f64,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            max_offset: 50.0,
            center_snap: 0.05,
            ramp_extent: 0.3,
            near_center: 0.1,
            near_easing: 0.25,
            far_easing: 0.08,
            epsilon: 0.01,
        }
    }
}

/// Runtime multipliers applied to published values only.
///
/// They never feed back into relaxation: `brightness` scales the published
/// color, `variation` scales published parallax offsets and `speed` is handed
/// to the rendering layer as is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub brightness: f64,
    pub speed: f64,
    pub variation: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            speed: 1.0,
            variation: 1.0,
        }
    }
}

impl Tuning {
    pub fn validate(&self) -> Result<()> {
        non_negative("tuning.brightness", self.brightness)?;
        non_negative("tuning.speed", self.speed)?;
        non_negative("tuning.variation", self.variation)
    }
}

fn default_frame_interval_ms() -> u64 {
    16
}

fn default_scroll_poll_ms() -> u64 {
    16
}

fn default_breakpoints() -> Vec<Breakpoint> {
    BreakpointTable::default().breakpoints().to_vec()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
            scroll_poll_ms: default_scroll_poll_ms(),
            smoothing: SmoothingConfig::default(),
            parallax: ParallaxConfig::default(),
            tuning: Tuning::default(),
            breakpoints: default_breakpoints(),
        }
    }
}

impl Config {
    /// Default location: `<config dir>/scrollglow/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("scrollglow").join("config.toml"))
    }

    /// Load from the default location, or defaults when no file exists there.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => {
                debug!("no config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| Error::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("loading config from {}", path.display());
        Self::from_toml_str(&contents)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let io_error = |source| Error::ConfigIo {
            path: path.to_path_buf(),
            source,
        };
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(io_error)?;
        }
        std::fs::write(path, self.to_toml_string()?).map_err(io_error)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every constant and build the breakpoint table once.
    pub fn validate(&self) -> Result<()> {
        if self.frame_interval_ms == 0 {
            return Err(Error::InvalidConstant {
                name: "frame_interval_ms",
                value: 0.0,
                reason: "must be at least 1",
            });
        }
        if self.scroll_poll_ms == 0 {
            return Err(Error::InvalidConstant {
                name: "scroll_poll_ms",
                value: 0.0,
                reason: "must be at least 1",
            });
        }

        easing("smoothing.easing", self.smoothing.easing)?;
        positive("smoothing.snap_epsilon", self.smoothing.snap_epsilon)?;

        let p = &self.parallax;
        non_negative("parallax.max_offset", p.max_offset)?;
        non_negative("parallax.center_snap", p.center_snap)?;
        non_negative("parallax.near_center", p.near_center)?;
        positive("parallax.epsilon", p.epsilon)?;
        positive("parallax.ramp_extent", p.ramp_extent)?;
        easing("parallax.near_easing", p.near_easing)?;
        easing("parallax.far_easing", p.far_easing)?;

        self.tuning.validate()?;
        self.breakpoint_table()?;
        Ok(())
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn scroll_poll(&self) -> Duration {
        Duration::from_millis(self.scroll_poll_ms)
    }

    pub fn breakpoint_table(&self) -> Result<BreakpointTable> {
        Ok(BreakpointTable::new(self.breakpoints.clone())?)
    }

    /// Replace the breakpoints with colors spread evenly over the page.
    pub fn with_palette(mut self, colors: &[Rgb]) -> Result<Self> {
        self.breakpoints = BreakpointTable::evenly_spaced(colors)?.breakpoints().to_vec();
        Ok(self)
    }
}

fn easing(name: &'static str, value: f64) -> Result<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(Error::InvalidConstant {
            name,
            value,
            reason: "must be in (0, 1]",
        })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidConstant {
            name,
            value,
            reason: "must be finite and non-negative",
        })
    }
}

fn positive(name: &'static str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidConstant {
            name,
            value,
            reason: "must be finite and positive",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = Config::default();
        config.smoothing.easing = 0.2;
        config.tuning.brightness = 0.8;
        let text = config.to_toml_string().unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let config = Config::from_toml_str(
            r#"
            frame_interval_ms = 8

            [parallax]
            max_offset = 80.0
            "#,
        )
        .unwrap();
        assert_eq!(config.frame_interval_ms, 8);
        assert_eq!(config.parallax.max_offset, 80.0);
        assert_eq!(config.parallax.far_easing, 0.08);
        assert_eq!(config.smoothing, SmoothingConfig::default());
        assert_eq!(config.breakpoints.len(), 9);
    }

    #[test]
    fn test_breakpoints_from_toml() {
        let config = Config::from_toml_str(
            r#"
            [[breakpoints]]
            position = 0.0
            color = [0, 0, 0]

            [[breakpoints]]
            position = 1.0
            color = [255, 255, 255]
            "#,
        )
        .unwrap();
        let table = config.breakpoint_table().unwrap();
        assert_eq!(table.breakpoints().len(), 2);
        assert_eq!(table.color_at(100.0), Rgb::new(255, 255, 255));
    }

    #[test]
    fn test_rejects_bad_constants() {
        let bad_easing = "[smoothing]\neasing = 1.5\n";
        assert!(matches!(
            Config::from_toml_str(bad_easing),
            Err(Error::InvalidConstant {
                name: "smoothing.easing",
                ..
            })
        ));

        let bad_tuning = "[tuning]\nbrightness = -1.0\n";
        assert!(matches!(
            Config::from_toml_str(bad_tuning),
            Err(Error::InvalidConstant {
                name: "tuning.brightness",
                ..
            })
        ));

        for (toml, name) in [
            ("[smoothing]\nsnap_epsilon = 0.0\n", "smoothing.snap_epsilon"),
            ("[parallax]\nepsilon = 0.0\n", "parallax.epsilon"),
            ("[parallax]\nramp_extent = 0.0\n", "parallax.ramp_extent"),
        ] {
            match Config::from_toml_str(toml) {
                Err(Error::InvalidConstant { name: rejected, .. }) => assert_eq!(rejected, name),
                other => panic!("{} accepted: {:?}", name, other.map(|_| ())),
            }
        }

        let bad_table = "[[breakpoints]]\nposition = 0.0\ncolor = [0, 0, 0]\n";
        assert!(matches!(
            Config::from_toml_str(bad_table),
            Err(Error::Breakpoints(_))
        ));
    }

    #[test]
    fn test_with_palette() {
        let config = Config::default()
            .with_palette(&[Rgb::new(1, 2, 3), Rgb::new(4, 5, 6), Rgb::new(7, 8, 9)])
            .unwrap();
        assert_eq!(config.breakpoints[1].position, 0.5);
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("scrollglow-test-{}", std::process::id()));
        let path = dir.join("config.toml");
        let config = Config::default();
        config.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), config);
        std::fs::remove_dir_all(&dir).ok();
    }
}
