//! Scroll-driven animation core.
//!
//! Turns discrete scroll samples into smooth per-frame motion: a globally
//! smoothed progress value, a color blended across ordered breakpoints and a
//! damped parallax offset per page section. Everything is published through
//! [`reactive::Signal`]s.
//!
//! ```no_run
//! use scrollglow::prelude::*;
//!
//! struct Page;
//!
//! impl ScrollHost for Page {
//!     fn metrics(&self) -> ScrollMetrics {
//!         ScrollMetrics::new(0.0, 4000.0, 1000.0)
//!     }
//!
//!     fn section_rect(&self, _name: &str) -> Option<SectionRect> {
//!         None
//!     }
//! }
//!
//! let scene = Scene::new(Config::default())?;
//! let snapshot = scene.run(Page, &["hero", "about"])?;
//! println!("{:?}", snapshot.vars());
//! # Ok::<(), scrollglow::Error>(())
//! ```

pub mod animation;
pub mod color;
pub mod config;
pub mod error;
pub mod parallax;
pub mod reactive;
pub mod sampler;
pub mod scene;
pub mod scheduler;
pub mod smoother;
pub mod stats;

pub use error::{Error, Result};
pub use scene::{Scene, ScrollHost, SectionId, Snapshot};

pub mod prelude {
    pub use crate::color::{Breakpoint, BreakpointTable, Rgb};
    pub use crate::config::{Config, ParallaxConfig, SmoothingConfig, Tuning};
    pub use crate::parallax::SectionRect;
    pub use crate::reactive::{create_signal, ChangeFlags, ReadSignal, Signal, WriteSignal};
    pub use crate::sampler::ScrollMetrics;
    pub use crate::scheduler::{
        Animator, AnimatorHandle, CalloopScheduler, FrameAction, FrameScheduler, ManualScheduler,
    };
    pub use crate::{Error, Scene, ScrollHost, SectionId, Snapshot};
}
