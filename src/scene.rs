//! Orchestration of the sampler, the global smoother and mounted sections.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use calloop::timer::{TimeoutAction, Timer};
use calloop::EventLoop;
use log::{debug, info, warn};

use crate::color::{BreakpointTable, Rgb};
use crate::config::{Config, Tuning};
use crate::error::Result;
use crate::parallax::{parallax_section, ParallaxTarget, ParallaxTracker, SectionRect};
use crate::reactive::{create_signal, ReadSignal, WriteSignal};
use crate::sampler::{ProgressSampler, ScrollMetrics};
use crate::scheduler::{AnimatorHandle, CalloopScheduler, FrameScheduler};
use crate::smoother::{ProgressSmoother, Published};

/// The page being scrolled, as seen by the animation core.
pub trait ScrollHost {
    fn metrics(&self) -> ScrollMetrics;

    /// Geometry of a section relative to the viewport top, if it can be
    /// measured right now.
    fn section_rect(&self, name: &str) -> Option<SectionRect>;

    /// Pull fresh input before a scroll sample is taken.
    fn poll(&mut self) {}

    /// [`Scene::run`] returns once this is false.
    fn is_running(&self) -> bool {
        true
    }
}

/// Unique identifier for a mounted section
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct SectionId(u64);

static NEXT_SECTION_ID: AtomicU64 = AtomicU64::new(1);

impl SectionId {
    fn next() -> Self {
        SectionId(NEXT_SECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

struct MountedSection {
    id: SectionId,
    name: String,
    tracker: ParallaxTracker,
    offset: ReadSignal<f64>,
    handle: AnimatorHandle,
}

/// Published values at one point in time.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub progress: f64,
    pub percent: f64,
    pub color: Rgb,
    pub section_index: usize,
    pub fps: u32,
    pub tuning: Tuning,
    /// `(section name, published offset)` in mount order.
    pub offsets: Vec<(String, f64)>,
}

impl Snapshot {
    /// Outputs as named variables, ready to hand to a styling layer.
    pub fn vars(&self) -> Vec<(String, String)> {
        let mut vars = vec![
            ("scroll-progress".to_string(), self.progress.to_string()),
            ("scroll-percent".to_string(), self.percent.to_string()),
            ("orb-r".to_string(), self.color.r.to_string()),
            ("orb-g".to_string(), self.color.g.to_string()),
            ("orb-b".to_string(), self.color.b.to_string()),
            ("section-index".to_string(), self.section_index.to_string()),
            ("animation-speed".to_string(), self.tuning.speed.to_string()),
        ];
        vars.extend(
            self.offsets
                .iter()
                .map(|(name, offset)| (format!("parallax-offset-{}", name), offset.to_string())),
        );
        vars
    }
}

/// One scrolling page: the global smoother plus any number of parallax
/// sections, all publishing through signals.
///
/// The scene never owns a scheduler. Hosts with their own frame clock pass a
/// [`crate::scheduler::ManualScheduler`] to each call; [`Scene::run`] drives
/// everything from a calloop event loop instead.
pub struct Scene {
    config: Config,
    table: Arc<BreakpointTable>,
    sampler: ProgressSampler,
    tuning: WriteSignal<Tuning>,
    tuning_reader: ReadSignal<Tuning>,
    smoother: Option<ProgressSmoother>,
    smoother_handle: Option<AnimatorHandle>,
    published: Published,
    sections: Vec<MountedSection>,
    shut_down: bool,
}

impl Scene {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let table = Arc::new(config.breakpoint_table()?);

        let (target, target_writer) = create_signal(0.0).split();
        let (tuning_reader, tuning) = create_signal(config.tuning).split();
        let (smoother, published) = ProgressSmoother::new(
            target,
            &config.smoothing,
            table.clone(),
            tuning_reader.clone(),
        );
        debug!(
            "scene created: {} breakpoints ({}), {:?} frames",
            table.breakpoints().len(),
            if table.is_uniform() { "uniform" } else { "custom" },
            config.frame_interval()
        );

        Ok(Self {
            config,
            table,
            sampler: ProgressSampler::new(target_writer),
            tuning,
            tuning_reader,
            smoother: Some(smoother),
            smoother_handle: None,
            published,
            sections: Vec::new(),
            shut_down: false,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn breakpoints(&self) -> &BreakpointTable {
        &self.table
    }

    /// Take the startup scroll sample and schedule the global smoother.
    ///
    /// Already mounted sections are retargeted from the same sample. Calling
    /// it again only resamples.
    pub fn start(
        &mut self,
        host: &impl ScrollHost,
        scheduler: &mut impl FrameScheduler,
    ) -> Result<()> {
        if self.shut_down {
            warn!("start called on a scene that was shut down");
            return Ok(());
        }
        let percent = self.on_scroll(host);
        debug!("startup sample {:.3}%", percent);
        match self.smoother.take() {
            Some(smoother) => {
                self.smoother_handle = Some(scheduler.schedule(Box::new(smoother))?);
                info!("progress smoother started");
            }
            None => debug!("progress smoother already started"),
        }
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.smoother_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_cancelled())
    }

    /// Register a section and start its parallax task.
    ///
    /// The initial target comes from the host's current geometry; a section
    /// the host cannot measure yet starts centered.
    pub fn mount_section(
        &mut self,
        name: impl Into<String>,
        host: &impl ScrollHost,
        scheduler: &mut impl FrameScheduler,
    ) -> Result<SectionId> {
        let name = name.into();
        let viewport_height = host.metrics().viewport_height;
        let initial = host
            .section_rect(&name)
            .map(|rect| ParallaxTarget::measure(&rect, viewport_height, &self.config.parallax))
            .unwrap_or_default();

        let (tracker, animator, offset) = parallax_section(
            name.clone(),
            initial,
            self.config.parallax,
            self.tuning_reader.clone(),
        );
        let handle = scheduler.schedule(Box::new(animator))?;
        let id = SectionId::next();
        debug!("mounted section {} as {:?}, target {:.3}", name, id, initial.target_offset);

        self.sections.push(MountedSection {
            id,
            name,
            tracker,
            offset,
            handle,
        });
        Ok(id)
    }

    /// Cancel a section's task and drop its state. Returns false for ids that
    /// are not mounted.
    pub fn unmount_section(&mut self, id: SectionId, scheduler: &mut impl FrameScheduler) -> bool {
        let Some(index) = self.sections.iter().position(|section| section.id == id) else {
            warn!("unmount of unknown section {:?} ignored", id);
            return false;
        };
        let section = self.sections.remove(index);
        scheduler.cancel(&section.handle);
        debug!("unmounted section {}", section.name);
        true
    }

    /// Handle a scroll notification: sample global progress and retarget
    /// every mounted section. Returns the new progress target.
    pub fn on_scroll(&self, host: &impl ScrollHost) -> f64 {
        let metrics = host.metrics();
        let percent = self.sampler.sample(&metrics);
        for section in &self.sections {
            // Unmeasurable sections keep their previous target
            if let Some(rect) = host.section_rect(&section.name) {
                section.tracker.on_scroll(&rect, metrics.viewport_height);
            }
        }
        percent
    }

    pub fn set_tuning(&self, tuning: Tuning) -> Result<()> {
        tuning.validate()?;
        if self.tuning.set(tuning) {
            debug!("tuning changed: {:?}", tuning);
        }
        Ok(())
    }

    pub fn tuning(&self) -> ReadSignal<Tuning> {
        self.tuning_reader.clone()
    }

    pub fn published(&self) -> &Published {
        &self.published
    }

    pub fn section_offset(&self, id: SectionId) -> Option<ReadSignal<f64>> {
        self.sections
            .iter()
            .find(|section| section.id == id)
            .map(|section| section.offset.clone())
    }

    /// Mounted sections in mount order.
    pub fn sections(&self) -> impl Iterator<Item = (SectionId, &str)> {
        self.sections
            .iter()
            .map(|section| (section.id, section.name.as_str()))
    }

    pub fn fps(&self) -> u32 {
        self.published.fps.get()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            progress: self.published.progress.get(),
            percent: self.published.percent.get(),
            color: self.published.color.get(),
            section_index: self.published.section_index.get(),
            fps: self.published.fps.get(),
            tuning: self.tuning_reader.get(),
            offsets: self
                .sections
                .iter()
                .map(|section| (section.name.clone(), section.offset.get()))
                .collect(),
        }
    }

    /// Cancel every task. The scene cannot be restarted afterwards.
    pub fn shutdown(&mut self, scheduler: &mut impl FrameScheduler) {
        if let Some(handle) = self.smoother_handle.take() {
            scheduler.cancel(&handle);
        }
        self.smoother = None;
        for section in self.sections.drain(..) {
            scheduler.cancel(&section.handle);
        }
        self.shut_down = true;
        info!("scene shut down");
    }

    /// Drive the scene from a calloop event loop until the host stops.
    ///
    /// Logging is initialised here if nothing else did it first. Scroll is
    /// sampled every `scroll_poll_ms` and every animator runs on its own timer
    /// every `frame_interval_ms`. Returns the values published last, taken
    /// before the tasks are cancelled.
    pub fn run<H: ScrollHost>(self, host: H, sections: &[&str]) -> Result<Snapshot> {
        let _ = env_logger::try_init();

        let mut event_loop: EventLoop<'_, RunState<H>> = EventLoop::try_new()?;
        let interval = self.config.frame_interval();
        let poll = self.config.scroll_poll();
        let mut scheduler = CalloopScheduler::new(event_loop.handle(), interval);

        let mut state = RunState { scene: self, host };
        for name in sections {
            state.scene.mount_section(*name, &state.host, &mut scheduler)?;
        }
        state.scene.start(&state.host, &mut scheduler)?;

        let scroll = event_loop
            .handle()
            .insert_source(Timer::from_duration(poll), move |_, _, state| {
                state.host.poll();
                state.scene.on_scroll(&state.host);
                TimeoutAction::ToDuration(poll)
            })
            .map_err(|e| e.error)?;

        info!(
            "running with {} sections, frame {:?}, scroll poll {:?}",
            sections.len(),
            interval,
            poll
        );
        let signal = event_loop.get_signal();
        event_loop.run(Some(interval), &mut state, |state| {
            if !state.host.is_running() {
                signal.stop();
            }
        })?;

        event_loop.handle().remove(scroll);
        let RunState { mut scene, .. } = state;
        let snapshot = scene.snapshot();
        scene.shutdown(&mut scheduler);
        Ok(snapshot)
    }
}

struct RunState<H> {
    scene: Scene,
    host: H,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::scheduler::ManualScheduler;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Page {
        metrics: ScrollMetrics,
        rects: HashMap<String, SectionRect>,
    }

    impl ScrollHost for Page {
        fn metrics(&self) -> ScrollMetrics {
            self.metrics
        }

        fn section_rect(&self, name: &str) -> Option<SectionRect> {
            self.rects.get(name).copied()
        }
    }

    fn page(scroll_top: f64) -> Page {
        Page {
            metrics: ScrollMetrics::new(scroll_top, 3000.0, 1000.0),
            rects: HashMap::new(),
        }
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut scene = Scene::new(Config::default()).unwrap();
        let mut scheduler = ManualScheduler::new();
        let host = page(0.0);
        scene.start(&host, &mut scheduler).unwrap();
        scene.start(&host, &mut scheduler).unwrap();
        assert!(scene.is_started());
        assert_eq!(scheduler.active(), 1);
    }

    #[test]
    fn test_scroll_then_frames_publish_progress() {
        let mut scene = Scene::new(Config::default()).unwrap();
        let mut scheduler = ManualScheduler::new();
        let host = page(0.0);
        scene.start(&host, &mut scheduler).unwrap();

        assert_eq!(scene.on_scroll(&page(1000.0)), 50.0);
        scheduler.run_frame();
        assert!((scene.published().percent.get() - 5.0).abs() < 1e-12);
        scheduler.run_frame();
        assert!((scene.published().percent.get() - 9.5).abs() < 1e-12);
    }

    #[test]
    fn test_start_retargets_mounted_sections() {
        let mut scene = Scene::new(Config::default()).unwrap();
        let mut scheduler = ManualScheduler::new();
        let mut host = page(0.0);
        let id = scene.mount_section("late", &host, &mut scheduler).unwrap();

        // Geometry shows up between mount and start
        host.rects
            .insert("late".to_string(), SectionRect::new(1500.0, 1000.0));
        scene.start(&host, &mut scheduler).unwrap();
        scheduler.run_frame();
        // rp = 1.5 -> target 75, first far-easing step
        assert!((scene.section_offset(id).unwrap().get() - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_unmount_unknown_section_is_ignored() {
        let mut scene = Scene::new(Config::default()).unwrap();
        let mut scheduler = ManualScheduler::new();
        let host = page(0.0);
        let id = scene.mount_section("hero", &host, &mut scheduler).unwrap();
        assert!(scene.unmount_section(id, &mut scheduler));
        assert!(!scene.unmount_section(id, &mut scheduler));
        assert_eq!(scheduler.active(), 0);
    }

    #[test]
    fn test_set_tuning_validates() {
        let scene = Scene::new(Config::default()).unwrap();
        let bad = Tuning {
            variation: f64::NAN,
            ..Tuning::default()
        };
        assert!(matches!(scene.set_tuning(bad), Err(Error::InvalidConstant { .. })));
        assert_eq!(scene.tuning().get(), Tuning::default());
    }

    #[test]
    fn test_snapshot_vars() {
        let mut scene = Scene::new(Config::default()).unwrap();
        let mut scheduler = ManualScheduler::new();
        let mut host = page(0.0);
        host.rects
            .insert("about".to_string(), SectionRect::new(1500.0, 1000.0));
        scene.mount_section("about", &host, &mut scheduler).unwrap();

        let vars: HashMap<String, String> = scene.snapshot().vars().into_iter().collect();
        assert_eq!(vars["scroll-progress"], "0");
        assert_eq!(vars["orb-r"], "99");
        assert_eq!(vars["orb-g"], "102");
        assert_eq!(vars["orb-b"], "241");
        assert_eq!(vars["section-index"], "0");
        assert_eq!(vars["animation-speed"], "1");
        assert_eq!(vars["parallax-offset-about"], "0");
    }

    #[test]
    fn test_shutdown_cancels_everything() {
        let mut scene = Scene::new(Config::default()).unwrap();
        let mut scheduler = ManualScheduler::new();
        let host = page(0.0);
        scene.start(&host, &mut scheduler).unwrap();
        scene.mount_section("a", &host, &mut scheduler).unwrap();
        scene.mount_section("b", &host, &mut scheduler).unwrap();
        assert_eq!(scheduler.active(), 3);

        scene.shutdown(&mut scheduler);
        assert_eq!(scheduler.active(), 0);
        assert!(!scene.is_started());
        assert_eq!(scene.sections().count(), 0);

        scene.start(&host, &mut scheduler).unwrap();
        assert_eq!(scheduler.active(), 0);
    }
}
