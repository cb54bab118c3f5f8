//! Drives a scene by hand, one frame at a time, and prints the published
//! values as the displayed progress catches up with a sudden jump.

use std::collections::HashMap;

use scrollglow::prelude::*;

#[derive(Default)]
struct Page {
    scroll_top: f64,
    rects: HashMap<String, SectionRect>,
}

impl ScrollHost for Page {
    fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics::new(self.scroll_top, 5000.0, 1000.0)
    }

    fn section_rect(&self, name: &str) -> Option<SectionRect> {
        self.rects.get(name).copied()
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut scheduler = ManualScheduler::new();
    let mut scene = Scene::new(Config::default())?;
    let mut page = Page::default();
    page.rects
        .insert("projects".to_string(), SectionRect::new(1400.0, 800.0));

    scene.start(&page, &mut scheduler)?;
    let projects = scene.mount_section("projects", &page, &mut scheduler)?;
    let offset = scene
        .section_offset(projects)
        .ok_or_else(|| anyhow::anyhow!("section vanished"))?;

    // Jump halfway down the page in a single event
    page.scroll_top = 2000.0;
    page.rects
        .insert("projects".to_string(), SectionRect::new(-600.0, 800.0));
    scene.on_scroll(&page);

    for frame in 1..=60 {
        scheduler.run_frame();
        if frame % 10 == 0 {
            let color = scene.published().color.get();
            println!(
                "frame {:>2}: {:>6.2}%  rgb({:>3}, {:>3}, {:>3})  offset {:>7.3}",
                frame,
                scene.published().percent.get(),
                color.r,
                color.g,
                color.b,
                offset.get()
            );
        }
    }

    scene.set_tuning(Tuning {
        brightness: 0.6,
        ..Tuning::default()
    })?;
    scheduler.run_frame();
    println!("dimmed: {:?}", scene.published().color.get());

    scene.shutdown(&mut scheduler);
    Ok(())
}
