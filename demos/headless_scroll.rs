//! Scrolls a simulated page from top to bottom on a calloop event loop and
//! logs every color change. Run with `RUST_LOG=info`.

use std::time::{Duration, Instant};

use scrollglow::prelude::*;

const SECTIONS: [(&str, f64); 9] = [
    ("welcome", 0.0),
    ("who-i-am", 1000.0),
    ("tech-stack", 2000.0),
    ("notable-work", 3000.0),
    ("education", 4000.0),
    ("experience", 5000.0),
    ("beyond-code", 6000.0),
    ("whats-next", 7000.0),
    ("contact", 8000.0),
];

struct SimulatedPage {
    started: Instant,
    scroll_for: Duration,
    settle_for: Duration,
    scroll_top: f64,
}

impl SimulatedPage {
    const VIEWPORT: f64 = 1000.0;
    const DOCUMENT: f64 = 9000.0;
}

impl ScrollHost for SimulatedPage {
    fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics::new(self.scroll_top, Self::DOCUMENT, Self::VIEWPORT)
    }

    fn section_rect(&self, name: &str) -> Option<SectionRect> {
        SECTIONS
            .iter()
            .find(|(section, _)| *section == name)
            .map(|(_, top)| SectionRect::new(top - self.scroll_top, Self::VIEWPORT))
    }

    fn poll(&mut self) {
        let t = (self.started.elapsed().as_secs_f64() / self.scroll_for.as_secs_f64()).min(1.0);
        // Jumpy input on purpose: the page advances in 250px notches
        let max_scroll = Self::DOCUMENT - Self::VIEWPORT;
        self.scroll_top = ((t * max_scroll) / 250.0).floor() * 250.0;
    }

    fn is_running(&self) -> bool {
        self.started.elapsed() < self.scroll_for + self.settle_for
    }
}

fn main() -> anyhow::Result<()> {
    let config = Config::load_default()?;
    let scene = Scene::new(config)?;

    let _colors = scene.published().color.subscribe(|color| {
        log::info!("orb color rgb({}, {}, {})", color.r, color.g, color.b);
    });
    let _sections = scene.published().section_index.subscribe(|index| {
        log::info!("active section {}", SECTIONS[(*index).min(SECTIONS.len() - 1)].0);
    });

    let page = SimulatedPage {
        started: Instant::now(),
        scroll_for: Duration::from_secs(4),
        settle_for: Duration::from_secs(2),
        scroll_top: 0.0,
    };
    let names: Vec<&str> = SECTIONS.iter().map(|(name, _)| *name).collect();
    let snapshot = scene.run(page, &names)?;

    for (name, value) in snapshot.vars() {
        println!("--{}: {}", name, value);
    }
    println!("fps: {}", snapshot.fps);
    Ok(())
}
