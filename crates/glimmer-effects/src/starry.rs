//! Starry sky: randomly placed twinkling stars.

use glimmer_core::{ElementId, Point, StarrySkyConfig, Surface, Viewport};
use rand::Rng;
use tracing::debug;

use crate::handle::LoopHandle;

/// Class of the star container.
pub const CONTAINER_CLASS: &str = "starry-sky";
/// Class of each star.
pub const STAR_CLASS: &str = "star";

/// Opacity at the start and end of a twinkle.
const TWINKLE_MIN: f32 = 0.3;

/// A single star.
#[derive(Debug, Clone)]
pub struct Star {
    /// Position in percent of the viewport.
    pub position: Point,
    /// Size in pixels (0.0 - 3.0).
    pub size: f32,
    /// Length of one twinkle.
    pub period_ms: u64,
    /// Delay before the first twinkle.
    pub delay_ms: u64,
    element: ElementId,
}

impl Star {
    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Opacity `elapsed_ms` after the sky was created.
    ///
    /// The twinkle ramps from 0.3 to 1.0 at mid-period and back. Before the
    /// delay has passed the star shows at full opacity.
    pub fn opacity_at(&self, elapsed_ms: u64) -> f32 {
        if elapsed_ms < self.delay_ms {
            return 1.0;
        }
        let phase = ((elapsed_ms - self.delay_ms) % self.period_ms) as f32 / self.period_ms as f32;
        let ramp = 1.0 - (phase * 2.0 - 1.0).abs();
        TWINKLE_MIN + (1.0 - TWINKLE_MIN) * ramp
    }
}

/// Twinkling star background.
#[derive(Debug)]
pub struct StarrySky {
    container: ElementId,
    stars: Vec<Star>,
    viewport: Viewport,
    start_ms: u64,
    handle: LoopHandle,
}

impl StarrySky {
    pub fn attach<R: Rng + ?Sized>(
        surface: &mut Surface,
        parent: Option<ElementId>,
        config: &StarrySkyConfig,
        viewport: Viewport,
        now_ms: u64,
        rng: &mut R,
    ) -> Option<Self> {
        let container = surface.append(parent, &[CONTAINER_CLASS])?;
        let mut stars = Vec::with_capacity(config.star_count as usize);

        for _ in 0..config.star_count {
            let Some(element) = surface.append(Some(container), &[STAR_CLASS]) else {
                continue;
            };
            let size = rng.gen_range(0.0..3.0);
            if let Some(el) = surface.get_mut(element) {
                el.style.width = size;
                el.style.height = size;
                el.style.color = Some(config.star_color.clone());
            }
            stars.push(Star {
                position: Point::new(rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)),
                size,
                period_ms: rng.gen_range(1000..4000),
                delay_ms: rng.gen_range(0..3000),
                element,
            });
        }

        debug!(count = stars.len(), "starry sky attached");
        let mut sky = Self {
            container,
            stars,
            viewport,
            start_ms: now_ms,
            handle: LoopHandle::new("starry-sky"),
        };
        sky.update(now_ms, surface);
        Some(sky)
    }

    pub fn update(&mut self, now_ms: u64, surface: &mut Surface) {
        if !self.handle.is_running() {
            return;
        }
        let elapsed = now_ms.saturating_sub(self.start_ms);
        for star in &self.stars {
            let pos = self.viewport.percent_to_px(star.position);
            if let Some(el) = surface.get_mut(star.element) {
                el.style.left = pos.x;
                el.style.top = pos.y;
                el.style.opacity = star.opacity_at(elapsed);
            }
        }
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn container(&self) -> ElementId {
        self.container
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }
}
