//! Click ripples.

use glimmer_core::{ClickEffectConfig, ElementId, Point, Surface, Theme};
use rand::Rng;
use tracing::trace;

use crate::handle::LoopHandle;

/// How long a ripple stays on the surface.
pub const RIPPLE_LIFETIME_MS: u64 = 600;
const MIN_SIZE: f32 = 50.0;
const SIZE_RANGE: f32 = 100.0;

/// Class of ripple elements.
pub const RIPPLE_CLASS: &str = "ripple";

#[derive(Debug, Clone, Copy)]
struct Ripple {
    element: ElementId,
    created_ms: u64,
}

/// Spawns a ripple per click and removes each one after its lifetime.
#[derive(Debug)]
pub struct RippleLayer {
    config: Option<ClickEffectConfig>,
    parent: Option<ElementId>,
    ripples: Vec<Ripple>,
    handle: LoopHandle,
}

impl RippleLayer {
    pub fn new(config: Option<ClickEffectConfig>, parent: Option<ElementId>) -> Self {
        Self {
            config,
            parent,
            ripples: Vec::new(),
            handle: LoopHandle::new("ripple"),
        }
    }

    /// Spawn a ripple centred on `p` unless click effects are disabled.
    pub fn click<R: Rng + ?Sized>(
        &mut self,
        p: Point,
        now_ms: u64,
        theme: Theme,
        surface: &mut Surface,
        rng: &mut R,
    ) -> Option<ElementId> {
        let config = self.config.as_ref().filter(|c| c.enable)?;
        if !self.handle.is_running() {
            return None;
        }

        let size = rng.gen_range(0.0..1.0f32) * SIZE_RANGE + MIN_SIZE;
        let color = match theme {
            Theme::Dark => config.dark.clone(),
            Theme::Light => config.light.clone(),
        };

        let element = surface.append(self.parent, &[RIPPLE_CLASS])?;
        if let Some(el) = surface.get_mut(element) {
            el.style.width = size;
            el.style.height = size;
            el.style.left = p.x - size / 2.0;
            el.style.top = p.y - size / 2.0;
            el.style.color = Some(color);
            el.style.scale = 0.0;
        }
        trace!(?element, size, "ripple spawned");

        self.ripples.push(Ripple {
            element,
            created_ms: now_ms,
        });
        Some(element)
    }

    /// Expand live ripples and remove the expired ones.
    pub fn update(&mut self, now_ms: u64, surface: &mut Surface) {
        if !self.handle.is_running() {
            return;
        }
        self.ripples.retain(|ripple| {
            let age = now_ms.saturating_sub(ripple.created_ms);
            if age >= RIPPLE_LIFETIME_MS {
                surface.remove(ripple.element);
                return false;
            }
            if let Some(el) = surface.get_mut(ripple.element) {
                let progress = age as f32 / RIPPLE_LIFETIME_MS as f32;
                el.style.scale = progress;
                el.style.opacity = 1.0 - progress;
            }
            true
        });
    }

    /// Number of ripples currently on the surface.
    pub fn live(&self) -> usize {
        self.ripples.len()
    }

    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }
}
