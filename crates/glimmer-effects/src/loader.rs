//! Loading screen fade-out.

use glimmer_core::{ElementId, Surface};
use tracing::debug;

/// Name of the loading screen element.
pub const LOADING_NAME: &str = "loading-box";
/// Delay between the page load and the start of the fade.
pub const FADE_DELAY_MS: u64 = 1000;
/// Length of the fade.
pub const FADE_MS: u64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Waiting { fade_at: u64 },
    Fading { start: u64 },
    Removed,
}

/// Fades out and removes the loading screen after the page loads.
#[derive(Debug)]
pub struct LoadingScreen {
    element: ElementId,
    phase: Phase,
}

impl LoadingScreen {
    /// Schedule the fade if a loading screen exists.
    pub fn on_load(surface: &Surface, now_ms: u64) -> Option<Self> {
        let element = surface.find_by_name(LOADING_NAME)?;
        debug!("loading screen scheduled to fade");
        Some(Self {
            element,
            phase: Phase::Waiting {
                fade_at: now_ms + FADE_DELAY_MS,
            },
        })
    }

    pub fn update(&mut self, now_ms: u64, surface: &mut Surface) {
        loop {
            match self.phase {
                Phase::Waiting { fade_at } if now_ms >= fade_at => {
                    self.phase = Phase::Fading { start: fade_at };
                }
                Phase::Fading { start } if now_ms >= start + FADE_MS => {
                    surface.remove(self.element);
                    self.phase = Phase::Removed;
                }
                Phase::Fading { start } => {
                    let t = (now_ms - start) as f32 / FADE_MS as f32;
                    if let Some(el) = surface.get_mut(self.element) {
                        el.style.opacity = 1.0 - t;
                    }
                    break;
                }
                _ => break,
            }
        }
    }

    pub fn is_removed(&self) -> bool {
        self.phase == Phase::Removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_loading_box() {
        let surface = Surface::new();
        assert!(LoadingScreen::on_load(&surface, 0).is_none());
    }

    #[test]
    fn test_fade_then_remove() {
        let mut surface = Surface::new();
        let id = surface.append_named(None, LOADING_NAME, &[]).unwrap();
        let mut loader = LoadingScreen::on_load(&surface, 100).unwrap();

        loader.update(1099, &mut surface);
        assert_eq!(surface.get(id).unwrap().style.opacity, 1.0);

        loader.update(1350, &mut surface);
        assert!((surface.get(id).unwrap().style.opacity - 0.5).abs() < 1e-6);

        loader.update(1599, &mut surface);
        assert!(surface.contains(id));
        loader.update(1600, &mut surface);
        assert!(!surface.contains(id));
        assert!(loader.is_removed());
    }
}
