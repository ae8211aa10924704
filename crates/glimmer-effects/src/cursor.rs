//! Cursor dot and halo that chase the pointer with exponential smoothing.

use glimmer_core::{ElementId, Point, Surface};
use tracing::debug;

use crate::handle::LoopHandle;

/// Fraction of the remaining distance the dot closes each frame.
pub const DOT_FACTOR: f32 = 0.5;
/// Fraction of the remaining distance the halo closes each frame.
pub const HALO_FACTOR: f32 = 0.1;

const DOT_SIZE: f32 = 20.0;
const HALO_SIZE: f32 = 40.0;

const DOT_BORDER: &str = "rgba(79, 192, 245, 0.5)";
const DOT_BORDER_HOVER: &str = "rgba(73, 177, 245, 0.8)";
const HALO_FILL: &str = "rgba(79, 192, 245, 0.1)";

const DOT_HOVER_SCALE: f32 = 1.5;
const HALO_HOVER_SCALE: f32 = 1.2;

/// Class of the fast cursor proxy.
pub const DOT_CLASS: &str = "tech-cursor";
/// Class of the slow cursor proxy.
pub const HALO_CLASS: &str = "tech-cursor-follower";

/// One step of exponential smoothing from `pos` towards `target`.
pub fn smooth(pos: Point, target: Point, factor: f32) -> Point {
    pos + (target - pos) * factor
}

/// A visual element trailing the pointer.
#[derive(Debug, Clone)]
pub struct Proxy {
    /// Current rendered center.
    pub pos: Point,
    factor: f32,
    size: f32,
    element: ElementId,
}

impl Proxy {
    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    fn step(&mut self, target: Point, surface: &mut Surface) {
        self.pos = smooth(self.pos, target, self.factor);
        if let Some(el) = surface.get_mut(self.element) {
            el.style.left = self.pos.x - self.size / 2.0;
            el.style.top = self.pos.y - self.size / 2.0;
        }
    }
}

/// Drives the cursor dot and halo toward the latest pointer sample.
#[derive(Debug)]
pub struct CursorAnimator {
    /// Latest pointer position, last write wins.
    pointer: Point,
    dot: Proxy,
    halo: Proxy,
    hovering: bool,
    handle: LoopHandle,
}

impl CursorAnimator {
    /// Create the two proxy elements under `parent`.
    pub fn attach(surface: &mut Surface, parent: Option<ElementId>) -> Option<Self> {
        let dot_id = surface.append(parent, &[DOT_CLASS])?;
        let halo_id = surface.append(parent, &[HALO_CLASS])?;

        if let Some(el) = surface.get_mut(dot_id) {
            el.style.width = DOT_SIZE;
            el.style.height = DOT_SIZE;
            el.style.border_color = Some(DOT_BORDER.to_string());
        }
        if let Some(el) = surface.get_mut(halo_id) {
            el.style.width = HALO_SIZE;
            el.style.height = HALO_SIZE;
            el.style.color = Some(HALO_FILL.to_string());
        }

        debug!("cursor proxies attached");
        Some(Self {
            pointer: Point::ZERO,
            dot: Proxy {
                pos: Point::ZERO,
                factor: DOT_FACTOR,
                size: DOT_SIZE,
                element: dot_id,
            },
            halo: Proxy {
                pos: Point::ZERO,
                factor: HALO_FACTOR,
                size: HALO_SIZE,
                element: halo_id,
            },
            hovering: false,
            handle: LoopHandle::new("cursor"),
        })
    }

    /// Record a pointer sample.
    pub fn pointer_move(&mut self, p: Point) {
        self.pointer = p;
    }

    pub fn pointer(&self) -> Point {
        self.pointer
    }

    /// Advance both proxies by one frame.
    pub fn tick(&mut self, surface: &mut Surface) {
        if !self.handle.is_running() {
            return;
        }
        self.dot.step(self.pointer, surface);
        self.halo.step(self.pointer, surface);
    }

    /// Grow the proxies while the pointer is over something interactive.
    pub fn set_hover(&mut self, hovering: bool, surface: &mut Surface) {
        if hovering == self.hovering || !self.handle.is_running() {
            return;
        }
        self.hovering = hovering;

        let (dot_scale, halo_scale, border) = if hovering {
            (DOT_HOVER_SCALE, HALO_HOVER_SCALE, DOT_BORDER_HOVER)
        } else {
            (1.0, 1.0, DOT_BORDER)
        };
        if let Some(el) = surface.get_mut(self.dot.element) {
            el.style.scale = dot_scale;
            el.style.border_color = Some(border.to_string());
        }
        if let Some(el) = surface.get_mut(self.halo.element) {
            el.style.scale = halo_scale;
        }
    }

    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    pub fn dot(&self) -> &Proxy {
        &self.dot
    }

    pub fn halo(&self) -> &Proxy {
        &self.halo
    }

    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn animator() -> (Surface, CursorAnimator) {
        let mut surface = Surface::new();
        let cursor = CursorAnimator::attach(&mut surface, None).unwrap();
        (surface, cursor)
    }

    #[test]
    fn test_starts_at_origin() {
        let (mut surface, mut cursor) = animator();
        cursor.tick(&mut surface);
        assert_eq!(cursor.dot().pos, Point::ZERO);
        assert_eq!(cursor.halo().pos, Point::ZERO);
    }

    #[test]
    fn test_single_tick() {
        let (mut surface, mut cursor) = animator();
        cursor.pointer_move(Point::new(100.0, 40.0));
        cursor.tick(&mut surface);

        assert_eq!(cursor.dot().pos, Point::new(50.0, 20.0));
        assert_eq!(cursor.halo().pos, Point::new(10.0, 4.0));

        // Elements are positioned by their top-left corner
        let dot = surface.get(cursor.dot().element()).unwrap();
        assert_eq!(dot.style.left, 40.0);
        assert_eq!(dot.style.top, 10.0);
        let halo = surface.get(cursor.halo().element()).unwrap();
        assert_eq!(halo.style.left, -10.0);
    }

    #[test]
    fn test_last_sample_wins() {
        let (mut surface, mut cursor) = animator();
        cursor.pointer_move(Point::new(500.0, 500.0));
        cursor.pointer_move(Point::new(10.0, 0.0));
        cursor.tick(&mut surface);
        assert_eq!(cursor.dot().pos, Point::new(5.0, 0.0));
    }

    #[test]
    fn test_distance_strictly_decreases() {
        let (mut surface, mut cursor) = animator();
        let target = Point::new(100.0, 0.0);
        cursor.pointer_move(target);

        let mut last = cursor.halo().pos.distance(target);
        for _ in 0..10 {
            cursor.tick(&mut surface);
            let d = cursor.halo().pos.distance(target);
            assert!(d < last);
            assert!(d > 0.0);
            last = d;
        }
    }

    #[test]
    fn test_stopped_handle_freezes_proxies() {
        let (mut surface, mut cursor) = animator();
        cursor.pointer_move(Point::new(100.0, 100.0));
        cursor.tick(&mut surface);
        let before = cursor.dot().pos;

        cursor.handle().stop();
        cursor.tick(&mut surface);
        assert_eq!(cursor.dot().pos, before);
    }

    #[test]
    fn test_hover_scales_proxies() {
        let (mut surface, mut cursor) = animator();
        cursor.set_hover(true, &mut surface);
        let dot = surface.get(cursor.dot().element()).unwrap();
        assert_eq!(dot.style.scale, DOT_HOVER_SCALE);
        assert_eq!(dot.style.border_color.as_deref(), Some(DOT_BORDER_HOVER));
        let halo = surface.get(cursor.halo().element()).unwrap();
        assert_eq!(halo.style.scale, HALO_HOVER_SCALE);

        cursor.set_hover(false, &mut surface);
        let dot = surface.get(cursor.dot().element()).unwrap();
        assert_eq!(dot.style.scale, 1.0);
        assert!(!cursor.is_hovering());
    }

    proptest! {
        #[test]
        fn prop_geometric_convergence(
            factor in 0.05f32..0.95,
            start_x in -1000.0f32..1000.0,
            start_y in -1000.0f32..1000.0,
            target_x in -1000.0f32..1000.0,
            target_y in -1000.0f32..1000.0,
            n in 0u32..30,
        ) {
            let target = Point::new(target_x, target_y);
            let start = Point::new(start_x, start_y);
            let mut pos = start;
            for _ in 0..n {
                pos = smooth(pos, target, factor);
            }

            let expected = start.distance(target) * (1.0 - factor).powi(n as i32);
            let actual = pos.distance(target);
            prop_assert!((actual - expected).abs() <= 1e-2 + expected * 1e-3);
        }
    }
}
