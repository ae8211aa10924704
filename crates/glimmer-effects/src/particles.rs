//! Ambient particle motion.
//!
//! Each particle sits at a random origin and loops forever: glide out to a
//! random polar displacement, glide back to the origin, pick a new
//! displacement. Both legs are linear and last the configured duration.

use std::f32::consts::TAU;

use glimmer_core::{ElementId, ParticlesConfig, Point, Surface, Viewport};
use rand::Rng;
use tracing::debug;

use crate::handle::LoopHandle;

/// Smallest displacement magnitude in pixels.
pub const MIN_DISPLACEMENT: f32 = 50.0;
/// Largest displacement magnitude in pixels.
pub const MAX_DISPLACEMENT: f32 = 150.0;
/// Shortest allowed leg duration: one frame.
pub const MIN_DURATION_MS: u64 = 16;
/// Longest allowed leg duration, about 49 days.
pub const MAX_DURATION_MS: u64 = u32::MAX as u64;

/// Name of the particle container element.
pub const CONTAINER_NAME: &str = "simple-particles";
/// Class of each particle element.
pub const PARTICLE_CLASS: &str = "particle";

/// Leg duration for a `move.speed` value in seconds, clamped between one
/// frame and [`MAX_DURATION_MS`].
pub fn leg_duration_ms(speed_secs: f32) -> u64 {
    let ms = (f64::from(speed_secs) * 1000.0).round();
    // NaN fails both comparisons and is clamped to one frame
    if ms >= MAX_DURATION_MS as f64 {
        MAX_DURATION_MS
    } else if ms >= MIN_DURATION_MS as f64 {
        ms as u64
    } else {
        MIN_DURATION_MS
    }
}

/// Pick a displacement: uniform angle, magnitude in [50, 150].
pub fn random_displacement<R: Rng + ?Sized>(rng: &mut R) -> Point {
    let angle = rng.gen_range(0.0..TAU);
    let magnitude = rng.gen_range(MIN_DISPLACEMENT..=MAX_DISPLACEMENT);
    Point::from_polar(angle, magnitude)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Leg {
    /// Gliding from the origin to `target`.
    Out { start_ms: u64, target: Point },
    /// Gliding from `from` back to the origin.
    Back { start_ms: u64, from: Point },
}

/// One ambient particle.
#[derive(Debug, Clone)]
pub struct Particle {
    /// Resting position in percent of the viewport.
    pub origin: Point,
    pub size: f32,
    pub opacity: f32,
    pub duration_ms: u64,
    /// Current displacement from the origin.
    pub offset: Point,
    leg: Leg,
    cycles: u64,
    element: ElementId,
}

impl Particle {
    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Completed out-and-back cycles.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Whether the particle is on its way out.
    pub fn is_outbound(&self) -> bool {
        matches!(self.leg, Leg::Out { .. })
    }

    /// Current displacement target while outbound.
    pub fn target(&self) -> Option<Point> {
        match self.leg {
            Leg::Out { target, .. } => Some(target),
            Leg::Back { .. } => None,
        }
    }

    fn advance<R: Rng + ?Sized>(&mut self, now_ms: u64, rng: &mut R) {
        let d = self.duration_ms;
        let period = d.saturating_mul(2);

        // Skip whole cycles missed while frames were dropped, from either leg
        let cycle_start = match self.leg {
            Leg::Out { start_ms, .. } => start_ms,
            Leg::Back { start_ms, .. } => start_ms.saturating_sub(d),
        };
        let missed = now_ms.saturating_sub(cycle_start) / period;
        if missed > 0 {
            self.cycles = self.cycles.saturating_add(missed);
            self.offset = Point::ZERO;
            self.leg = Leg::Out {
                start_ms: cycle_start.saturating_add(missed.saturating_mul(period)),
                target: random_displacement(rng),
            };
        }

        loop {
            match self.leg {
                Leg::Out { start_ms, target } => {
                    // A leg ending past the end of time never completes
                    if let Some(end_ms) = start_ms.checked_add(d)
                        && now_ms >= end_ms
                    {
                        self.offset = target;
                        self.leg = Leg::Back {
                            start_ms: end_ms,
                            from: target,
                        };
                    } else {
                        let t = now_ms.saturating_sub(start_ms) as f32 / d as f32;
                        self.offset = target * t;
                        return;
                    }
                }
                Leg::Back { start_ms, from } => {
                    if let Some(end_ms) = start_ms.checked_add(d)
                        && now_ms >= end_ms
                    {
                        // The round trip always lands exactly on the origin
                        self.offset = Point::ZERO;
                        self.cycles = self.cycles.saturating_add(1);
                        self.leg = Leg::Out {
                            start_ms: end_ms,
                            target: random_displacement(rng),
                        };
                    } else {
                        let t = now_ms.saturating_sub(start_ms) as f32 / d as f32;
                        self.offset = from * (1.0 - t);
                        return;
                    }
                }
            }
        }
    }
}

/// The built-in particle layer.
#[derive(Debug)]
pub struct ParticleField {
    container: ElementId,
    particles: Vec<Particle>,
    viewport: Viewport,
    moving: bool,
    handle: LoopHandle,
}

impl ParticleField {
    /// Create the container and `config.number` particles under `parent`.
    pub fn attach<R: Rng + ?Sized>(
        surface: &mut Surface,
        parent: Option<ElementId>,
        config: &ParticlesConfig,
        viewport: Viewport,
        now_ms: u64,
        rng: &mut R,
    ) -> Option<Self> {
        let container = surface.append_named(parent, CONTAINER_NAME, &[])?;
        if let Some(el) = surface.get_mut(container) {
            el.style.width = viewport.width;
            el.style.height = viewport.height;
        }

        let duration_ms = leg_duration_ms(config.motion.speed);
        let shape_class = config.shape.as_str();
        let mut particles = Vec::with_capacity(config.number as usize);

        for _ in 0..config.number {
            let Some(element) = surface.append(Some(container), &[PARTICLE_CLASS, shape_class])
            else {
                continue;
            };
            if let Some(el) = surface.get_mut(element) {
                el.style.width = config.size;
                el.style.height = config.size;
                el.style.color = Some(config.color.clone());
                el.style.opacity = config.opacity;
            }
            particles.push(Particle {
                origin: Point::new(rng.gen_range(0.0..100.0), rng.gen_range(0.0..100.0)),
                size: config.size,
                opacity: config.opacity,
                duration_ms,
                offset: Point::ZERO,
                leg: Leg::Out {
                    start_ms: now_ms,
                    target: random_displacement(rng),
                },
                cycles: 0,
                element,
            });
        }

        debug!(count = particles.len(), duration_ms, "ambient particles attached");
        let mut field = Self {
            container,
            particles,
            viewport,
            moving: config.motion.enable,
            handle: LoopHandle::new("particles"),
        };
        field.write_styles(surface);
        Some(field)
    }

    /// Advance every particle to `now_ms`.
    pub fn update<R: Rng + ?Sized>(&mut self, now_ms: u64, surface: &mut Surface, rng: &mut R) {
        if !self.handle.is_running() || !self.moving {
            return;
        }
        for particle in &mut self.particles {
            particle.advance(now_ms, rng);
        }
        self.write_styles(surface);
    }

    /// Track a new viewport size.
    pub fn resize(&mut self, viewport: Viewport, surface: &mut Surface) {
        self.viewport = viewport;
        if let Some(el) = surface.get_mut(self.container) {
            el.style.width = viewport.width;
            el.style.height = viewport.height;
        }
        self.write_styles(surface);
    }

    fn write_styles(&self, surface: &mut Surface) {
        for particle in &self.particles {
            let origin = self.viewport.percent_to_px(particle.origin);
            if let Some(el) = surface.get_mut(particle.element) {
                el.style.left = origin.x;
                el.style.top = origin.y;
                el.style.translate = particle.offset;
            }
        }
    }

    pub fn container(&self) -> ElementId {
        self.container
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn config(number: u32, speed: f32) -> ParticlesConfig {
        let mut config = ParticlesConfig {
            number,
            ..Default::default()
        };
        config.motion.speed = speed;
        config
    }

    fn field(number: u32, speed: f32) -> (Surface, ParticleField, StdRng) {
        let mut surface = Surface::new();
        let mut rng = StdRng::seed_from_u64(42);
        let field = ParticleField::attach(
            &mut surface,
            None,
            &config(number, speed),
            Viewport::new(800.0, 600.0),
            0,
            &mut rng,
        )
        .unwrap();
        (surface, field, rng)
    }

    #[test]
    fn test_zero_particles() {
        let (surface, field, _) = field(0, 1.0);
        assert!(surface.children(field.container()).is_empty());
        assert!(field.particles().is_empty());
    }

    #[test]
    fn test_one_element_per_particle() {
        let (surface, field, _) = field(12, 1.0);
        assert_eq!(surface.children(field.container()).len(), 12);
        for p in field.particles() {
            assert!((0.0..100.0).contains(&p.origin.x));
            assert!((0.0..100.0).contains(&p.origin.y));
        }
    }

    #[test]
    fn test_duration_clamp() {
        assert_eq!(leg_duration_ms(1.5), 1500);
        assert_eq!(leg_duration_ms(0.0), MIN_DURATION_MS);
        assert_eq!(leg_duration_ms(-3.0), MIN_DURATION_MS);
        assert_eq!(leg_duration_ms(f32::NAN), MIN_DURATION_MS);
        let (_, field, _) = field(1, 0.0);
        assert_eq!(field.particles()[0].duration_ms, MIN_DURATION_MS);
    }

    #[test]
    fn test_duration_clamp_high() {
        assert_eq!(leg_duration_ms(f32::INFINITY), MAX_DURATION_MS);
        assert_eq!(leg_duration_ms(1.0e16), MAX_DURATION_MS);
        assert_eq!(leg_duration_ms(f32::MAX), MAX_DURATION_MS);

        let (mut surface, mut field, mut rng) = field(1, f32::INFINITY);
        field.update(16, &mut surface, &mut rng);
        field.update(u64::MAX, &mut surface, &mut rng);
        let p = &field.particles()[0];
        assert!(p.offset.x.is_finite() && p.offset.y.is_finite());
    }

    #[test]
    fn test_infinite_speed_from_toml() {
        let cfg: ParticlesConfig = toml::from_str("[move]\nspeed = inf\n").unwrap();
        assert!(cfg.motion.speed.is_infinite());
        assert_eq!(leg_duration_ms(cfg.motion.speed), MAX_DURATION_MS);
    }

    #[test]
    fn test_displacement_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let d = random_displacement(&mut rng).distance(Point::ZERO);
            assert!(d >= MIN_DISPLACEMENT - 1e-3 && d <= MAX_DISPLACEMENT + 1e-3);
        }
    }

    #[test]
    fn test_out_and_back() {
        let (mut surface, mut field, mut rng) = field(1, 0.1);
        let target = field.particles()[0].target().unwrap();

        field.update(50, &mut surface, &mut rng);
        let p = &field.particles()[0];
        assert!(p.is_outbound());
        assert!((p.offset.x - target.x * 0.5).abs() < 1e-3);

        field.update(100, &mut surface, &mut rng);
        let p = &field.particles()[0];
        assert!(!p.is_outbound());
        assert_eq!(p.offset, target);

        field.update(150, &mut surface, &mut rng);
        assert!((field.particles()[0].offset.y - target.y * 0.5).abs() < 1e-3);

        field.update(200, &mut surface, &mut rng);
        let p = &field.particles()[0];
        assert_eq!(p.offset, Point::ZERO);
        assert_eq!(p.cycles(), 1);
        assert!(p.is_outbound());

        let el = surface.get(p.element()).unwrap();
        assert_eq!(el.style.translate, Point::ZERO);
    }

    #[test]
    fn test_dropped_frames_land_on_origin() {
        let (mut surface, mut field, mut rng) = field(5, 0.1);
        // Jump forward by exactly ten cycles
        field.update(2000, &mut surface, &mut rng);
        for p in field.particles() {
            assert_eq!(p.cycles(), 10);
            assert_eq!(p.offset, Point::ZERO);
            assert!(p.is_outbound());
        }
    }

    #[test]
    fn test_stall_on_return_leg_skips_cycles() {
        let (mut surface, mut field, mut rng) = field(1, 0.1);
        field.update(150, &mut surface, &mut rng);
        assert!(!field.particles()[0].is_outbound());

        // A long stall mid-return lands on the cycle boundary it implies
        field.update(200 * 50_000 + 50, &mut surface, &mut rng);
        let p = &field.particles()[0];
        assert_eq!(p.cycles(), 50_000);
        assert!(p.is_outbound());
        let target = p.target().unwrap();
        assert!((p.offset.x - target.x * 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_stopped_field_is_frozen() {
        let (mut surface, mut field, mut rng) = field(3, 0.1);
        field.update(50, &mut surface, &mut rng);
        let before: Vec<Point> = field.particles().iter().map(|p| p.offset).collect();
        field.handle().stop();
        field.update(75, &mut surface, &mut rng);
        let after: Vec<Point> = field.particles().iter().map(|p| p.offset).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_motion_disabled() {
        let mut surface = Surface::new();
        let mut rng = StdRng::seed_from_u64(1);
        let mut cfg = config(2, 0.1);
        cfg.motion.enable = false;
        let mut field =
            ParticleField::attach(&mut surface, None, &cfg, Viewport::new(100.0, 100.0), 0, &mut rng)
                .unwrap();
        field.update(50, &mut surface, &mut rng);
        assert!(field.particles().iter().all(|p| p.offset == Point::ZERO));
    }

    #[test]
    fn test_resize_moves_origins() {
        let (mut surface, mut field, _) = field(1, 1.0);
        let p = field.particles()[0].clone();
        field.resize(Viewport::new(400.0, 300.0), &mut surface);
        let el = surface.get(p.element()).unwrap();
        assert!((el.style.left - p.origin.x * 4.0).abs() < 1e-3);
        assert!((el.style.top - p.origin.y * 3.0).abs() < 1e-3);
    }
}
