//! Pluggable particle engines.
//!
//! When an engine is available the stage hands it the particle container
//! and a translated [`EngineConfig`] instead of running the ambient motion.
//! The configuration mirrors the particles.js document layout so external
//! renderers can consume [`EngineConfig::to_json`] directly.

use std::f32::consts::TAU;

use glimmer_core::{
    ElementId, MoveDirection, OutMode, ParticlesConfig, Point, Surface, Viewport,
};
use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::handle::LoopHandle;
use crate::particles::PARTICLE_CLASS;

/// Density reference area.
const DENSITY_AREA: u32 = 800;
/// Maximum distance for linked lines.
const LINK_DISTANCE: f32 = 150.0;
const LINK_OPACITY: f32 = 0.4;
const REPULSE_DISTANCE: f32 = 100.0;
const REPULSE_DURATION: f32 = 0.4;
/// Particles added per click.
const PUSH_COUNT: u32 = 4;

/// Reference frame length for engine speeds.
const FRAME_MS: f32 = 1000.0 / 60.0;

/// Class of linked-line elements.
pub const LINK_CLASS: &str = "particle-link";

/// A particle renderer the stage can delegate to.
pub trait ParticleEngine: std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// Populate `container` according to `config`.
    fn load(
        &mut self,
        container: ElementId,
        config: &EngineConfig,
        viewport: Viewport,
        surface: &mut Surface,
        rng: &mut StdRng,
    );

    /// Advance to `now_ms`.
    fn update(&mut self, now_ms: u64, surface: &mut Surface, rng: &mut StdRng);

    fn pointer_move(&mut self, _p: Point) {}

    fn click(&mut self, _p: Point, _surface: &mut Surface, _rng: &mut StdRng) {}

    fn resize(&mut self, _viewport: Viewport) {}

    fn handle(&self) -> LoopHandle;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Density {
    pub enable: bool,
    pub value_area: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Number {
    pub value: u32,
    pub density: Density,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorValue {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomValue {
    pub value: f32,
    pub random: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineLinked {
    pub enable: bool,
    pub distance: f32,
    pub color: String,
    pub opacity: f32,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Move {
    pub enable: bool,
    pub speed: f32,
    pub direction: MoveDirection,
    pub random: bool,
    pub straight: bool,
    pub out_mode: OutMode,
    pub bounce: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particles {
    pub number: Number,
    pub color: ColorValue,
    pub shape: Shape,
    pub opacity: RandomValue,
    pub size: RandomValue,
    pub line_linked: LineLinked,
    #[serde(rename = "move")]
    pub motion: Move,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeToggle {
    pub enable: bool,
    pub mode: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Events {
    pub onhover: ModeToggle,
    pub onclick: ModeToggle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repulse {
    pub distance: f32,
    pub duration: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Push {
    pub particles_nb: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modes {
    pub repulse: Repulse,
    pub push: Push,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interactivity {
    pub detect_on: String,
    pub events: Events,
    pub modes: Modes,
}

/// Engine-facing particle configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub particles: Particles,
    pub interactivity: Interactivity,
    pub retina_detect: bool,
}

impl EngineConfig {
    /// Translate the page's particle section.
    pub fn translate(config: &ParticlesConfig) -> Self {
        let m = &config.motion;
        Self {
            particles: Particles {
                number: Number {
                    value: config.number,
                    density: Density {
                        enable: true,
                        value_area: DENSITY_AREA,
                    },
                },
                color: ColorValue {
                    value: config.color.clone(),
                },
                shape: Shape {
                    kind: config.shape.as_str().to_string(),
                },
                opacity: RandomValue {
                    value: config.opacity,
                    random: false,
                },
                size: RandomValue {
                    value: config.size,
                    random: true,
                },
                line_linked: LineLinked {
                    enable: true,
                    distance: LINK_DISTANCE,
                    color: config.color.clone(),
                    opacity: LINK_OPACITY,
                    width: 1.0,
                },
                motion: Move {
                    enable: m.enable,
                    speed: m.speed,
                    direction: m.direction,
                    random: m.random,
                    straight: m.straight,
                    out_mode: m.out_mode,
                    bounce: m.bounce,
                },
            },
            interactivity: Interactivity {
                detect_on: "canvas".to_string(),
                events: Events {
                    onhover: ModeToggle {
                        enable: true,
                        mode: "repulse".to_string(),
                    },
                    onclick: ModeToggle {
                        enable: true,
                        mode: "push".to_string(),
                    },
                },
                modes: Modes {
                    repulse: Repulse {
                        distance: REPULSE_DISTANCE,
                        duration: REPULSE_DURATION,
                    },
                    push: Push {
                        particles_nb: PUSH_COUNT,
                    },
                },
            },
            retina_detect: true,
        }
    }

    /// The particles.js style JSON document.
    pub fn to_json(&self) -> serde_json::Value {
        // Plain data structs always serialize
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[derive(Debug, Clone)]
struct Body {
    pos: Point,
    vel: Point,
    /// Speed the wobbling heading is held to.
    speed: f32,
    radius: f32,
    element: ElementId,
}

/// Built-in physics engine: drifting particles with linked lines,
/// hover repulsion and push-on-click.
#[derive(Debug)]
pub struct DriftEngine {
    config: Option<EngineConfig>,
    container: Option<ElementId>,
    bodies: Vec<Body>,
    links: Vec<ElementId>,
    viewport: Viewport,
    pointer: Option<Point>,
    last_update_ms: Option<u64>,
    handle: LoopHandle,
}

impl Default for DriftEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DriftEngine {
    pub fn new() -> Self {
        Self {
            config: None,
            container: None,
            bodies: Vec::new(),
            links: Vec::new(),
            viewport: Viewport::default(),
            pointer: None,
            last_update_ms: None,
            handle: LoopHandle::new("particle-engine"),
        }
    }

    /// Number of live particles.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Positions of every particle.
    pub fn positions(&self) -> Vec<Point> {
        self.bodies.iter().map(|b| b.pos).collect()
    }

    /// Number of linked lines drawn in the last update.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    fn spawn(&mut self, pos: Point, surface: &mut Surface, rng: &mut StdRng) {
        let (Some(config), Some(container)) = (self.config.as_ref(), self.container) else {
            return;
        };
        let p = &config.particles;
        let classes = [PARTICLE_CLASS, p.shape.kind.as_str()];
        let Some(element) = surface.append(Some(container), &classes) else {
            return;
        };

        let size = if p.size.random {
            rng.gen_range(0.0..=1.0f32).max(0.1) * p.size.value
        } else {
            p.size.value
        };
        if let Some(el) = surface.get_mut(element) {
            el.style.width = size;
            el.style.height = size;
            el.style.color = Some(p.color.value.clone());
            el.style.opacity = p.opacity.value;
        }

        let vel = initial_velocity(&p.motion, rng);
        self.bodies.push(Body {
            pos,
            vel,
            speed: vel.distance(Point::ZERO),
            radius: size / 2.0,
            element,
        });
    }

    fn step(&mut self, dt_frames: f32, rng: &mut StdRng) {
        let Some(config) = self.config.as_ref() else {
            return;
        };
        let motion = &config.particles.motion;
        if !motion.enable {
            return;
        }
        let (w, h) = (self.viewport.width, self.viewport.height);

        for body in &mut self.bodies {
            if !motion.straight {
                body.vel += Point::new(rng.gen_range(-0.05..0.05), rng.gen_range(-0.05..0.05));
                let len = body.vel.distance(Point::ZERO);
                if len > 0.0 {
                    body.vel = body.vel * (body.speed / len);
                }
            }
            body.pos += body.vel * dt_frames;

            // Hover repulsion
            if let Some(pointer) = self.pointer {
                let d = body.pos.distance(pointer);
                if d > 0.0 && d < REPULSE_DISTANCE {
                    let push = (REPULSE_DISTANCE - d) / REPULSE_DISTANCE;
                    body.pos += (body.pos - pointer) * (push / d * 4.0 * dt_frames);
                }
            }

            match motion.out_mode {
                OutMode::Out => {
                    if body.pos.x < -body.radius {
                        body.pos.x = w + body.radius;
                    } else if body.pos.x > w + body.radius {
                        body.pos.x = -body.radius;
                    }
                    if body.pos.y < -body.radius {
                        body.pos.y = h + body.radius;
                    } else if body.pos.y > h + body.radius {
                        body.pos.y = -body.radius;
                    }
                }
                OutMode::Bounce => {
                    if body.pos.x < 0.0 || body.pos.x > w {
                        body.vel.x = -body.vel.x;
                        body.pos.x = body.pos.x.clamp(0.0, w);
                    }
                    if body.pos.y < 0.0 || body.pos.y > h {
                        body.vel.y = -body.vel.y;
                        body.pos.y = body.pos.y.clamp(0.0, h);
                    }
                }
            }
        }

        if motion.bounce {
            self.collide();
        }
    }

    /// Swap velocities of overlapping particles.
    fn collide(&mut self) {
        let n = self.bodies.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (a, b) = (&self.bodies[i], &self.bodies[j]);
                if a.pos.distance(b.pos) < a.radius + b.radius {
                    let (va, sa) = (a.vel, a.speed);
                    self.bodies[i].vel = self.bodies[j].vel;
                    self.bodies[i].speed = self.bodies[j].speed;
                    self.bodies[j].vel = va;
                    self.bodies[j].speed = sa;
                }
            }
        }
    }

    fn write_styles(&mut self, surface: &mut Surface) {
        for body in &self.bodies {
            if let Some(el) = surface.get_mut(body.element) {
                el.style.left = body.pos.x - body.radius;
                el.style.top = body.pos.y - body.radius;
            }
        }

        // Link elements are restyled in place; only the surplus is removed
        let mut used = 0;
        if let (Some(config), Some(container)) = (self.config.as_ref(), self.container)
            && config.particles.line_linked.enable
        {
            let linked = &config.particles.line_linked;
            for (i, a) in self.bodies.iter().enumerate() {
                for b in &self.bodies[i + 1..] {
                    let d = a.pos.distance(b.pos);
                    if d >= linked.distance {
                        continue;
                    }
                    let id = match self.links.get(used) {
                        Some(&id) => id,
                        None => {
                            let Some(id) = surface.append(Some(container), &[LINK_CLASS]) else {
                                continue;
                            };
                            self.links.push(id);
                            id
                        }
                    };
                    if let Some(el) = surface.get_mut(id) {
                        // A line from (left, top) spanning (width, height)
                        el.style.left = a.pos.x;
                        el.style.top = a.pos.y;
                        el.style.width = b.pos.x - a.pos.x;
                        el.style.height = b.pos.y - a.pos.y;
                        el.style.color = Some(linked.color.clone());
                        el.style.opacity = linked.opacity * (1.0 - d / linked.distance);
                    }
                    used += 1;
                }
            }
        }
        for link in self.links.drain(used..) {
            surface.remove(link);
        }
    }
}

/// Starting velocity in pixels per frame.
fn initial_velocity(motion: &Move, rng: &mut StdRng) -> Point {
    let speed = if motion.random {
        motion.speed * rng.gen_range(0.0..=1.0f32)
    } else {
        motion.speed
    };
    let heading = match motion.direction.heading() {
        Some((x, y)) => Point::new(x, y),
        None => Point::from_polar(rng.gen_range(0.0..TAU), 1.0),
    };
    let mut vel = heading * speed;
    if !motion.straight {
        vel += Point::new(rng.gen_range(-0.5..0.5), rng.gen_range(-0.5..0.5)) * speed.min(1.0);
    }
    vel
}

impl ParticleEngine for DriftEngine {
    fn name(&self) -> &'static str {
        "drift"
    }

    fn load(
        &mut self,
        container: ElementId,
        config: &EngineConfig,
        viewport: Viewport,
        surface: &mut Surface,
        rng: &mut StdRng,
    ) {
        self.config = Some(config.clone());
        self.container = Some(container);
        self.viewport = viewport;
        for _ in 0..config.particles.number.value {
            let pos = Point::new(
                rng.gen_range(0.0..viewport.width.max(1.0)),
                rng.gen_range(0.0..viewport.height.max(1.0)),
            );
            self.spawn(pos, surface, rng);
        }
        self.write_styles(surface);
        debug!(count = self.bodies.len(), "drift engine loaded");
    }

    fn update(&mut self, now_ms: u64, surface: &mut Surface, rng: &mut StdRng) {
        if !self.handle.is_running() {
            return;
        }
        let dt_ms = match self.last_update_ms {
            Some(last) => now_ms.saturating_sub(last),
            None => 0,
        };
        self.last_update_ms = Some(now_ms);
        self.step(dt_ms as f32 / FRAME_MS, rng);
        self.write_styles(surface);
    }

    fn pointer_move(&mut self, p: Point) {
        self.pointer = Some(p);
    }

    fn click(&mut self, p: Point, surface: &mut Surface, rng: &mut StdRng) {
        if !self.handle.is_running() {
            return;
        }
        let count = self
            .config
            .as_ref()
            .map(|c| c.interactivity.modes.push.particles_nb)
            .unwrap_or(0);
        for _ in 0..count {
            self.spawn(p, surface, rng);
        }
        self.write_styles(surface);
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }
}
