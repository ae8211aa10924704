//! Decorative effects for glimmer.
//!
//! This crate provides the effects themselves (cursor trail, ambient and
//! physics particles, starry sky, click ripples, typewriter text, header
//! gradient, neon titles, loading screen fade), the [`Stage`] that wires
//! them onto one surface, and a ratatui renderer for that surface.

mod chars;
mod color;
mod cursor;
mod decor;
mod engine;
mod handle;
mod loader;
mod particles;
mod render;
mod ripple;
mod stage;
mod starry;
mod theme_watch;
mod typewriter;

pub use color::{Rgba, fade, hsl_to_rgb, parse_color};
pub use cursor::{CursorAnimator, DOT_FACTOR, HALO_FACTOR, Proxy, smooth};
pub use decor::{apply_animated_gradient, apply_neon_glow};
pub use engine::{DriftEngine, EngineConfig, ParticleEngine};
pub use handle::LoopHandle;
pub use loader::LoadingScreen;
pub use particles::{Particle, ParticleField, leg_duration_ms, random_displacement};
pub use render::{
    CELL_HEIGHT_PX, CELL_WIDTH_PX, Canvas, cell_to_px, px_to_cell, rasterize, render_surface,
    viewport_for,
};
pub use ripple::{RIPPLE_LIFETIME_MS, RippleLayer};
pub use stage::{ParticleLayer, Stage, StageOptions};
pub use starry::{Star, StarrySky};
pub use theme_watch::ThemeWatcher;
pub use typewriter::Typewriter;
