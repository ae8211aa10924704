//! Core types shared by the glimmer crates.
//!
//! This crate holds the effect configuration, the color theme and the
//! in-memory [`Surface`] element tree that every effect mutates and the
//! renderer draws.

mod config;
mod geometry;
mod surface;
mod theme;

pub use config::{
    ClickEffectConfig, EffectsConfig, MoveConfig, MoveDirection, NeonGlowConfig, OutMode,
    ParticleShape, ParticlesConfig, StarrySkyConfig, TypewriterConfig,
};
pub use geometry::{Point, Viewport};
pub use surface::{
    Element, ElementId, ElementStyle, MutationRecord, Subscription, Surface, THEME_ATTRIBUTE,
};
pub use theme::Theme;
