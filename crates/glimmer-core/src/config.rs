//! Effect configuration.
//!
//! Every section is optional. A section missing from a configuration file
//! deserializes to `None` and the corresponding effect never initializes.
//! [`EffectsConfig::default`] enables everything with the stock values.

use serde::{Deserialize, Serialize};

/// Configuration for every effect, injected into the stage at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub particles: Option<ParticlesConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starry_sky: Option<StarrySkyConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typewriter: Option<TypewriterConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neon_glow: Option<NeonGlowConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub click_effect: Option<ClickEffectConfig>,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            particles: Some(ParticlesConfig::default()),
            starry_sky: Some(StarrySkyConfig::default()),
            typewriter: Some(TypewriterConfig::default()),
            neon_glow: Some(NeonGlowConfig::default()),
            click_effect: Some(ClickEffectConfig::default()),
        }
    }
}

impl EffectsConfig {
    /// A configuration with every section absent.
    pub fn empty() -> Self {
        Self {
            particles: None,
            starry_sky: None,
            typewriter: None,
            neon_glow: None,
            click_effect: None,
        }
    }

    /// Particle section, if present and enabled.
    pub fn enabled_particles(&self) -> Option<&ParticlesConfig> {
        self.particles.as_ref().filter(|p| p.enable)
    }

    /// Starry sky section, if present and enabled.
    pub fn enabled_starry_sky(&self) -> Option<&StarrySkyConfig> {
        self.starry_sky.as_ref().filter(|s| s.enable)
    }

    /// Typewriter section, if present and enabled.
    pub fn enabled_typewriter(&self) -> Option<&TypewriterConfig> {
        self.typewriter.as_ref().filter(|t| t.enable)
    }
}

/// Shape of a particle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleShape {
    #[default]
    Circle,
    Edge,
    Triangle,
    Star,
}

impl ParticleShape {
    /// Name used by particle engines.
    pub fn as_str(self) -> &'static str {
        match self {
            ParticleShape::Circle => "circle",
            ParticleShape::Edge => "edge",
            ParticleShape::Triangle => "triangle",
            ParticleShape::Star => "star",
        }
    }
}

/// Heading of particle motion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MoveDirection {
    #[default]
    None,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
    TopLeft,
}

impl MoveDirection {
    /// Unit heading in surface coordinates (y grows downwards).
    /// `None` has no fixed heading.
    pub fn heading(self) -> Option<(f32, f32)> {
        const D: f32 = std::f32::consts::FRAC_1_SQRT_2;
        match self {
            MoveDirection::None => None,
            MoveDirection::Top => Some((0.0, -1.0)),
            MoveDirection::TopRight => Some((D, -D)),
            MoveDirection::Right => Some((1.0, 0.0)),
            MoveDirection::BottomRight => Some((D, D)),
            MoveDirection::Bottom => Some((0.0, 1.0)),
            MoveDirection::BottomLeft => Some((-D, D)),
            MoveDirection::Left => Some((-1.0, 0.0)),
            MoveDirection::TopLeft => Some((-D, -D)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MoveDirection::None => "none",
            MoveDirection::Top => "top",
            MoveDirection::TopRight => "top-right",
            MoveDirection::Right => "right",
            MoveDirection::BottomRight => "bottom-right",
            MoveDirection::Bottom => "bottom",
            MoveDirection::BottomLeft => "bottom-left",
            MoveDirection::Left => "left",
            MoveDirection::TopLeft => "top-left",
        }
    }
}

/// What happens when a particle leaves the viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutMode {
    /// Re-enter from the opposite edge.
    #[default]
    Out,
    /// Reflect off the edge.
    Bounce,
}

impl OutMode {
    pub fn as_str(self) -> &'static str {
        match self {
            OutMode::Out => "out",
            OutMode::Bounce => "bounce",
        }
    }
}

/// `particles.move` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoveConfig {
    pub enable: bool,
    /// Speed. The ambient motion reads it as seconds per leg.
    pub speed: f32,
    pub direction: MoveDirection,
    pub random: bool,
    pub straight: bool,
    pub out_mode: OutMode,
    pub bounce: bool,
}

impl Default for MoveConfig {
    fn default() -> Self {
        Self {
            enable: true,
            speed: 2.0,
            direction: MoveDirection::None,
            random: false,
            straight: false,
            out_mode: OutMode::Out,
            bounce: false,
        }
    }
}

/// `particles` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticlesConfig {
    pub enable: bool,
    pub number: u32,
    pub color: String,
    pub shape: ParticleShape,
    pub opacity: f32,
    pub size: f32,
    /// Hand the particles to the physics engine instead of ambient motion.
    pub physics: bool,
    #[serde(rename = "move")]
    pub motion: MoveConfig,
}

impl Default for ParticlesConfig {
    fn default() -> Self {
        Self {
            enable: true,
            number: 40,
            color: "#49b1f5".to_string(),
            shape: ParticleShape::Circle,
            opacity: 0.5,
            size: 3.0,
            physics: false,
            motion: MoveConfig::default(),
        }
    }
}

/// `starry_sky` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarrySkyConfig {
    pub enable: bool,
    pub star_count: u32,
    pub star_color: String,
}

impl Default for StarrySkyConfig {
    fn default() -> Self {
        Self {
            enable: true,
            star_count: 80,
            star_color: "#ffffff".to_string(),
        }
    }
}

/// `typewriter` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypewriterConfig {
    pub enable: bool,
    /// Text to type. Empty means "use the element's own text".
    pub text: String,
    /// Milliseconds between revealed characters.
    #[serde(rename = "typeSpeed")]
    pub type_speed: u64,
    #[serde(rename = "cursorChar")]
    pub cursor_char: String,
    #[serde(rename = "loop")]
    pub looping: bool,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            enable: true,
            text: String::new(),
            type_speed: 100,
            cursor_char: "|".to_string(),
            looping: false,
        }
    }
}

/// `neon_glow` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeonGlowConfig {
    pub enable: bool,
}

/// `click_effect` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickEffectConfig {
    pub enable: bool,
    /// Ripple color in the light theme.
    pub light: String,
    /// Ripple color in the dark theme.
    pub dark: String,
}

impl Default for ClickEffectConfig {
    fn default() -> Self {
        Self {
            enable: true,
            light: "rgba(73, 177, 245, 0.3)".to_string(),
            dark: "rgba(255, 255, 255, 0.2)".to_string(),
        }
    }
}
