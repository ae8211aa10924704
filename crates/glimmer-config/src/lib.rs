//! Configuration file handling for glimmer.
//!
//! The configuration lives in `config.toml` under the platform config
//! directory. A missing file yields the defaults; a malformed file is an
//! error the caller decides how to handle.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use glimmer_core::{EffectsConfig, Theme};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Name of the configuration file.
const CONFIG_FILE: &str = "config.toml";

/// Default frame interval (~60 fps).
const DEFAULT_FRAME_MS: u64 = 16;

/// Errors raised while reading or writing the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine the configuration directory")]
    NoConfigDir,
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Terminal presentation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Theme at startup.
    pub theme: Theme,
    /// Milliseconds between animation frames.
    pub frame_ms: u64,
    /// Fixed random seed. Unset means seed from the clock.
    pub seed: Option<u64>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            frame_ms: DEFAULT_FRAME_MS,
            seed: None,
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ui: UiConfig,
    pub effects: EffectsConfig,
}

impl Config {
    /// Default configuration file location.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        ProjectDirs::from("", "", "glimmer")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load from the default location, falling back to defaults if the
    /// file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Parse a TOML document.
    pub fn parse(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, self.to_toml()?).map_err(write_err)
    }

    /// Frame interval, never below one millisecond.
    pub fn frame_ms(&self) -> u64 {
        self.ui.frame_ms.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ui.theme, Theme::Light);
        assert_eq!(config.frame_ms(), DEFAULT_FRAME_MS);
        assert!(config.effects.particles.is_some());
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_effects_table() {
        let config = Config::parse(
            r#"
            [ui]
            theme = "dark"
            frame_ms = 0

            [effects.typewriter]
            text = "Hello"
            typeSpeed = 50
            "#,
        )
        .unwrap();
        assert_eq!(config.ui.theme, Theme::Dark);
        assert_eq!(config.frame_ms(), 1);
        assert!(config.effects.particles.is_none());
        let tw = config.effects.typewriter.unwrap();
        assert_eq!(tw.text, "Hello");
        assert_eq!(tw.type_speed, 50);
        assert_eq!(tw.cursor_char, "|");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let mut config = Config::default();
        config.ui.seed = Some(7);
        if let Some(tw) = config.effects.typewriter.as_mut() {
            tw.looping = true;
        }
        config.save_to(&path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("typeSpeed"));
        assert!(raw.contains("cursorChar"));

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            Config::load_from(&missing),
            Err(ConfigError::Read { .. })
        ));

        let bad = dir.path().join("bad.toml");
        fs::write(&bad, "[ui\ntheme = ").unwrap();
        assert!(matches!(
            Config::load_from(&bad),
            Err(ConfigError::Parse { .. })
        ));
    }
}
