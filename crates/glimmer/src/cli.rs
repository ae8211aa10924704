//! Command line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use glimmer_core::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        }
    }
}

/// Decorative terminal effects: cursor trails, particles, starry skies
/// and typewriter text.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    /// Configuration file (defaults to the platform config directory).
    #[arg(short, long, env = "GLIMMER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Theme at startup, overriding the configuration.
    #[arg(short, long, value_enum)]
    pub theme: Option<ThemeArg>,

    /// Random seed, overriding the configuration.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Title shown in the header.
    #[arg(long, default_value = "glimmer")]
    pub title: String,

    /// Text typed out under the title when the config sets none.
    #[arg(long, default_value = "cursor trails, particles and starry skies")]
    pub subtitle: String,

    /// Write logs to this file. Without it nothing is logged.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit.
    #[arg(long)]
    pub print_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args = Args::try_parse_from(["glimmer", "--theme", "dark", "--seed", "5"]).unwrap();
        assert_eq!(args.theme, Some(ThemeArg::Dark));
        assert_eq!(args.seed, Some(5));
        assert_eq!(args.title, "glimmer");
        assert!(!args.subtitle.is_empty());
        assert!(!args.print_config);
        assert_eq!(Theme::from(ThemeArg::Light), Theme::Light);
    }

    #[test]
    fn test_reject_unknown_theme() {
        assert!(Args::try_parse_from(["glimmer", "--theme", "sepia"]).is_err());
    }
}
