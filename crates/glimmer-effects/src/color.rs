//! Color parsing and blending.

use std::str::FromStr;

use glimmer_core::Theme;
use ratatui::style::Color;

/// An RGB color with alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

/// Parse a CSS-like color: `#rgb`, `#rrggbb`, `rgb(..)`, `rgba(..)` or a
/// color name understood by ratatui.
pub fn parse_color(input: &str) -> Option<Rgba> {
    let s = input.trim();
    if let Some(args) = s
        .strip_prefix("rgba(")
        .or_else(|| s.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_args(args);
    }
    if let Some(hex) = s.strip_prefix('#')
        && hex.len() == 3
    {
        let mut channels = hex.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
        let r = channels.next()??;
        let g = channels.next()??;
        let b = channels.next()??;
        return Some(Rgba::rgb(r, g, b));
    }
    Color::from_str(s).ok().and_then(color_to_rgb).map(|(r, g, b)| Rgba::rgb(r, g, b))
}

fn parse_rgb_args(args: &str) -> Option<Rgba> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |s: &str| s.parse::<f32>().ok().map(|v| v.clamp(0.0, 255.0) as u8);
    let a = match parts.get(3) {
        Some(a) => a.parse::<f32>().ok()?.clamp(0.0, 1.0),
        None => 1.0,
    };
    Some(Rgba {
        r: channel(parts[0])?,
        g: channel(parts[1])?,
        b: channel(parts[2])?,
        a,
    })
}

/// Approximate RGB value of a ratatui color.
fn color_to_rgb(color: Color) -> Option<(u8, u8, u8)> {
    let rgb = match color {
        Color::Rgb(r, g, b) => (r, g, b),
        Color::Black => (0, 0, 0),
        Color::Red => (205, 49, 49),
        Color::Green => (13, 188, 121),
        Color::Yellow => (229, 229, 16),
        Color::Blue => (36, 114, 200),
        Color::Magenta => (188, 63, 188),
        Color::Cyan => (17, 168, 205),
        Color::Gray => (204, 204, 204),
        Color::DarkGray => (118, 118, 118),
        Color::LightRed => (241, 76, 76),
        Color::LightGreen => (35, 209, 139),
        Color::LightYellow => (245, 245, 67),
        Color::LightBlue => (59, 142, 234),
        Color::LightMagenta => (214, 112, 214),
        Color::LightCyan => (41, 184, 219),
        Color::White => (255, 255, 255),
        _ => return None,
    };
    Some(rgb)
}

/// Page background for a theme.
pub fn theme_background(theme: Theme) -> Rgba {
    match theme {
        Theme::Light => Rgba::rgb(246, 248, 250),
        Theme::Dark => Rgba::rgb(13, 13, 13),
    }
}

/// Default text color for a theme.
pub fn theme_foreground(theme: Theme) -> Rgba {
    match theme {
        Theme::Light => Rgba::rgb(76, 73, 72),
        Theme::Dark => Rgba::rgb(230, 230, 230),
    }
}

/// Blend a color with the theme background by its alpha times `opacity`.
pub fn fade(color: Rgba, opacity: f32, theme: Theme) -> Color {
    let alpha = (color.a * opacity).clamp(0.0, 1.0);
    let bg = theme_background(theme);
    let mix = |fg: u8, bg: u8| (bg as f32 + (fg as f32 - bg as f32) * alpha).round() as u8;
    Color::Rgb(mix(color.r, bg.r), mix(color.g, bg.g), mix(color.b, bg.b))
}

/// Convert HSL to RGB color.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Color {
    if s == 0.0 {
        let v = (l * 255.0) as u8;
        return Color::Rgb(v, v, v);
    }

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;

    let h = h / 360.0;

    let r = hue_to_rgb(p, q, h + 1.0 / 3.0);
    let g = hue_to_rgb(p, q, h);
    let b = hue_to_rgb(p, q, h - 1.0 / 3.0);

    Color::Rgb((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

fn hue_to_rgb(p: f32, q: f32, mut t: f32) -> f32 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }

    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_color("#49b1f5"), Some(Rgba::rgb(0x49, 0xb1, 0xf5)));
        assert_eq!(parse_color("#fff"), Some(Rgba::rgb(255, 255, 255)));
        assert_eq!(parse_color("#zzz"), None);
    }

    #[test]
    fn test_parse_rgba() {
        let c = parse_color("rgba(73, 177, 245, 0.3)").unwrap();
        assert_eq!((c.r, c.g, c.b), (73, 177, 245));
        assert!((c.a - 0.3).abs() < f32::EPSILON);
        assert_eq!(parse_color("rgb(1,2,3)"), Some(Rgba::rgb(1, 2, 3)));
        assert_eq!(parse_color("rgba(1,2)"), None);
    }

    #[test]
    fn test_parse_named() {
        assert_eq!(parse_color("white"), Some(Rgba::rgb(255, 255, 255)));
        assert_eq!(parse_color("not-a-color"), None);
    }

    #[test]
    fn test_fade_extremes() {
        let white = Rgba::rgb(255, 255, 255);
        assert_eq!(fade(white, 1.0, Theme::Dark), Color::Rgb(255, 255, 255));
        assert_eq!(fade(white, 0.0, Theme::Dark), Color::Rgb(13, 13, 13));
    }

    #[test]
    fn test_hsl_grey() {
        assert_eq!(hsl_to_rgb(0.0, 0.0, 0.5), Color::Rgb(127, 127, 127));
    }
}
