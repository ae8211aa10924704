//! Paint a [`Surface`] onto a ratatui frame.
//!
//! Surface coordinates are pixels; one terminal cell covers
//! [`CELL_WIDTH_PX`] × [`CELL_HEIGHT_PX`]. Elements are painted in creation
//! order so later elements cover earlier ones.

use glimmer_core::{Element, Point, Surface, Theme, Viewport};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::chars::{
    CURSOR_DOT, CURSOR_DOT_HOVER, CURSOR_HALO, LINK_CHAR, RIPPLE_CHARS, particle_char, star_char,
};
use crate::color::{Rgba, fade, hsl_to_rgb, parse_color, theme_foreground};
use crate::cursor::{DOT_CLASS, HALO_CLASS};
use crate::decor::{GRADIENT_CLASS, NEON_CLASS};
use crate::engine::LINK_CLASS;
use crate::loader::LOADING_NAME;
use crate::particles::PARTICLE_CLASS;
use crate::ripple::RIPPLE_CLASS;
use crate::starry::STAR_CLASS;

/// Width of a terminal cell in surface pixels.
pub const CELL_WIDTH_PX: f32 = 8.0;
/// Height of a terminal cell in surface pixels.
pub const CELL_HEIGHT_PX: f32 = 16.0;

/// Period of the header gradient scroll.
const GRADIENT_PERIOD_MS: u64 = 8000;
/// Period of the neon pulse.
const NEON_PERIOD_MS: u64 = 2000;

/// Fallback colors when an element's color does not parse.
const DEFAULT_ACCENT: Rgba = Rgba::rgb(73, 177, 245);
const DEFAULT_STAR: Rgba = Rgba::rgb(255, 255, 255);

/// Viewport in pixels covered by a terminal area.
pub fn viewport_for(area: Rect) -> Viewport {
    Viewport::new(
        area.width as f32 * CELL_WIDTH_PX,
        area.height as f32 * CELL_HEIGHT_PX,
    )
}

/// Surface position at the center of a terminal cell.
pub fn cell_to_px(column: u16, row: u16) -> Point {
    Point::new(
        (column as f32 + 0.5) * CELL_WIDTH_PX,
        (row as f32 + 0.5) * CELL_HEIGHT_PX,
    )
}

/// Terminal cell containing a surface position, if on screen.
pub fn px_to_cell(p: Point, width: u16, height: u16) -> Option<(u16, u16)> {
    if p.x < 0.0 || p.y < 0.0 {
        return None;
    }
    let col = (p.x / CELL_WIDTH_PX) as u32;
    let row = (p.y / CELL_HEIGHT_PX) as u32;
    (col < width as u32 && row < height as u32).then_some((col as u16, row as u16))
}

/// Character grid the surface is rasterized into.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u16,
    height: u16,
    cells: Vec<Option<(char, Color)>>,
}

impl Canvas {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        }
    }

    pub fn get(&self, col: u16, row: u16) -> Option<(char, Color)> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.cells[row as usize * self.width as usize + col as usize]
    }

    fn put(&mut self, col: i32, row: i32, ch: char, color: Color) {
        if col < 0 || row < 0 || col >= self.width as i32 || row >= self.height as i32 {
            return;
        }
        self.cells[row as usize * self.width as usize + col as usize] = Some((ch, color));
    }

    fn put_px(&mut self, p: Point, ch: char, color: Color) {
        let col = (p.x / CELL_WIDTH_PX).floor() as i32;
        let row = (p.y / CELL_HEIGHT_PX).floor() as i32;
        self.put(col, row, ch, color);
    }

    /// Convert to styled lines, one per row.
    pub fn into_lines(self) -> Vec<Line<'static>> {
        self.cells
            .chunks(self.width.max(1) as usize)
            .map(|row| {
                let spans: Vec<Span> = row
                    .iter()
                    .map(|cell| match cell {
                        Some((ch, color)) => {
                            Span::styled(ch.to_string(), Style::new().fg(*color))
                        }
                        None => Span::raw(" "),
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }
}

/// Rasterize the surface into a canvas of the given size.
pub fn rasterize(
    surface: &Surface,
    width: u16,
    height: u16,
    elapsed_ms: u64,
    theme: Theme,
) -> Canvas {
    let mut canvas = Canvas::new(width, height);
    for el in surface.elements() {
        paint_element(&mut canvas, el, elapsed_ms, theme);
    }
    canvas
}

/// Render the surface into `area` of the frame.
pub fn render_surface(
    frame: &mut Frame,
    area: Rect,
    surface: &Surface,
    elapsed_ms: u64,
    theme: Theme,
) {
    let canvas = rasterize(surface, area.width, area.height, elapsed_ms, theme);
    frame.render_widget(Paragraph::new(canvas.into_lines()), area);
}

fn element_color(el: &Element, fallback: Rgba) -> Rgba {
    el.style
        .color
        .as_deref()
        .and_then(parse_color)
        .unwrap_or(fallback)
}

fn paint_element(canvas: &mut Canvas, el: &Element, elapsed_ms: u64, theme: Theme) {
    let style = &el.style;

    if el.has_class(GRADIENT_CLASS) {
        paint_gradient(canvas, el, elapsed_ms);
    }

    if el.has_class(STAR_CLASS) {
        let color = fade(element_color(el, DEFAULT_STAR), style.opacity, theme);
        canvas.put_px(style.center(), star_char(style.width), color);
    } else if el.has_class(PARTICLE_CLASS) {
        let shape = el
            .classes()
            .iter()
            .find_map(|c| parse_shape(c))
            .unwrap_or_default();
        let color = fade(element_color(el, DEFAULT_ACCENT), style.opacity, theme);
        canvas.put_px(style.center(), particle_char(shape, style.width), color);
    } else if el.has_class(LINK_CLASS) {
        paint_link(canvas, el, theme);
    } else if el.has_class(RIPPLE_CLASS) {
        paint_ripple(canvas, el, theme);
    } else if el.has_class(DOT_CLASS) {
        let border = el
            .style
            .border_color
            .as_deref()
            .and_then(parse_color)
            .unwrap_or(DEFAULT_ACCENT);
        let ch = if style.scale > 1.0 {
            CURSOR_DOT_HOVER
        } else {
            CURSOR_DOT
        };
        let opaque = Rgba { a: 1.0, ..border };
        canvas.put_px(style.center(), ch, fade(opaque, 1.0, theme));
    } else if el.has_class(HALO_CLASS) {
        let fill = fade(element_color(el, DEFAULT_ACCENT), 4.0, theme);
        let radius = style.width / 2.0 * style.scale;
        for step in 0..8 {
            let angle = step as f32 / 8.0 * std::f32::consts::TAU;
            canvas.put_px(style.center() + Point::from_polar(angle, radius), CURSOR_HALO, fill);
        }
    }

    if el.name() == Some(LOADING_NAME) {
        paint_loading(canvas, el, theme);
    } else if !el.text.is_empty() {
        paint_text(canvas, el, elapsed_ms, theme);
    }
}

fn parse_shape(class: &str) -> Option<glimmer_core::ParticleShape> {
    use glimmer_core::ParticleShape;
    match class {
        "circle" => Some(ParticleShape::Circle),
        "edge" => Some(ParticleShape::Edge),
        "triangle" => Some(ParticleShape::Triangle),
        "star" => Some(ParticleShape::Star),
        _ => None,
    }
}

fn paint_ripple(canvas: &mut Canvas, el: &Element, theme: Theme) {
    let style = &el.style;
    let radius = style.width / 2.0 * style.scale;
    let color = fade(element_color(el, DEFAULT_ACCENT), style.opacity * 3.0, theme);
    let idx = ((style.scale * RIPPLE_CHARS.len() as f32) as usize).min(RIPPLE_CHARS.len() - 1);
    let ch = RIPPLE_CHARS[idx];

    if radius < CELL_WIDTH_PX {
        canvas.put_px(style.center(), ch, color);
        return;
    }
    let steps = ((radius * std::f32::consts::TAU) / CELL_WIDTH_PX).ceil().max(8.0) as usize;
    for step in 0..steps {
        let angle = step as f32 / steps as f32 * std::f32::consts::TAU;
        canvas.put_px(style.center() + Point::from_polar(angle, radius), ch, color);
    }
}

fn paint_link(canvas: &mut Canvas, el: &Element, theme: Theme) {
    let style = &el.style;
    let from = Point::new(style.left, style.top);
    let to = from + Point::new(style.width, style.height);
    let color = fade(element_color(el, DEFAULT_ACCENT), style.opacity, theme);
    let steps = (from.distance(to) / CELL_WIDTH_PX).ceil().max(1.0) as usize;
    // Skip the end points, the particles sit there
    for step in 1..steps {
        canvas.put_px(from.lerp(to, step as f32 / steps as f32), LINK_CHAR, color);
    }
}

fn paint_gradient(canvas: &mut Canvas, el: &Element, elapsed_ms: u64) {
    let style = &el.style;
    let time_phase = (elapsed_ms % GRADIENT_PERIOD_MS) as f32 / GRADIENT_PERIOD_MS as f32;
    let col0 = (style.left / CELL_WIDTH_PX).floor() as i32;
    let row0 = (style.top / CELL_HEIGHT_PX).floor() as i32;
    let cols = (style.width / CELL_WIDTH_PX).ceil() as i32;
    let rows = (style.height / CELL_HEIGHT_PX).ceil() as i32;

    for row in 0..rows {
        for col in 0..cols {
            let x_norm = col as f32 / cols.max(1) as f32;
            let y_norm = row as f32 / rows.max(1) as f32;

            let wave = ((x_norm + y_norm * 0.5 + time_phase) * std::f32::consts::TAU).sin();
            let intensity = (wave + 1.0) / 2.0;
            let ch = if intensity < 0.25 {
                continue;
            } else if intensity < 0.5 {
                '░'
            } else if intensity < 0.75 {
                '▒'
            } else {
                '▓'
            };

            // Hue sweeps across the header and scrolls with time
            let hue = (x_norm * 120.0 + time_phase * 360.0) % 360.0;
            let color = hsl_to_rgb(hue, 0.7, 0.2 + intensity * 0.2);
            canvas.put(col0 + col, row0 + row, ch, color);
        }
    }
}

fn paint_text(canvas: &mut Canvas, el: &Element, elapsed_ms: u64, theme: Theme) {
    let style = &el.style;
    // The blinking typewriter hides its text at low opacity
    if style.opacity < 0.5 {
        return;
    }

    let color = if el.has_class(NEON_CLASS) {
        let phase = (elapsed_ms % NEON_PERIOD_MS) as f32 / NEON_PERIOD_MS as f32;
        let glow = (phase * std::f32::consts::TAU).sin() * 0.5 + 0.5;
        hsl_to_rgb(190.0 + glow * 130.0, 1.0, 0.5 + glow * 0.15)
    } else {
        let fg = style
            .color
            .as_deref()
            .and_then(parse_color)
            .unwrap_or_else(|| theme_foreground(theme));
        fade(fg, style.opacity, theme)
    };

    let len = el.text.chars().count() as i32;
    let cols = (style.width / CELL_WIDTH_PX).floor() as i32;
    let col0 = (style.left / CELL_WIDTH_PX).floor() as i32 + ((cols - len) / 2).max(0);
    let row = ((style.top + style.height / 2.0) / CELL_HEIGHT_PX).floor() as i32;
    for (i, ch) in el.text.chars().enumerate() {
        canvas.put(col0 + i as i32, row, ch, color);
    }
}

fn paint_loading(canvas: &mut Canvas, el: &Element, theme: Theme) {
    let style = &el.style;
    let fg = fade(theme_foreground(theme), style.opacity, theme);
    let bg = fade(theme_foreground(theme), style.opacity * 0.15, theme);

    let cols = (style.width / CELL_WIDTH_PX).ceil() as i32;
    let rows = (style.height / CELL_HEIGHT_PX).ceil() as i32;
    for row in 0..rows {
        for col in 0..cols {
            canvas.put(col, row, '░', bg);
        }
    }

    let len = el.text.chars().count() as i32;
    let col0 = ((cols - len) / 2).max(0);
    for (i, ch) in el.text.chars().enumerate() {
        canvas.put(col0 + i as i32, rows / 2, ch, fg);
    }
}

#[cfg(test)]
mod tests {
    use glimmer_core::EffectsConfig;
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::stage::{Stage, StageOptions};

    #[test]
    fn test_cell_mapping() {
        assert_eq!(cell_to_px(0, 0), Point::new(4.0, 8.0));
        assert_eq!(px_to_cell(Point::new(17.0, 33.0), 10, 10), Some((2, 2)));
        assert_eq!(px_to_cell(Point::new(-1.0, 0.0), 10, 10), None);
        assert_eq!(px_to_cell(Point::new(80.0, 0.0), 10, 10), None);
        assert_eq!(viewport_for(Rect::new(0, 0, 10, 5)), Viewport::new(80.0, 80.0));
    }

    #[test]
    fn test_text_is_centered() {
        let mut surface = Surface::new();
        let id = surface.append(None, &[]).unwrap();
        let el = surface.get_mut(id).unwrap();
        el.text = "ab".to_string();
        el.style.width = 80.0;
        el.style.height = 16.0;

        let canvas = rasterize(&surface, 10, 1, 0, Theme::Dark);
        assert_eq!(canvas.get(4, 0).map(|c| c.0), Some('a'));
        assert_eq!(canvas.get(5, 0).map(|c| c.0), Some('b'));
        assert_eq!(canvas.get(0, 0), None);
    }

    #[test]
    fn test_hidden_text_during_blink() {
        let mut surface = Surface::new();
        let id = surface.append(None, &[]).unwrap();
        let el = surface.get_mut(id).unwrap();
        el.text = "x".to_string();
        el.style.width = 8.0;
        el.style.height = 16.0;
        el.style.opacity = 0.0;
        let canvas = rasterize(&surface, 1, 1, 0, Theme::Light);
        assert_eq!(canvas.get(0, 0), None);
    }

    #[test]
    fn test_star_lands_in_its_cell() {
        let mut surface = Surface::new();
        let id = surface.append(None, &[STAR_CLASS]).unwrap();
        let el = surface.get_mut(id).unwrap();
        el.style.left = 20.0;
        el.style.top = 40.0;
        el.style.width = 2.9;
        el.style.height = 2.9;
        let canvas = rasterize(&surface, 5, 5, 0, Theme::Dark);
        assert_eq!(canvas.get(2, 2).map(|c| c.0), Some('✦'));
    }

    #[test]
    fn test_render_full_stage() {
        let backend = TestBackend::new(60, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        let area = Rect::new(0, 0, 60, 20);
        let mut stage = Stage::new(
            EffectsConfig::default(),
            StageOptions {
                viewport: viewport_for(area),
                ..Default::default()
            },
        );
        stage.tick(100);
        terminal
            .draw(|frame| render_surface(frame, area, stage.surface(), 100, stage.theme()))
            .unwrap();

        // The loading screen covers everything until the page loads
        let buffer = terminal.backend().buffer();
        let text: String = (0..60u16)
            .map(|x| buffer[(x, 10u16)].symbol().to_string())
            .collect();
        assert!(text.contains("Loading..."));
    }
}
