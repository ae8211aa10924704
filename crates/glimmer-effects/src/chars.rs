//! Glyphs used when painting effects onto the terminal.

use glimmer_core::ParticleShape;

/// Characters used for stars, smallest to largest.
pub const STAR_CHARS: &[char] = &['.', '·', '+', '*', '✧', '✦'];

/// Characters used for round particles, smallest to largest.
pub const CIRCLE_CHARS: &[char] = &['·', '•', '●'];

/// Characters used for square particles.
pub const EDGE_CHARS: &[char] = &['▪', '■', '█'];

/// Characters used for triangle particles.
pub const TRIANGLE_CHARS: &[char] = &['▴', '▲', '▲'];

/// Characters used for star-shaped particles.
pub const STAR_SHAPE_CHARS: &[char] = &['✧', '✦', '★'];

/// Ripple ring, from freshly spawned to fully expanded.
pub const RIPPLE_CHARS: &[char] = &['●', '◉', '○', '◌', '·'];

/// Cursor dot, normal and hovered.
pub const CURSOR_DOT: char = '○';
pub const CURSOR_DOT_HOVER: char = '◎';

/// Cursor halo outline.
pub const CURSOR_HALO: char = '·';

/// Line segment between linked particles.
pub const LINK_CHAR: char = '·';

/// Glyph for a particle of the given shape and pixel size.
pub fn particle_char(shape: ParticleShape, size: f32) -> char {
    let set = match shape {
        ParticleShape::Circle => CIRCLE_CHARS,
        ParticleShape::Edge => EDGE_CHARS,
        ParticleShape::Triangle => TRIANGLE_CHARS,
        ParticleShape::Star => STAR_SHAPE_CHARS,
    };
    let idx = if size < 2.5 {
        0
    } else if size < 5.0 {
        1
    } else {
        2
    };
    set[idx.min(set.len() - 1)]
}

/// Glyph for a star of the given size (0.0 - 3.0).
pub fn star_char(size: f32) -> char {
    let idx = ((size / 3.0) * STAR_CHARS.len() as f32) as usize;
    STAR_CHARS[idx.min(STAR_CHARS.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particle_char_by_size() {
        assert_eq!(particle_char(ParticleShape::Circle, 1.0), '·');
        assert_eq!(particle_char(ParticleShape::Circle, 3.0), '•');
        assert_eq!(particle_char(ParticleShape::Edge, 10.0), '█');
    }

    #[test]
    fn test_star_char_bounds() {
        assert_eq!(star_char(0.0), '.');
        assert_eq!(star_char(2.99), '✦');
        assert_eq!(star_char(100.0), '✦');
    }
}
