//! Class-based decorations: the animated header gradient and neon titles.
//!
//! Both only tag elements; the renderer animates tagged elements from the
//! clock alone.

use glimmer_core::{ElementId, NeonGlowConfig, Surface};

/// Class painted with a scrolling gradient.
pub const GRADIENT_CLASS: &str = "animated-gradient";
/// Class painted with a pulsing neon color.
pub const NEON_CLASS: &str = "neon-text";

/// Name of the header that receives the gradient.
pub const HEADER_NAME: &str = "page-header";
/// Name of the page title.
pub const TITLE_NAME: &str = "page-title";
/// Class of post titles.
pub const POST_TITLE_CLASS: &str = "post-title";
/// Class of top-level headings.
pub const HEADING_CLASS: &str = "h1";

/// Tag the page header with the gradient class.
///
/// Does nothing if some element already carries the class or there is no
/// header. Returns the tagged element.
pub fn apply_animated_gradient(surface: &mut Surface) -> Option<ElementId> {
    if !surface.find_by_class(GRADIENT_CLASS).is_empty() {
        return None;
    }
    let header = surface.find_by_name(HEADER_NAME)?;
    surface.get_mut(header)?.add_class(GRADIENT_CLASS);
    Some(header)
}

/// Tag every title element with the neon class when enabled.
pub fn apply_neon_glow(surface: &mut Surface, config: Option<&NeonGlowConfig>) -> Vec<ElementId> {
    if !config.is_some_and(|c| c.enable) {
        return Vec::new();
    }

    let mut targets: Vec<ElementId> = surface.find_by_name(TITLE_NAME).into_iter().collect();
    targets.extend(surface.find_by_class(POST_TITLE_CLASS));
    targets.extend(surface.find_by_class(HEADING_CLASS));
    targets.sort();
    targets.dedup();

    for id in &targets {
        if let Some(el) = surface.get_mut(*id) {
            el.add_class(NEON_CLASS);
        }
    }
    targets
}
