//! Typewriter text reveal.

use glimmer_core::{ElementId, Surface, TypewriterConfig};
use tracing::debug;

use crate::handle::LoopHandle;

/// Class of elements that receive the typewriter effect.
pub const TYPEWRITER_CLASS: &str = "typewriter-text";
/// Cursor blink half-period.
pub const BLINK_INTERVAL_MS: u64 = 500;
/// How long a looping typewriter shows the full text before restarting.
pub const LOOP_HOLD_MS: u64 = 1500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Typing { revealed: usize, next_at: u64 },
    Blinking { next_toggle: u64 },
    Holding { until: u64 },
    Done,
}

/// Reveals a text one character at a time.
#[derive(Debug)]
pub struct Typewriter {
    element: ElementId,
    chars: Vec<char>,
    type_speed: u64,
    cursor: String,
    looping: bool,
    phase: Phase,
    handle: LoopHandle,
}

impl Typewriter {
    /// Start typing into `element` at `now_ms`.
    ///
    /// The configured text wins; an empty one falls back to the element's
    /// current text. The element is cleared either way.
    pub fn attach(
        surface: &mut Surface,
        element: ElementId,
        config: &TypewriterConfig,
        now_ms: u64,
    ) -> Option<Self> {
        let el = surface.get_mut(element)?;
        let text = if config.text.is_empty() {
            std::mem::take(&mut el.text)
        } else {
            config.text.clone()
        };
        el.text.clear();

        debug!(len = text.chars().count(), "typewriter started");
        Some(Self {
            element,
            chars: text.chars().collect(),
            type_speed: config.type_speed,
            cursor: config.cursor_char.clone(),
            looping: config.looping,
            phase: Phase::Typing {
                revealed: 0,
                next_at: now_ms,
            },
            handle: LoopHandle::new("typewriter"),
        })
    }

    /// Attach to every `typewriter-text` element on the surface.
    pub fn attach_all(surface: &mut Surface, config: &TypewriterConfig, now_ms: u64) -> Vec<Self> {
        surface
            .find_by_class(TYPEWRITER_CLASS)
            .into_iter()
            .filter_map(|id| Self::attach(surface, id, config, now_ms))
            .collect()
    }

    pub fn update(&mut self, now_ms: u64, surface: &mut Surface) {
        if !self.handle.is_running() {
            return;
        }
        let mut blink_toggles = 0usize;

        loop {
            match self.phase {
                Phase::Typing { revealed, next_at } if now_ms >= next_at => {
                    if revealed < self.chars.len() {
                        self.phase = Phase::Typing {
                            revealed: revealed + 1,
                            next_at: next_at + self.type_speed,
                        };
                    } else if !self.looping && !self.cursor.is_empty() {
                        self.phase = Phase::Blinking {
                            next_toggle: next_at + BLINK_INTERVAL_MS,
                        };
                    } else if self.looping {
                        self.phase = Phase::Holding {
                            until: next_at + LOOP_HOLD_MS,
                        };
                    } else {
                        self.phase = Phase::Done;
                    }
                }
                Phase::Blinking { next_toggle } if now_ms >= next_toggle => {
                    blink_toggles += 1;
                    self.phase = Phase::Blinking {
                        next_toggle: next_toggle + BLINK_INTERVAL_MS,
                    };
                }
                Phase::Holding { until } if now_ms >= until => {
                    self.phase = Phase::Typing {
                        revealed: 0,
                        next_at: until,
                    };
                }
                _ => break,
            }
        }

        let text = self.rendered_text();
        if let Some(el) = surface.get_mut(self.element) {
            el.text = text;
            if blink_toggles % 2 == 1 {
                el.style.opacity = if el.style.opacity == 0.0 { 1.0 } else { 0.0 };
            }
        }
    }

    /// The revealed part of the text, without the cursor.
    pub fn visible_text(&self) -> String {
        let revealed = match self.phase {
            Phase::Typing { revealed, .. } => revealed,
            Phase::Blinking { .. } | Phase::Holding { .. } | Phase::Done => self.chars.len(),
        };
        self.chars[..revealed.min(self.chars.len())].iter().collect()
    }

    /// Whether the cursor glyph has been appended.
    pub fn cursor_shown(&self) -> bool {
        matches!(self.phase, Phase::Blinking { .. })
    }

    /// Whether all text has been revealed.
    pub fn is_complete(&self) -> bool {
        !matches!(self.phase, Phase::Typing { .. })
    }

    fn rendered_text(&self) -> String {
        let mut text = self.visible_text();
        if self.cursor_shown() {
            text.push_str(&self.cursor);
        }
        text
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }
}
