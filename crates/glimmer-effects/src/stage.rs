//! The stage: a surface plus every configured effect.
//!
//! The stage owns the surface, the random source and the effect states.
//! The host feeds it input events and calls [`Stage::tick`] once per frame
//! with a monotonic millisecond clock.

use glimmer_core::{EffectsConfig, ElementId, Point, Surface, THEME_ATTRIBUTE, Theme, Viewport};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::cursor::CursorAnimator;
use crate::decor::{self, HEADER_NAME, HEADING_CLASS, TITLE_NAME};
use crate::engine::{DriftEngine, EngineConfig, ParticleEngine};
use crate::handle::LoopHandle;
use crate::loader::{LOADING_NAME, LoadingScreen};
use crate::particles::ParticleField;
use crate::ripple::RippleLayer;
use crate::starry::StarrySky;
use crate::theme_watch::ThemeWatcher;
use crate::typewriter::{TYPEWRITER_CLASS, Typewriter};

/// Name of the top-level element.
pub const BODY_NAME: &str = "body";
/// Name of the container handed to particle engines.
pub const ENGINE_CONTAINER_NAME: &str = "particles-js";
/// Classes that make the cursor react on hover.
pub const INTERACTIVE_CLASSES: &[&str] = &["link", "button", "card-widget"];

/// Height of the page header in pixels.
const HEADER_HEIGHT: f32 = 96.0;
/// Height of one text line in pixels.
const LINE_HEIGHT: f32 = 16.0;

/// Page content and environment for a new stage.
#[derive(Debug, Clone)]
pub struct StageOptions {
    pub viewport: Viewport,
    pub seed: u64,
    pub theme: Theme,
    pub title: String,
    /// Initial text of the typewriter line.
    pub subtitle: String,
    /// Text shown on the loading screen.
    pub loading_text: String,
}

impl Default for StageOptions {
    fn default() -> Self {
        Self {
            viewport: Viewport::new(640.0, 384.0),
            seed: 0,
            theme: Theme::Light,
            title: "glimmer".to_string(),
            subtitle: String::new(),
            loading_text: "Loading...".to_string(),
        }
    }
}

/// Particle layer: either the built-in ambient motion or a delegated engine.
#[derive(Debug)]
pub enum ParticleLayer {
    Ambient(ParticleField),
    Engine(Box<dyn ParticleEngine>),
}

/// Every effect on one surface.
#[derive(Debug)]
pub struct Stage {
    surface: Surface,
    config: EffectsConfig,
    viewport: Viewport,
    rng: StdRng,
    cursor: Option<CursorAnimator>,
    particles: Option<ParticleLayer>,
    stars: Option<StarrySky>,
    ripples: RippleLayer,
    typewriters: Vec<Typewriter>,
    loader: Option<LoadingScreen>,
    theme_watcher: ThemeWatcher,
    handles: Vec<LoopHandle>,
    now_ms: u64,
}

impl Stage {
    /// Build a stage. Particles go to the drift engine when
    /// `particles.physics` is set, otherwise to the ambient motion.
    pub fn new(config: EffectsConfig, options: StageOptions) -> Self {
        let engine = config
            .enabled_particles()
            .filter(|p| p.physics)
            .map(|_| Box::new(DriftEngine::new()) as Box<dyn ParticleEngine>);
        Self::with_engine(config, options, engine)
    }

    /// Build a stage, delegating particles to `engine` when one is given.
    pub fn with_engine(
        config: EffectsConfig,
        options: StageOptions,
        engine: Option<Box<dyn ParticleEngine>>,
    ) -> Self {
        let mut surface = Surface::new();
        let mut rng = StdRng::seed_from_u64(options.seed);
        let viewport = options.viewport;
        let now_ms = 0;

        surface.set_attribute(THEME_ATTRIBUTE, options.theme.as_str());
        let body = surface.append_named(None, BODY_NAME, &[]);

        // Background layers first so they paint underneath the page
        let stars = config
            .enabled_starry_sky()
            .and_then(|sky| StarrySky::attach(&mut surface, body, sky, viewport, now_ms, &mut rng));

        let particles = config.enabled_particles().and_then(|p| match engine {
            Some(mut engine) => {
                let container = surface.append_named(body, ENGINE_CONTAINER_NAME, &[])?;
                engine.load(
                    container,
                    &EngineConfig::translate(p),
                    viewport,
                    &mut surface,
                    &mut rng,
                );
                debug!(engine = engine.name(), "particles delegated");
                Some(ParticleLayer::Engine(engine))
            }
            None => ParticleField::attach(&mut surface, body, p, viewport, now_ms, &mut rng)
                .map(ParticleLayer::Ambient),
        });

        if let Some(header) = surface.append_named(body, HEADER_NAME, &[]) {
            let title_classes = [HEADING_CLASS, "link"];
            if let Some(title) = surface.append_named(Some(header), TITLE_NAME, &title_classes)
                && let Some(el) = surface.get_mut(title)
            {
                el.text = options.title.clone();
            }
            if let Some(line) = surface.append(Some(header), &[TYPEWRITER_CLASS])
                && let Some(el) = surface.get_mut(line)
            {
                el.text = options.subtitle.clone();
            }
        }

        let typewriters = config
            .enabled_typewriter()
            .map(|tw| Typewriter::attach_all(&mut surface, tw, now_ms))
            .unwrap_or_default();

        decor::apply_animated_gradient(&mut surface);
        decor::apply_neon_glow(&mut surface, config.neon_glow.as_ref());

        let cursor = CursorAnimator::attach(&mut surface, body);

        if let Some(loading) = surface.append_named(body, LOADING_NAME, &[])
            && let Some(el) = surface.get_mut(loading)
        {
            el.text = options.loading_text.clone();
        }

        let ripples = RippleLayer::new(config.click_effect.clone(), body);
        let theme_watcher = ThemeWatcher::attach(&mut surface);

        let mut handles = Vec::new();
        handles.extend(cursor.as_ref().map(CursorAnimator::handle));
        handles.extend(particles.as_ref().map(|layer| match layer {
            ParticleLayer::Ambient(field) => field.handle(),
            ParticleLayer::Engine(engine) => engine.handle(),
        }));
        handles.extend(stars.as_ref().map(StarrySky::handle));
        handles.push(ripples.handle());
        handles.extend(typewriters.iter().map(Typewriter::handle));

        let mut stage = Self {
            surface,
            config,
            viewport,
            rng,
            cursor,
            particles,
            stars,
            ripples,
            typewriters,
            loader: None,
            theme_watcher,
            handles,
            now_ms,
        };
        stage.layout();
        debug!(elements = stage.surface.len(), "stage built");
        stage
    }

    /// Position the page skeleton for the current viewport.
    fn layout(&mut self) {
        let vp = self.viewport;
        let header_top = (vp.height * 0.3 - HEADER_HEIGHT / 2.0).max(0.0);

        let boxes = [
            (BODY_NAME, 0.0, vp.height),
            (HEADER_NAME, header_top, HEADER_HEIGHT),
            (TITLE_NAME, header_top + LINE_HEIGHT * 2.0, LINE_HEIGHT),
            (LOADING_NAME, 0.0, vp.height),
        ];
        for (name, top, height) in boxes {
            let Some(id) = self.surface.find_by_name(name) else {
                continue;
            };
            if let Some(el) = self.surface.get_mut(id) {
                el.style.left = 0.0;
                el.style.top = top;
                el.style.width = vp.width;
                el.style.height = height;
            }
        }
        for id in self.surface.find_by_class(TYPEWRITER_CLASS) {
            if let Some(el) = self.surface.get_mut(id) {
                el.style.left = 0.0;
                el.style.top = header_top + LINE_HEIGHT * 4.0;
                el.style.width = vp.width;
                el.style.height = LINE_HEIGHT;
            }
        }
    }

    /// Record a pointer position and update hover feedback.
    pub fn pointer_move(&mut self, p: Point) {
        let hovering = self.is_interactive_at(p);
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.pointer_move(p);
            cursor.set_hover(hovering, &mut self.surface);
        }
        if let Some(ParticleLayer::Engine(engine)) = self.particles.as_mut() {
            engine.pointer_move(p);
        }
    }

    /// Handle a click: spawn a ripple and let the engine react.
    pub fn click(&mut self, p: Point) -> Option<ElementId> {
        let theme = self.theme();
        if let Some(ParticleLayer::Engine(engine)) = self.particles.as_mut() {
            engine.click(p, &mut self.surface, &mut self.rng);
        }
        self.ripples
            .click(p, self.now_ms, theme, &mut self.surface, &mut self.rng)
    }

    /// Whether `p` lies over an interactive element.
    pub fn is_interactive_at(&self, p: Point) -> bool {
        self.surface.elements().any(|el| {
            INTERACTIVE_CLASSES.iter().any(|c| el.has_class(c))
                && p.x >= el.style.left
                && p.x < el.style.left + el.style.width
                && p.y >= el.style.top
                && p.y < el.style.top + el.style.height
        })
    }

    /// Switch the theme through the root attribute.
    pub fn set_theme(&mut self, theme: Theme) {
        self.surface.set_attribute(THEME_ATTRIBUTE, theme.as_str());
    }

    /// Current theme, read from the root attribute.
    pub fn theme(&self) -> Theme {
        Theme::from_attribute(self.surface.attribute(THEME_ATTRIBUTE))
    }

    /// The page finished loading: schedule the loading screen fade.
    pub fn load(&mut self) {
        if self.loader.is_none() {
            self.loader = LoadingScreen::on_load(&self.surface, self.now_ms);
        }
    }

    /// Advance every effect to `now_ms`.
    pub fn tick(&mut self, now_ms: u64) {
        self.now_ms = now_ms.max(self.now_ms);
        let now = self.now_ms;

        if let Some(cursor) = self.cursor.as_mut() {
            cursor.tick(&mut self.surface);
        }
        match self.particles.as_mut() {
            Some(ParticleLayer::Ambient(field)) => {
                field.update(now, &mut self.surface, &mut self.rng)
            }
            Some(ParticleLayer::Engine(engine)) => {
                engine.update(now, &mut self.surface, &mut self.rng)
            }
            None => {}
        }
        if let Some(stars) = self.stars.as_mut() {
            stars.update(now, &mut self.surface);
        }
        self.ripples.update(now, &mut self.surface);
        for tw in &mut self.typewriters {
            tw.update(now, &mut self.surface);
        }
        if let Some(loader) = self.loader.as_mut() {
            loader.update(now, &mut self.surface);
        }
        self.theme_watcher.poll(&mut self.surface);
    }

    /// Follow a new viewport size.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        match self.particles.as_mut() {
            Some(ParticleLayer::Ambient(field)) => field.resize(viewport, &mut self.surface),
            Some(ParticleLayer::Engine(engine)) => engine.resize(viewport),
            None => {}
        }
        if let Some(stars) = self.stars.as_mut() {
            stars.resize(viewport);
        }
        self.layout();
    }

    /// Stop every loop and detach the theme observer.
    pub fn teardown(&mut self) {
        for handle in &self.handles {
            handle.stop();
        }
        self.theme_watcher.detach(&mut self.surface);
        debug!("stage torn down");
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn config(&self) -> &EffectsConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Handles of every looping effect.
    pub fn handles(&self) -> &[LoopHandle] {
        &self.handles
    }

    /// First handle with the given name.
    pub fn handle(&self, name: &str) -> Option<&LoopHandle> {
        self.handles.iter().find(|h| h.name() == name)
    }

    pub fn cursor(&self) -> Option<&CursorAnimator> {
        self.cursor.as_ref()
    }

    pub fn particles(&self) -> Option<&ParticleLayer> {
        self.particles.as_ref()
    }

    pub fn stars(&self) -> Option<&StarrySky> {
        self.stars.as_ref()
    }

    pub fn typewriters(&self) -> &[Typewriter] {
        &self.typewriters
    }

    pub fn theme_watcher(&self) -> &ThemeWatcher {
        &self.theme_watcher
    }
}

#[cfg(test)]
mod tests {
    use glimmer_core::{ClickEffectConfig, NeonGlowConfig, ParticlesConfig, TypewriterConfig};

    use super::*;
    use crate::decor::{GRADIENT_CLASS, NEON_CLASS};
    use crate::particles::{CONTAINER_NAME, PARTICLE_CLASS};
    use crate::ripple::{RIPPLE_CLASS, RIPPLE_LIFETIME_MS};
    use crate::starry::STAR_CLASS;

    fn options() -> StageOptions {
        StageOptions {
            viewport: Viewport::new(800.0, 480.0),
            seed: 11,
            subtitle: "from the element".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config_builds_everything() {
        let stage = Stage::new(EffectsConfig::default(), options());
        let s = stage.surface();
        assert!(s.find_by_name(CONTAINER_NAME).is_some());
        assert!(!s.find_by_class(STAR_CLASS).is_empty());
        assert_eq!(stage.typewriters().len(), 1);
        assert!(stage.cursor().is_some());
        assert!(matches!(stage.particles(), Some(ParticleLayer::Ambient(_))));
        assert!(s.find_by_name(LOADING_NAME).is_some());
        let header = s.find_by_name(HEADER_NAME).unwrap();
        assert!(s.get(header).unwrap().has_class(GRADIENT_CLASS));
    }

    #[test]
    fn test_missing_sections_skip_effects() {
        let stage = Stage::new(EffectsConfig::empty(), options());
        let s = stage.surface();
        assert!(stage.particles().is_none());
        assert!(stage.stars().is_none());
        assert!(stage.typewriters().is_empty());
        assert!(s.find_by_class(NEON_CLASS).is_empty());
        // The untouched typewriter line keeps its text
        let line = s.find_by_class(TYPEWRITER_CLASS)[0];
        assert_eq!(s.get(line).unwrap().text, "from the element");
        // Cursor and gradient need no configuration
        assert!(stage.cursor().is_some());
        assert!(s.get(s.find_by_name(HEADER_NAME).unwrap()).unwrap().has_class(GRADIENT_CLASS));
    }

    #[test]
    fn test_zero_particles() {
        let config = EffectsConfig {
            particles: Some(ParticlesConfig {
                number: 0,
                ..Default::default()
            }),
            ..EffectsConfig::empty()
        };
        let stage = Stage::new(config, options());
        let s = stage.surface();
        let container = s.find_by_name(CONTAINER_NAME).unwrap();
        assert!(s.children(container).is_empty());
        assert!(s.find_by_class(PARTICLE_CLASS).is_empty());
    }

    #[test]
    fn test_physics_delegates_to_engine() {
        let config = EffectsConfig {
            particles: Some(ParticlesConfig {
                number: 6,
                physics: true,
                ..Default::default()
            }),
            ..EffectsConfig::empty()
        };
        let mut stage = Stage::new(config, options());
        assert!(matches!(stage.particles(), Some(ParticleLayer::Engine(_))));
        assert!(stage.surface().find_by_name(CONTAINER_NAME).is_none());
        assert!(stage.surface().find_by_name(ENGINE_CONTAINER_NAME).is_some());
        assert_eq!(stage.surface().find_by_class(PARTICLE_CLASS).len(), 6);

        stage.tick(16);
        stage.click(Point::new(50.0, 50.0));
        assert_eq!(stage.surface().find_by_class(PARTICLE_CLASS).len(), 10);
    }

    #[test]
    fn test_typewriter_uses_config_text() {
        let config = EffectsConfig {
            typewriter: Some(TypewriterConfig {
                text: "Hi".to_string(),
                type_speed: 10,
                ..Default::default()
            }),
            ..EffectsConfig::empty()
        };
        let mut stage = Stage::new(config, options());
        stage.tick(10);
        stage.tick(20);
        let line = stage.surface().find_by_class(TYPEWRITER_CLASS)[0];
        assert_eq!(stage.surface().get(line).unwrap().text, "Hi|");
    }

    #[test]
    fn test_default_typewriter_types_subtitle() {
        let mut stage = Stage::new(EffectsConfig::default(), options());
        stage.tick(100 * 40);
        let tw = &stage.typewriters()[0];
        assert!(tw.is_complete());
        assert_eq!(tw.visible_text(), "from the element");
    }

    #[test]
    fn test_click_respects_enable() {
        let config = EffectsConfig {
            click_effect: Some(ClickEffectConfig {
                enable: false,
                ..Default::default()
            }),
            ..EffectsConfig::empty()
        };
        let mut stage = Stage::new(config, options());
        for i in 0..5 {
            assert!(stage.click(Point::new(i as f32, 0.0)).is_none());
        }
        assert!(stage.surface().find_by_class(RIPPLE_CLASS).is_empty());
    }

    #[test]
    fn test_ripple_uses_current_theme() {
        let mut stage = Stage::new(EffectsConfig::default(), options());
        stage.set_theme(Theme::Dark);
        let id = stage.click(Point::new(10.0, 10.0)).unwrap();
        let color = stage.surface().get(id).unwrap().style.color.clone();
        assert_eq!(color, Some(ClickEffectConfig::default().dark));

        stage.tick(RIPPLE_LIFETIME_MS);
        assert!(!stage.surface().contains(id));
    }

    #[test]
    fn test_theme_change_is_observed() {
        let mut stage = Stage::new(EffectsConfig::default(), options());
        stage.set_theme(Theme::Dark);
        stage.tick(16);
        assert_eq!(stage.theme(), Theme::Dark);
        assert_eq!(stage.theme_watcher().changes(), 1);
    }

    #[test]
    fn test_neon_glow_tags_title() {
        let config = EffectsConfig {
            neon_glow: Some(NeonGlowConfig { enable: true }),
            ..EffectsConfig::empty()
        };
        let stage = Stage::new(config, options());
        let s = stage.surface();
        let title = s.find_by_name(TITLE_NAME).unwrap();
        assert!(s.get(title).unwrap().has_class(NEON_CLASS));
    }

    #[test]
    fn test_hover_over_title() {
        let mut stage = Stage::new(EffectsConfig::empty(), options());
        let title = stage.surface().find_by_name(TITLE_NAME).unwrap();
        let center = stage.surface().get(title).unwrap().style.center();

        stage.pointer_move(center);
        assert!(stage.cursor().unwrap().is_hovering());
        stage.pointer_move(Point::new(1.0, 1.0));
        assert!(!stage.cursor().unwrap().is_hovering());
    }

    #[test]
    fn test_loading_screen_lifecycle() {
        let mut stage = Stage::new(EffectsConfig::empty(), options());
        stage.tick(200);
        stage.load();
        stage.tick(1699);
        assert!(stage.surface().find_by_name(LOADING_NAME).is_some());
        stage.tick(1700);
        assert!(stage.surface().find_by_name(LOADING_NAME).is_none());
    }

    #[test]
    fn test_teardown_stops_everything() {
        let mut stage = Stage::new(EffectsConfig::default(), options());
        stage.pointer_move(Point::new(400.0, 200.0));
        stage.tick(16);
        let dot = stage.cursor().unwrap().dot().pos;

        stage.teardown();
        assert!(stage.handles().iter().all(|h| !h.is_running()));
        assert!(!stage.theme_watcher().is_attached());

        stage.tick(32);
        assert_eq!(stage.cursor().unwrap().dot().pos, dot);
        assert!(stage.click(Point::ZERO).is_none());
    }

    #[test]
    fn test_stop_single_handle() {
        let mut stage = Stage::new(EffectsConfig::default(), options());
        stage.handle("cursor").unwrap().stop();
        stage.pointer_move(Point::new(100.0, 100.0));
        stage.tick(16);
        assert_eq!(stage.cursor().unwrap().dot().pos, Point::ZERO);
        assert!(stage.handle("particles").unwrap().is_running());
    }

    #[test]
    fn test_resize_relayouts() {
        let mut stage = Stage::new(EffectsConfig::default(), options());
        stage.resize(Viewport::new(400.0, 200.0));
        let header = stage.surface().find_by_name(HEADER_NAME).unwrap();
        assert_eq!(stage.surface().get(header).unwrap().style.width, 400.0);
    }
}
