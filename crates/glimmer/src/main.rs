use std::io::stdout;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use glimmer_config::Config;
use glimmer_effects::{Stage, StageOptions, cell_to_px, render_surface, viewport_for};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout},
    style::Stylize,
    text::Line,
};
use tracing::{info, warn};

mod cli;
mod logging;

use cli::Args;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    logging::init(args.log_file.as_deref())?;

    let mut config = load_config(&args);
    if let Some(theme) = args.theme {
        config.ui.theme = theme.into();
    }
    if let Some(seed) = args.seed {
        config.ui.seed = Some(seed);
    }

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let terminal = ratatui::init();
    execute!(stdout(), EnableMouseCapture)?;
    let result = App::new(config, args.title, args.subtitle).run(terminal);
    execute!(stdout(), DisableMouseCapture)?;
    ratatui::restore();
    result
}

/// Load the configuration, falling back to defaults on any error.
fn load_config(args: &Args) -> Config {
    let loaded = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    loaded.unwrap_or_else(|err| {
        warn!(%err, "using default configuration");
        Config::default()
    })
}

/// The main application which holds the state and logic of the application.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    running: bool,
    /// Effect configuration and UI settings.
    config: Config,
    /// Header title.
    title: String,
    /// Typewriter text used when the config has none.
    subtitle: String,
    /// The effects stage, built on the first frame.
    stage: Option<Stage>,
    /// Application start time for animation timing.
    start_time: Instant,
}

impl App {
    /// Construct a new instance of [`App`].
    pub fn new(config: Config, title: String, subtitle: String) -> Self {
        Self {
            running: false,
            config,
            title,
            subtitle,
            stage: None,
            start_time: Instant::now(),
        }
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        self.running = true;
        let mut loaded = false;
        while self.running {
            self.tick();
            terminal.draw(|frame| self.render(frame))?;
            // The first completed frame counts as the page load
            if !loaded && let Some(stage) = self.stage.as_mut() {
                stage.load();
                loaded = true;
            }
            self.handle_crossterm_events()?;
        }
        if let Some(stage) = self.stage.as_mut() {
            stage.teardown();
        }
        info!("exiting");
        Ok(())
    }

    fn elapsed_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    fn tick(&mut self) {
        let now = self.elapsed_ms();
        if let Some(stage) = self.stage.as_mut() {
            stage.tick(now);
        }
    }

    /// Renders the user interface.
    fn render(&mut self, frame: &mut Frame) {
        let [effects_area, help_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(frame.area());

        if self.stage.is_none() {
            self.stage = Some(self.build_stage(viewport_for(effects_area)));
        }
        let elapsed = self.elapsed_ms();
        let Some(stage) = self.stage.as_ref() else {
            return;
        };

        render_surface(frame, effects_area, stage.surface(), elapsed, stage.theme());

        let help = Line::from(vec![
            "q".bold().cyan(),
            " quit  ".dark_gray(),
            "t".bold().cyan(),
            " toggle theme  ".dark_gray(),
            "click".bold().cyan(),
            " ripple".dark_gray(),
        ])
        .centered();
        frame.render_widget(help, help_area);
    }

    fn build_stage(&self, viewport: glimmer_core::Viewport) -> Stage {
        let seed = self.config.ui.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
        });
        info!(seed, "building stage");
        Stage::new(
            self.config.effects.clone(),
            StageOptions {
                viewport,
                seed,
                theme: self.config.ui.theme,
                title: self.title.clone(),
                subtitle: self.subtitle.clone(),
                ..Default::default()
            },
        )
    }

    /// Reads the crossterm events and updates the state of [`App`].
    /// Polls with the frame interval so animations keep running.
    fn handle_crossterm_events(&mut self) -> color_eyre::Result<()> {
        if event::poll(Duration::from_millis(self.config.frame_ms()))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
                Event::Mouse(mouse) => self.on_mouse_event(mouse),
                Event::Resize(width, height) => self.on_resize(width, height),
                _ => {}
            }
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            (_, KeyCode::Char('t')) => self.toggle_theme(),
            _ => {}
        }
    }

    /// Forward pointer movement and clicks to the stage.
    fn on_mouse_event(&mut self, mouse: MouseEvent) {
        let Some(stage) = self.stage.as_mut() else {
            return;
        };
        let p = cell_to_px(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => stage.pointer_move(p),
            MouseEventKind::Down(MouseButton::Left) => {
                stage.pointer_move(p);
                stage.click(p);
            }
            _ => {}
        }
    }

    fn on_resize(&mut self, width: u16, height: u16) {
        if let Some(stage) = self.stage.as_mut() {
            // Leave the help line out of the effects area
            let area = ratatui::layout::Rect::new(0, 0, width, height.saturating_sub(1));
            stage.resize(viewport_for(area));
        }
    }

    /// Toggle between the light and dark theme.
    fn toggle_theme(&mut self) {
        if let Some(stage) = self.stage.as_mut() {
            let theme = stage.theme().toggle();
            stage.set_theme(theme);
        }
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }
}
