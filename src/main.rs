pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use sparpi::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    remote::HttpWorkoutRemote,
    runtime::{CrosstermEventSource, TerminalEvent},
    surface::SurfaceState,
    validation::Field,
    workout::{WorkoutForm, WorkoutMode},
    SessionController,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    path::PathBuf,
    sync::Mutex,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// terminal controller for reaction-time punching bag workouts
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Configure, start and watch a reaction-time workout running on a sparring bag. Settings come from the config file and can be overridden per run."
)]
pub struct Cli {
    /// base url of the workout server
    #[clap(short = 's', long)]
    server: Option<String>,

    /// workout length as SS or MM:SS
    #[clap(short = 'd', long)]
    duration: Option<String>,

    /// how the bag picks the next target
    #[clap(short = 'm', long, value_enum)]
    mode: Option<WorkoutMode>,

    /// percentage of right targets
    #[clap(short = 'r', long)]
    right: Option<u32>,

    /// percentage of center targets
    #[clap(short = 'c', long)]
    center: Option<u32>,

    /// percentage of left targets
    #[clap(short = 'l', long)]
    left: Option<u32>,

    /// milliseconds between workout polls
    #[clap(long)]
    poll_interval_ms: Option<u64>,

    /// seconds before a request to the bag is abandoned
    #[clap(long)]
    timeout_secs: Option<u64>,

    /// config file to use instead of the default location
    #[clap(long)]
    config: Option<PathBuf>,

    /// write the merged settings to the config file and exit
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Command line values win over the config file.
    fn apply(&self, mut cfg: Config) -> Config {
        if let Some(server) = &self.server {
            cfg.server_url = server.clone();
        }
        if let Some(duration) = &self.duration {
            cfg.duration = duration.clone();
        }
        if let Some(mode) = self.mode {
            cfg.mode = mode;
        }
        if let Some(r) = self.right {
            cfg.frequencies.r = r;
        }
        if let Some(c) = self.center {
            cfg.frequencies.c = c;
        }
        if let Some(l) = self.left {
            cfg.frequencies.l = l;
        }
        if let Some(ms) = self.poll_interval_ms {
            cfg.poll_interval_ms = ms;
        }
        if let Some(secs) = self.timeout_secs {
            cfg.request_timeout_secs = secs;
        }
        cfg
    }

    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }
}

/// Order in which Tab walks the configuration inputs.
const FOCUS_ORDER: [Field; 4] = Field::ALL;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Toggle,
    Recalibrate,
}

pub struct App {
    pub controller: SessionController<HttpWorkoutRemote, SurfaceState>,
    pub form: WorkoutForm,
    pub focus: Field,
    pub server_url: String,
}

impl App {
    pub fn new(config: &Config, remote: HttpWorkoutRemote) -> Self {
        let mut controller =
            SessionController::new(remote, SurfaceState::default(), config.poll_interval());
        let form = config.form();
        controller.refresh_validation(&form);
        Self {
            controller,
            form,
            focus: Field::Duration,
            server_url: config.server_url.clone(),
        }
    }

    fn move_focus(&mut self, step: isize) {
        let len = FOCUS_ORDER.len() as isize;
        let idx = FOCUS_ORDER
            .iter()
            .position(|f| *f == self.focus)
            .unwrap_or_default() as isize;
        self.focus = FOCUS_ORDER[(idx + step).rem_euclid(len) as usize];
    }

    fn edit(&mut self, apply: impl FnOnce(&mut String)) {
        if !self.controller.surface().inputs_enabled {
            return;
        }
        if let Some(text) = self.form.text_mut(self.focus) {
            apply(text);
        }
        self.controller.refresh_validation(&self.form);
    }

    /// Handles editing keys in place and returns anything that needs the
    /// remote.
    pub fn on_key(&mut self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Action::Quit,
            KeyCode::Tab | KeyCode::Down => {
                self.move_focus(1);
                Action::None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.move_focus(-1);
                Action::None
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == ':' => {
                self.edit(|text| text.push(c));
                Action::None
            }
            KeyCode::Backspace => {
                self.edit(|text| {
                    text.pop();
                });
                Action::None
            }
            KeyCode::Char('m') => {
                if self.controller.surface().inputs_enabled {
                    self.form.mode = self.form.mode.next();
                }
                Action::None
            }
            KeyCode::Char('c') => Action::Recalibrate,
            KeyCode::Enter | KeyCode::Char(' ') => {
                if self.controller.surface().button_enabled {
                    Action::Toggle
                } else {
                    Action::None
                }
            }
            _ => Action::None,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let store = cli.config_store();
    let config = cli.apply(store.load());

    if cli.save_config {
        store.save(&config)?;
        println!("wrote {}", store.path().display());
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_tracing();

    let remote = HttpWorkoutRemote::new(&config.server_url, config.request_timeout())?;
    let mut app = App::new(&config, remote);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let mut events = CrosstermEventSource::new();

    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        tokio::select! {
            event = events.next() => {
                let Some(event) = event else { break };
                let TerminalEvent::Key(key) = event else { continue };

                match app.on_key(key) {
                    Action::None => {}
                    Action::Quit => break,
                    Action::Toggle => {
                        if app.controller.is_running() {
                            // Show the pending stop before waiting on the bag.
                            app.controller.begin_stop();
                            terminal.draw(|f| ui::draw(app, f))?;
                        }
                        // Failures are already on screen and in the log.
                        let _ = app.controller.toggle(&app.form).await;
                    }
                    Action::Recalibrate => {
                        let _ = app.controller.recalibrate().await;
                    }
                }
            }
            _ = app.controller.next_tick() => {
                let _ = app.controller.poll().await;
            }
        }
    }

    if app.controller.is_running() {
        tracing::info!("exiting with a workout running, stopping it");
        let _ = app.controller.stop().await;
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_path = AppDirs::log_path();
    let file = log_path
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|_| OpenOptions::new().create(true).append(true).open(&log_path));

    match file {
        Ok(file) => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .with(env_filter)
                .init();
            tracing::info!(path = %log_path.display(), "logging initialized");
        }
        // Writing to stderr would corrupt the TUI; go without logs instead.
        Err(_) => tracing_subscriber::registry().with(env_filter).init(),
    }
}
