mod ui;

use std::{
    error::Error,
    io::{self, stdin, Write},
    path::PathBuf,
    time::{Duration, Instant},
};

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

use quickdraw::{
    app_dirs::AppDirs,
    config::{ConfigStore, FileConfigStore},
    dictionary::load_word_list,
    logging,
    runtime::{CrosstermEventSource, FixedTicker, Runner, TermEvent, TermEventSource, Ticker},
    Cue, FileStore, GameConfig, GameEvent, KeyValueStore, Phase, ScoreStore, SessionMachine,
    Snapshot, TimeFormat,
};

const FLASH_DURATION: Duration = Duration::from_millis(800);

/// quick-draw typing duel: type the word before the clock runs out
#[derive(Parser, Debug, Clone, Default)]
#[clap(
    version,
    about,
    long_about = "A western-flavoured typing game. Survive the countdown, type each target word as it appears, and climb the persisted top-ten leaderboard."
)]
pub struct Cli {
    /// seconds per game
    #[clap(short = 'd', long)]
    duration: Option<u32>,

    /// seconds of pre-game countdown
    #[clap(short = 'c', long)]
    countdown: Option<u32>,

    /// show the timer as plain seconds instead of m:ss
    #[clap(long)]
    seconds_only: bool,

    /// require matching letter case
    #[clap(long)]
    case_sensitive: bool,

    /// word list file, one word per line
    #[clap(short = 'w', long)]
    words: Option<PathBuf>,

    /// print the leaderboard and exit
    #[clap(long)]
    scores: bool,

    /// wipe the leaderboard and exit
    #[clap(long)]
    clear_scores: bool,

    /// persist the effective settings as the new defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Layer command-line overrides on top of the stored config
    fn apply(&self, mut config: GameConfig) -> io::Result<GameConfig> {
        if let Some(duration) = self.duration {
            config.session_duration_secs = duration;
        }
        if let Some(countdown) = self.countdown {
            config.countdown_secs = countdown;
        }
        if self.seconds_only {
            config.time_format = TimeFormat::Seconds;
        }
        if self.case_sensitive {
            config.normalize_case = false;
        }
        if let Some(path) = &self.words {
            config.dictionary = load_word_list(path)?;
        }
        Ok(config.validated())
    }
}

/// Terminal presenter state: the core plus the last snapshot it published
#[derive(Debug)]
pub struct App<S: KeyValueStore> {
    pub machine: SessionMachine<S>,
    pub snapshot: Snapshot,
    pub music_playing: bool,
    flash: Option<(&'static str, Instant)>,
    bell: bool,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(machine: SessionMachine<S>) -> Self {
        let snapshot = machine.snapshot();
        Self {
            machine,
            snapshot,
            music_playing: false,
            flash: None,
            bell: false,
        }
    }

    pub fn flash(&self) -> Option<&'static str> {
        self.flash.map(|(text, _)| text)
    }

    pub fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.bell)
    }

    pub fn on_tick(&mut self, now: Instant) {
        self.machine.advance(now);
        if let Some((_, since)) = self.flash {
            if now.duration_since(since) >= FLASH_DURATION {
                self.flash = None;
            }
        }
        self.sync(now);
    }

    /// Handle a key press. Returns false once the user asked to quit.
    pub fn on_key(&mut self, key: KeyEvent, now: Instant) -> bool {
        // Seconds that elapsed since the last tick land before the key does
        self.machine.advance(now);
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return false,
            KeyCode::Char('c') if ctrl => return false,
            KeyCode::Char('r') if ctrl => self.machine.on_restart_requested(now),
            _ => match self.machine.phase() {
                Phase::Idle => {
                    if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                        self.machine.on_start_requested(now);
                    }
                }
                Phase::Countdown => {}
                Phase::Playing => match key.code {
                    KeyCode::Char(c) => {
                        let mut text = self.machine.input().to_string();
                        text.push(c);
                        self.machine.on_input_changed(&text);
                    }
                    KeyCode::Backspace => {
                        if self.machine.on_backspace_attempted() {
                            let mut text = self.machine.input().to_string();
                            text.pop();
                            self.machine.on_input_changed(&text);
                        }
                    }
                    _ => {}
                },
                Phase::Ended => {
                    if matches!(key.code, KeyCode::Char('r') | KeyCode::Enter) {
                        self.machine.on_restart_requested(now);
                    }
                }
            },
        }
        self.sync(now);
        true
    }

    fn sync(&mut self, now: Instant) {
        for event in self.machine.drain_events() {
            match event {
                GameEvent::StateChanged(snapshot) => self.snapshot = snapshot,
                GameEvent::Cue(cue) => self.on_cue(cue, now),
            }
        }
    }

    fn on_cue(&mut self, cue: Cue, now: Instant) {
        match cue {
            Cue::Beginning => self.flash = Some(("Saddle up...", now)),
            Cue::Theme { .. } => self.music_playing = true,
            Cue::StopTheme => self.music_playing = false,
            Cue::Hit => self.flash = Some(("Yeehaw!", now)),
            Cue::TimesUp => {
                self.flash = Some(("Time's up!", now));
                self.bell = true;
            }
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(log_path) = AppDirs::log_path() {
        // The game runs without a log, but say so before the screen is taken over
        if let Err(e) = logging::init(&log_path, "info") {
            eprintln!("quickdraw: logging disabled ({}): {e}", log_path.display());
        }
    }

    let config_store = FileConfigStore::new();
    let config = cli.apply(config_store.load())?;
    if cli.save_config {
        config_store.save(&config)?;
        println!("saved settings to {}", config_store.path().display());
    }

    let mut scores = ScoreStore::open(FileStore::in_state_dir(), config.leaderboard_size);
    if cli.clear_scores {
        scores.clear()?;
        println!("leaderboard cleared");
        return Ok(());
    }
    if cli.scores {
        println!("{}", ui::leaderboard::format_plain(scores.all()));
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(SessionMachine::new(config, scores));
    let ticker = FixedTicker::default();
    let runner = Runner::new(CrosstermEventSource::new(&ticker), ticker);
    let res = run_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_tui<B, S, E, T>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>>
where
    B: Backend,
    S: KeyValueStore,
    E: TermEventSource,
    T: Ticker,
{
    loop {
        terminal.draw(|f| ui::draw(app, f))?;
        if app.take_bell() {
            let mut out = io::stdout();
            out.write_all(b"\x07")?;
            out.flush()?;
        }

        match runner.step() {
            TermEvent::Tick => app.on_tick(Instant::now()),
            TermEvent::Resize => {}
            TermEvent::Closed => break,
            TermEvent::Key(key) => {
                if !app.on_key(key, Instant::now()) {
                    break;
                }
            }
        }
    }

    Ok(())
}
