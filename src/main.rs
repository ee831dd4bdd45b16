mod ui;

use chrono::Local;
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
use std::{
    error::Error,
    io::{self, stdin},
    time::{Duration, SystemTime},
};
use wordrush::{
    config::{Config, ConfigStore, FileConfigStore, Settings},
    difficulty::Difficulty,
    game::{sanitize_autoguesses, Game, GameOptions, SessionSetup, Submit},
    history::{HistoryDb, ModeSummary, RoundCsvLog, RoundRecord},
    runtime::{CrosstermEventSource, EventSource, FixedTicker, GameEvent, Runner, Ticker},
    words::{Bank, LengthChoice, WordBank},
};

const TICK_RATE_MS: u64 = 100;
const HISTORY_ROWS: usize = 20;

/// word-guessing speedrun tui with rolling window records
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A word-guessing speedrun TUI. Solve rounds back to back while rolling windows track your best runs, with hard modes, seeded sessions and shareable challenge words."
)]
pub struct Cli {
    /// word length to play, a number or "any"
    #[clap(short = 'l', long)]
    length: Option<LengthChoice>,

    /// rolling window sizes, comma separated
    #[clap(short = 'r', long, value_delimiter = ',')]
    windows: Option<Vec<usize>>,

    /// how strictly guesses must honor earlier clues
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// submit automatically when the last letter is typed
    #[clap(long)]
    auto_enter: bool,

    /// words guessed automatically at the start of every round
    #[clap(short = 'g', long)]
    autoguess: Option<String>,

    /// seconds the input stays locked after each guess
    #[clap(long)]
    delay: Option<f64>,

    /// seconds added per prior guess when a round ends
    #[clap(long)]
    penalty: Option<f64>,

    /// word bank to draw targets from
    #[clap(short = 'b', long, value_enum)]
    bank: Option<WordBank>,

    /// seed for reproducible target selection
    #[clap(long)]
    seed: Option<u64>,

    /// game number to start at within a seeded session
    #[clap(long, default_value_t = 1)]
    game: u32,

    /// challenge code naming the first target word
    #[clap(short = 'c', long)]
    challenge: Option<String>,

    /// hide letters on guessed rows, keep only the colors
    #[clap(long)]
    blind: bool,

    /// hide the keyboard panel
    #[clap(long)]
    hide_keyboard: bool,

    /// colorblind palette, orange and blue instead of green and yellow
    #[clap(long)]
    colorblind: bool,

    /// print recent round history and exit
    #[clap(long)]
    history: bool,
}

impl Cli {
    /// Saved config is the baseline; flags given on the command line
    /// win. Boolean flags can only switch features on.
    fn merge(&self, saved: Settings) -> Settings {
        Settings {
            length: self.length.unwrap_or(saved.length),
            windows: self.windows.clone().unwrap_or(saved.windows),
            difficulty: self.difficulty.unwrap_or(saved.difficulty),
            auto_enter: self.auto_enter || saved.auto_enter,
            autoguess: self.autoguess.clone().unwrap_or(saved.autoguess),
            delay_secs: self.delay.unwrap_or(saved.delay_secs),
            penalty_secs: self.penalty.unwrap_or(saved.penalty_secs),
            bank: self.bank.unwrap_or(saved.bank),
            blind: self.blind || saved.blind,
            hide_keyboard: self.hide_keyboard || saved.hide_keyboard,
            colorblind: self.colorblind || saved.colorblind,
        }
    }

    fn session_setup(&self) -> SessionSetup {
        SessionSetup {
            seed: self.seed,
            start_game: self.game,
            challenge: self.challenge.clone(),
        }
    }
}

fn game_options(settings: &Settings) -> GameOptions {
    GameOptions {
        difficulty: settings.difficulty,
        length: settings.length,
        windows: settings.windows.clone(),
        auto_enter: settings.auto_enter,
        autoguesses: sanitize_autoguesses(&settings.autoguess),
        delay: Duration::from_secs_f64(settings.delay_secs.max(0.0)),
        penalty: Duration::from_secs_f64(settings.penalty_secs.max(0.0)),
        blind: settings.blind,
        hide_keyboard: settings.hide_keyboard,
    }
}

pub struct App {
    pub game: Game,
    pub colorblind: bool,
    pub history: Option<HistoryDb>,
    pub round_csv: Option<RoundCsvLog>,
    pub lifetime: Option<ModeSummary>,
}

impl App {
    pub fn new(settings: &Settings, setup: SessionSetup) -> Self {
        let bank = Bank::load(settings.bank);
        let game = Game::new(bank, game_options(settings), setup, SystemTime::now());
        let mut app = Self {
            game,
            colorblind: settings.colorblind,
            history: HistoryDb::open_default().ok(),
            round_csv: RoundCsvLog::at_default(),
            lifetime: None,
        };
        app.refresh_lifetime();
        app
    }

    /// History key. Rounds are only comparable when they were played
    /// under the same game code.
    fn mode(&self) -> String {
        self.game.code().to_string()
    }

    fn refresh_lifetime(&mut self) {
        self.lifetime = self
            .history
            .as_ref()
            .and_then(|db| db.mode_summary(&self.mode()).ok())
            .filter(|s| s.rounds > 0);
    }

    /// Persist the round that just ended. Storage failures never
    /// interrupt play.
    fn record_round(&mut self) {
        let span = match self.game.last_span() {
            Some(span) => span,
            None => return,
        };
        let rec = RoundRecord {
            finished_at: Local::now(),
            mode: self.mode(),
            word: span.word.clone(),
            secs: span.secs,
            correct: span.correct,
        };
        if let Some(db) = &self.history {
            let _ = db.record_round(&rec);
        }
        if let Some(csv) = &self.round_csv {
            let _ = csv.append(&rec);
        }
        self.refresh_lifetime();
    }
}

/// Apply one key press, stamped with its arrival time. Returns true
/// when the app should quit.
fn on_key(app: &mut App, key: KeyEvent, now: SystemTime) -> bool {
    match key.code {
        KeyCode::Esc => return true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
        KeyCode::Char('g') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            if app.game.give_up(now) == Submit::RoundOver {
                app.record_round();
            }
        }
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.game.hint = format!("Challenge code: {}", app.game.challenge_code());
        }
        KeyCode::Backspace => app.game.backspace(now),
        KeyCode::Enter => {
            if app.game.round_over() {
                app.game.next_round(now);
            } else if app.game.submit_current(now) == Submit::RoundOver {
                app.record_round();
            }
        }
        KeyCode::Char(c) => {
            if app.game.on_key(c, now) == Submit::RoundOver {
                app.record_round();
            }
        }
        _ => {}
    }
    false
}

fn run<B: Backend, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        if let GameEvent::Key(key, at) = runner.step() {
            if on_key(app, key, at) {
                return Ok(());
            }
        }
        // Resize and Tick fall through to the redraw above. Ticks keep
        // the lock countdown moving.
    }
}

fn print_history(limit: usize) -> Result<(), Box<dyn Error>> {
    let db = HistoryDb::open_default()?;
    let rounds = db.recent_rounds(limit)?;
    if rounds.is_empty() {
        println!("no rounds recorded yet");
        return Ok(());
    }
    for r in rounds {
        let outcome = if r.correct { "won" } else { "lost" };
        println!(
            "{}  {:<16} {:<10} {:>7.2}s  {}",
            r.finished_at.format("%Y-%m-%d %H:%M:%S"),
            r.mode,
            r.word,
            r.secs,
            outcome
        );
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.history {
        return print_history(HISTORY_ROWS);
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let settings = cli.merge(store.load().resolve());
    let mut app = App::new(&settings, cli.session_setup());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let result = run(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // The merged settings become the saved defaults for next time.
    let _ = store.save(&Config::from(&settings));

    result
}
