use crate::challenge;
use crate::clue::{clue, describe_clue, merge_letter_info, Clue, CluedLetter};
use crate::difficulty::{first_violation, Difficulty};
use crate::game_code::{tenths, GameCode};
use crate::round_log::{RoundEvent, RoundLog, RoundSpan};
use crate::speed_stats::SpeedStats;
use crate::words::{Bank, LengthChoice, SplitMix64};
use std::collections::HashMap;
use std::time::{Duration, SystemTime};

pub const MAX_GUESSES: usize = 6;
pub const MAX_AUTOGUESSES: usize = 5;

/// Session-wide game configuration. Everything here is reflected in
/// the game code, so two sessions with equal options race on equal
/// terms.
#[derive(Debug, Clone, PartialEq)]
pub struct GameOptions {
    pub difficulty: Difficulty,
    pub length: LengthChoice,
    pub windows: Vec<usize>,
    pub auto_enter: bool,
    pub autoguesses: Vec<String>,
    pub delay: Duration,
    pub penalty: Duration,
    pub blind: bool,
    pub hide_keyboard: bool,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            length: LengthChoice::Fixed(5),
            windows: vec![10],
            auto_enter: false,
            autoguesses: Vec::new(),
            delay: Duration::ZERO,
            penalty: Duration::ZERO,
            blind: false,
            hide_keyboard: false,
        }
    }
}

/// Where a seeded session starts and whether a challenge overrides the
/// first target.
#[derive(Debug, Clone, Default)]
pub struct SessionSetup {
    pub seed: Option<u64>,
    /// 1-based game number to resume at; 0 is treated as 1.
    pub start_game: u32,
    pub challenge: Option<String>,
}

/// Normalize a raw autoguess string into at most five lowercase words.
pub fn sanitize_autoguesses(raw: &str) -> Vec<String> {
    raw.to_lowercase()
        .split(|c: char| !c.is_ascii_lowercase())
        .filter(|w| !w.is_empty())
        .take(MAX_AUTOGUESSES)
        .map(|w| w.to_string())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    Playing,
    Won,
    Lost,
}

/// What a submission attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submit {
    /// Input did not apply (round over, input locked, not a letter).
    Ignored,
    /// Guess refused; `hint` says why and the buffer is untouched.
    Rejected,
    /// Guess locked in, round continues.
    Accepted,
    /// This input ended the round.
    RoundOver,
}

/// One speedrun session: the current round's state plus the log and
/// rolling stats that survive across rounds.
///
/// Methods that depend on the clock take `now` explicitly so tests can
/// drive time.
#[derive(Debug)]
pub struct Game {
    pub bank: Bank,
    pub opts: GameOptions,
    pub game_number: u32,
    pub guesses: Vec<String>,
    pub rows: Vec<Vec<CluedLetter>>,
    pub current: String,
    pub state: RoundState,
    pub hint: String,
    pub letter_info: HashMap<char, Clue>,
    pub log: RoundLog,
    pub stats: SpeedStats,
    rng: SplitMix64,
    challenge: Option<String>,
    target: String,
    word_length: usize,
    first_key_at: Option<SystemTime>,
    locked_until: Option<SystemTime>,
}

impl Game {
    pub fn new(bank: Bank, opts: GameOptions, setup: SessionSetup, now: SystemTime) -> Self {
        let seed = setup.seed.unwrap_or_else(rand::random);
        let start_game = setup.start_game.max(1);
        let mut rng = SplitMix64::new(seed);
        for _ in 1..start_game {
            bank.draw_target(&mut rng, opts.length);
        }

        let mut hint = String::from("Make your first guess!");
        let mut active_challenge = None;
        if let Some(code) = &setup.challenge {
            match challenge::decode(code) {
                Ok(word) if bank.is_guessable(&word) => active_challenge = Some(word),
                _ => hint = "Invalid challenge code, playing a random game.".to_string(),
            }
        }

        let target = match &active_challenge {
            Some(word) => word.clone(),
            None => bank.draw_target(&mut rng, opts.length).to_string(),
        };
        let word_length = target.chars().count();

        let mut stats = SpeedStats::new(&opts.windows);
        let log = RoundLog::new(now);
        stats.recompute(&log);

        let mut game = Self {
            bank,
            opts,
            game_number: start_game,
            guesses: Vec::new(),
            rows: Vec::new(),
            current: String::new(),
            state: RoundState::Playing,
            hint,
            letter_info: HashMap::new(),
            log,
            stats,
            rng,
            challenge: active_challenge,
            target,
            word_length,
            first_key_at: None,
            locked_until: None,
        };
        game.run_autoguesses(now);
        game
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn word_length(&self) -> usize {
        self.word_length
    }

    pub fn round_over(&self) -> bool {
        self.state != RoundState::Playing
    }

    /// True while the post-guess input lock is running.
    pub fn is_locked(&self, now: SystemTime) -> bool {
        self.locked_until.map_or(false, |until| now < until)
    }

    pub fn lock_remaining(&self, now: SystemTime) -> Option<Duration> {
        let until = self.locked_until?;
        until.duration_since(now).ok().filter(|d| !d.is_zero())
    }

    /// Feed one typed character. Only ascii letters count; the first
    /// one starts the round's think-time clock. With auto-enter on,
    /// the letter that completes the row submits it, and on a failed
    /// submit the letter still lands in the buffer so the player can
    /// see what was refused.
    pub fn on_key(&mut self, c: char, now: SystemTime) -> Submit {
        if self.state != RoundState::Playing || self.is_locked(now) {
            return Submit::Ignored;
        }
        let c = c.to_ascii_lowercase();
        if !c.is_ascii_lowercase() {
            return Submit::Ignored;
        }
        if self.first_key_at.is_none() {
            self.first_key_at = Some(now);
        }

        let mut rejected = false;
        if self.opts.auto_enter && self.current.chars().count() + 1 == self.word_length {
            let candidate = format!("{}{}", self.current, c);
            match self.submit_guess(candidate, false, now) {
                Submit::Rejected => rejected = true,
                other => return other,
            }
        }
        if self.current.chars().count() < self.word_length {
            self.current.push(c);
        }
        if !rejected {
            self.hint.clear();
        }
        Submit::Ignored
    }

    pub fn backspace(&mut self, now: SystemTime) {
        if self.state != RoundState::Playing || self.is_locked(now) {
            return;
        }
        self.hint.clear();
        self.current.pop();
    }

    /// Submit the typed buffer as a guess.
    pub fn submit_current(&mut self, now: SystemTime) -> Submit {
        if self.state != RoundState::Playing || self.is_locked(now) {
            return Submit::Ignored;
        }
        let guess = self.current.clone();
        self.submit_guess(guess, false, now)
    }

    /// Concede the round. Requires at least one committed guess, so an
    /// untouched round cannot be skipped for free.
    pub fn give_up(&mut self, now: SystemTime) -> Submit {
        if self.state != RoundState::Playing || self.guesses.is_empty() {
            return Submit::Ignored;
        }
        self.hint = format!(
            "The answer was {}. (Enter to play again)",
            self.target.to_uppercase()
        );
        self.state = RoundState::Lost;
        let prior = self.guesses.len();
        self.finish_round(false, prior, now);
        Submit::RoundOver
    }

    /// Start the next round. A finished challenge always hands over to
    /// a random target.
    pub fn next_round(&mut self, now: SystemTime) {
        if self.state == RoundState::Playing {
            return;
        }
        self.challenge = None;
        self.game_number += 1;
        let target = self
            .bank
            .draw_target(&mut self.rng, self.opts.length)
            .to_string();
        self.word_length = target.chars().count();
        self.target = target;
        self.guesses.clear();
        self.rows.clear();
        self.current.clear();
        self.letter_info.clear();
        self.state = RoundState::Playing;
        self.hint.clear();
        self.first_key_at = None;
        self.locked_until = None;
        self.run_autoguesses(now);
    }

    fn run_autoguesses(&mut self, now: SystemTime) {
        let words = self.opts.autoguesses.clone();
        for word in words {
            self.submit_guess(word, true, now);
        }
    }

    fn submit_guess(&mut self, guess: String, autoing: bool, now: SystemTime) -> Submit {
        if guess.chars().count() != self.word_length {
            self.hint = "Too short".to_string();
            return Submit::Rejected;
        }
        if !self.bank.is_guessable(&guess) {
            self.hint = "Not a valid word".to_string();
            return Submit::Rejected;
        }
        // Autoguesses replay a fixed opening; holding them to the
        // difficulty contract would make most openings illegal.
        if !autoing {
            if let Some(reason) = first_violation(self.opts.difficulty, &self.rows, &guess) {
                self.hint = reason;
                return Submit::Rejected;
            }
        }

        let row = clue(&guess, &self.target);
        merge_letter_info(&mut self.letter_info, &row);
        let prior = self.guesses.len();
        self.guesses.push(guess.clone());
        self.rows.push(row);
        self.current.clear();
        if !self.opts.delay.is_zero() {
            self.locked_until = Some(now + self.opts.delay);
        }

        if autoing {
            return Submit::Accepted;
        }

        let replay = if self.challenge.is_some() {
            "a random game"
        } else {
            "again"
        };
        if guess == self.target {
            self.hint = format!(
                "You won! The answer was {}. (Enter to play {replay})",
                self.target.to_uppercase()
            );
            self.state = RoundState::Won;
            self.finish_round(true, prior, now);
            if self.opts.auto_enter {
                self.next_round(now);
            }
            return Submit::RoundOver;
        }
        if self.guesses.len() >= MAX_GUESSES {
            self.hint = format!(
                "You lost! The answer was {}. (Enter to play {replay})",
                self.target.to_uppercase()
            );
            self.state = RoundState::Lost;
            self.finish_round(false, prior, now);
            return Submit::RoundOver;
        }
        // Echo the clue row as text; in blind mode that would give the
        // letters away, so the hint stays empty there.
        self.hint = match self.rows.last() {
            Some(row) if !self.opts.blind => describe_clue(row),
            _ => String::new(),
        };
        Submit::Accepted
    }

    /// The one place a round result is recorded: the event lands in
    /// the log and the rolling stats fold it in, in the same step.
    fn finish_round(&mut self, correct: bool, prior_guesses: usize, now: SystemTime) {
        let penalty = self.opts.penalty * prior_guesses as u32;
        let event = RoundEvent {
            word: self.target.clone(),
            completed_at: now,
            first_key_at: self.first_key_at.unwrap_or(now),
            penalty,
            correct,
        };
        self.log.append(event);
        self.stats.update(&self.log);
    }

    pub fn last_span(&self) -> Option<RoundSpan> {
        self.log.len().checked_sub(1).and_then(|i| self.log.span_at(i))
    }

    /// The session's game code.
    pub fn code(&self) -> GameCode {
        GameCode {
            difficulty: self.opts.difficulty,
            length: self.opts.length,
            run_len: self.stats.primary().unwrap_or(10),
            auto_enter: self.opts.auto_enter,
            autoguesses: self.opts.autoguesses.len() as u8,
            delay_tenths: tenths(self.opts.delay),
            penalty_tenths: tenths(self.opts.penalty),
            blind: self.opts.blind,
            hide_keyboard: self.opts.hide_keyboard,
        }
    }

    /// Shareable code for the current round's target.
    pub fn challenge_code(&self) -> String {
        challenge::encode(&self.target)
    }
}
