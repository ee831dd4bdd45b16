use clap::ValueEnum;
use include_dir::{include_dir, Dir};
use serde::Deserialize;
use serde_json::from_str;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

static BANK_DIR: Dir = include_dir!("src/words");

/// Embedded word banks shipped with the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, strum_macros::Display)]
pub enum WordBank {
    /// Mixed-length everyday words (4 to 7 letters).
    #[default]
    Standard,
    /// The fixed five-letter pool.
    Classic,
}

impl WordBank {
    fn file_name(self) -> &'static str {
        match self {
            WordBank::Standard => "standard.json",
            WordBank::Classic => "classic.json",
        }
    }
}

/// Requested target length for a round. `Any` draws from the whole
/// bank, so consecutive rounds can differ in length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthChoice {
    Fixed(usize),
    Any,
}

impl FromStr for LengthChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("any") || s == "*" {
            return Ok(LengthChoice::Any);
        }
        match s.parse::<usize>() {
            Ok(n) if n > 0 => Ok(LengthChoice::Fixed(n)),
            _ => Err(format!("invalid word length '{s}' (use a number or 'any')")),
        }
    }
}

impl fmt::Display for LengthChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LengthChoice::Fixed(n) => write!(f, "{n}"),
            LengthChoice::Any => write!(f, "any"),
        }
    }
}

/// SplitMix64 with a single u64 state word. The whole point is that
/// the state is explicit: seeding with the same value and folding the
/// same number of draws lands on the same target, which is what makes
/// `--seed`/`--game` resumable.
#[derive(Debug, Clone)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e3779b97f4a7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
        z ^ (z >> 31)
    }

    /// Index in `0..len` via multiply-high, avoiding modulo bias.
    pub fn pick(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        ((self.next_u64() as u128 * len as u128) >> 64) as usize
    }
}

/// One word bank: the pool targets are drawn from, plus extra words
/// that are legal guesses but never targets.
#[derive(Deserialize, Clone, Debug)]
pub struct Bank {
    pub name: String,
    pub targets: Vec<String>,
    #[serde(default)]
    pub guesses: Vec<String>,
    #[serde(skip)]
    guessable: HashSet<String>,
}

impl Bank {
    pub fn load(which: WordBank) -> Self {
        let file = BANK_DIR
            .get_file(which.file_name())
            .expect("word bank file not found");

        let text = file
            .contents_utf8()
            .expect("unable to interpret word bank as a string");

        let mut bank: Bank = from_str(text).expect("unable to deserialize word bank json");
        bank.index();
        bank
    }

    /// Build a bank directly from word lists. Handy for tests and for
    /// any caller that brings its own pool.
    pub fn from_words(name: &str, targets: &[&str], guesses: &[&str]) -> Self {
        let mut bank = Bank {
            name: name.to_string(),
            targets: targets.iter().map(|w| w.to_string()).collect(),
            guesses: guesses.iter().map(|w| w.to_string()).collect(),
            guessable: HashSet::new(),
        };
        bank.index();
        bank
    }

    fn index(&mut self) {
        self.guessable = self
            .targets
            .iter()
            .chain(self.guesses.iter())
            .cloned()
            .collect();
    }

    /// Dictionary membership: targets plus the guess-only extension.
    pub fn is_guessable(&self, word: &str) -> bool {
        self.guessable.contains(word)
    }

    /// Draw a target of the requested length. When the bank has no
    /// word of that length the filter is abandoned and the draw falls
    /// back to the whole pool rather than failing.
    pub fn draw_target(&self, rng: &mut SplitMix64, length: LengthChoice) -> &str {
        let eligible: Vec<&String> = match length {
            LengthChoice::Any => self.targets.iter().collect(),
            LengthChoice::Fixed(n) => {
                let filtered: Vec<&String> = self
                    .targets
                    .iter()
                    .filter(|w| w.chars().count() == n)
                    .collect();
                if filtered.is_empty() {
                    self.targets.iter().collect()
                } else {
                    filtered
                }
            }
        };
        eligible[rng.pick(eligible.len())]
    }

    /// Target for the `n`th game of a seeded session (1-based), as a
    /// pure fold over the draw sequence. Resuming at game `n` and
    /// playing through games 1..n give the same word.
    pub fn target_for_game(&self, seed: u64, length: LengthChoice, game_number: u32) -> &str {
        let mut rng = SplitMix64::new(seed);
        let mut word = self.draw_target(&mut rng, length);
        for _ in 1..game_number {
            word = self.draw_target(&mut rng, length);
        }
        word
    }
}
