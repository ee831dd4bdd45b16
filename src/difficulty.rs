use crate::clue::{Clue, CluedLetter};
use crate::util::ordinal;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Guess-constraint regimes, loosest first. Each level keeps every
/// rule of the levels below it, so a guess rejected at Hard can never
/// pass at UltraHard.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
pub enum Difficulty {
    #[default]
    Normal,
    Hard,
    #[strum(serialize = "Ultra Hard")]
    UltraHard,
}

impl Difficulty {
    pub fn code(self) -> char {
        match self {
            Difficulty::Normal => 'N',
            Difficulty::Hard => 'H',
            Difficulty::UltraHard => 'U',
        }
    }

    pub fn from_code(c: char) -> Option<Self> {
        match c {
            'N' => Some(Difficulty::Normal),
            'H' => Some(Difficulty::Hard),
            'U' => Some(Difficulty::UltraHard),
            _ => None,
        }
    }
}

/// Check a new guess against one past clue row. Returns the reason the
/// guess breaks the active difficulty's rules, or `None` when it is
/// allowed. Rules fire in a fixed order per position, left to right,
/// so the reported reason is stable.
pub fn violation(difficulty: Difficulty, clued: &[CluedLetter], guess: &str) -> Option<String> {
    if difficulty == Difficulty::Normal {
        return None;
    }
    let ultra = difficulty == Difficulty::UltraHard;
    let guess: Vec<char> = guess.chars().collect();

    for (i, cl) in clued.iter().enumerate() {
        let letter = cl.letter;
        let glyph = letter.to_ascii_uppercase();
        // How many of this letter the past row proved present, and how
        // many the new guess actually uses.
        let clue_count = clued
            .iter()
            .filter(|c| c.letter == letter && c.clue != Clue::Absent)
            .count();
        let guess_count = guess.iter().filter(|&&g| g == letter).count();

        // Hard: greens stay put.
        if cl.clue == Clue::Correct && guess.get(i) != Some(&letter) {
            return Some(format!("{} letter must be {glyph}", ordinal(i + 1)));
        }
        // Hard: proven letters get reused, at full multiplicity.
        if guess_count < clue_count {
            return Some(if clue_count > 1 {
                format!("Guess must contain at least {clue_count} {glyph}")
            } else {
                format!("Guess must contain {glyph}")
            });
        }
        // Ultra Hard: yellows must move off their clued position.
        if ultra && cl.clue == Clue::Elsewhere && guess.get(i) == Some(&letter) {
            return Some(format!("{} letter can't be {glyph}", ordinal(i + 1)));
        }
        // Ultra Hard: an Absent occurrence pins the letter's exact
        // multiplicity rather than banning it outright.
        if ultra && cl.clue == Clue::Absent && guess_count != clue_count {
            return Some(if clue_count == 0 {
                format!("Guess must contain no {glyph}")
            } else {
                format!("Guess must contain exactly {clue_count} {glyph}")
            });
        }
    }
    None
}

/// Run `violation` over every past clue row in submission order; the
/// first reason wins.
pub fn first_violation(
    difficulty: Difficulty,
    history: &[Vec<CluedLetter>],
    guess: &str,
) -> Option<String> {
    history
        .iter()
        .find_map(|clued| violation(difficulty, clued, guess))
}
