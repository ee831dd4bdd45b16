use itertools::Itertools;
use std::collections::HashMap;

/// Per-letter feedback after comparing a guess to the target.
/// Ordered so a better clue compares greater; the keyboard merge
/// relies on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Clue {
    Absent,
    Elsewhere,
    Correct,
}

impl Clue {
    pub fn word(&self) -> &'static str {
        match self {
            Clue::Absent => "no",
            Clue::Elsewhere => "elsewhere",
            Clue::Correct => "correct",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CluedLetter {
    pub letter: char,
    pub clue: Clue,
}

/// Score `guess` against `target` with duplicate-aware matching.
///
/// Exact positions claim the target's letters first; the leftover
/// budget is then spent left to right on `Elsewhere` marks. A letter
/// never earns more non-`Absent` marks than the target contains.
/// Inputs are pre-validated to equal length.
pub fn clue(guess: &str, target: &str) -> Vec<CluedLetter> {
    let guess: Vec<char> = guess.chars().collect();
    let target: Vec<char> = target.chars().collect();
    debug_assert_eq!(guess.len(), target.len());

    let mut remaining: HashMap<char, usize> = HashMap::with_capacity(target.len());
    for &c in &target {
        *remaining.entry(c).or_insert(0) += 1;
    }

    let mut clues = vec![Clue::Absent; guess.len()];
    for (i, &c) in guess.iter().enumerate() {
        if c == target[i] {
            clues[i] = Clue::Correct;
            if let Some(n) = remaining.get_mut(&c) {
                *n -= 1;
            }
        }
    }
    for (i, &c) in guess.iter().enumerate() {
        if clues[i] == Clue::Correct {
            continue;
        }
        if let Some(n) = remaining.get_mut(&c) {
            if *n > 0 {
                *n -= 1;
                clues[i] = Clue::Elsewhere;
            }
        }
    }

    guess
        .into_iter()
        .zip(clues)
        .map(|(letter, clue)| CluedLetter { letter, clue })
        .collect()
}

/// Spoken/hint form of a clue row, e.g. "W no, O no, R correct, D elsewhere".
pub fn describe_clue(clued: &[CluedLetter]) -> String {
    clued
        .iter()
        .map(|cl| format!("{} {}", cl.letter.to_ascii_uppercase(), cl.clue.word()))
        .join(", ")
}

/// Fold a clue row into the per-letter best-seen map used for
/// keyboard highlighting. A letter only ever upgrades.
pub fn merge_letter_info(info: &mut HashMap<char, Clue>, clued: &[CluedLetter]) {
    for cl in clued {
        match info.get(&cl.letter) {
            Some(old) if *old >= cl.clue => {}
            _ => {
                info.insert(cl.letter, cl.clue);
            }
        }
    }
}
