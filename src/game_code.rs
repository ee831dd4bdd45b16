use crate::difficulty::Difficulty;
use crate::words::LengthChoice;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Compact, human-comparable description of a game configuration,
/// e.g. `v01-H5x10-a12-d15-p5/bk`. Two sessions with the same code are
/// playing the same game, so their times are comparable.
///
/// Sections that hold only zeroes are omitted when rendering; the
/// parser still accepts them spelled out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameCode {
    pub difficulty: Difficulty,
    pub length: LengthChoice,
    pub run_len: usize,
    pub auto_enter: bool,
    pub autoguesses: u8,
    pub delay_tenths: u32,
    pub penalty_tenths: u32,
    pub blind: bool,
    pub hide_keyboard: bool,
}

/// Duration in tenths of a second, the resolution game codes carry.
pub fn tenths(d: Duration) -> u32 {
    (d.as_secs_f64() * 10.0).round() as u32
}

impl fmt::Display for GameCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v01-{}", self.difficulty.code())?;
        match self.length {
            LengthChoice::Fixed(n) => write!(f, "{n}")?,
            LengthChoice::Any => write!(f, "*")?,
        }
        write!(f, "x{}", self.run_len)?;
        if self.auto_enter || self.autoguesses > 0 {
            write!(f, "-a{}{}", self.auto_enter as u8, self.autoguesses)?;
        }
        if self.delay_tenths > 0 {
            write!(f, "-d{}", self.delay_tenths)?;
        }
        if self.penalty_tenths > 0 {
            write!(f, "-p{}", self.penalty_tenths)?;
        }
        if self.blind || self.hide_keyboard {
            f.write_str("/")?;
            if self.blind {
                f.write_str("b")?;
            }
            if self.hide_keyboard {
                f.write_str("k")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeError {
    Version,
    Difficulty(char),
    Length(String),
    RunLength(String),
    Section(String),
    Variant(char),
}

impl fmt::Display for CodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeError::Version => write!(f, "game code must start with 'v01-'"),
            CodeError::Difficulty(c) => write!(f, "unknown difficulty code '{c}'"),
            CodeError::Length(s) => write!(f, "bad word length '{s}'"),
            CodeError::RunLength(s) => write!(f, "bad run length '{s}'"),
            CodeError::Section(s) => write!(f, "unrecognized section '{s}'"),
            CodeError::Variant(c) => write!(f, "unknown variant flag '{c}'"),
        }
    }
}

impl std::error::Error for CodeError {}

impl FromStr for GameCode {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s.strip_prefix("v01-").ok_or(CodeError::Version)?;

        let (main, variants) = match rest.split_once('/') {
            Some((main, v)) => (main, v),
            None => (rest, ""),
        };

        let mut sections = main.split('-');
        let core = sections.next().ok_or(CodeError::Version)?;

        let mut chars = core.chars();
        let d = chars.next().ok_or(CodeError::Version)?;
        let difficulty = Difficulty::from_code(d).ok_or(CodeError::Difficulty(d))?;

        let body: String = chars.collect();
        let (len_part, run_part) = body
            .split_once('x')
            .ok_or_else(|| CodeError::RunLength(body.clone()))?;
        let length = if len_part == "*" {
            LengthChoice::Any
        } else {
            match len_part.parse::<usize>() {
                Ok(n) if n > 0 => LengthChoice::Fixed(n),
                _ => return Err(CodeError::Length(len_part.to_string())),
            }
        };
        let run_len = match run_part.parse::<usize>() {
            Ok(n) if n > 0 => n,
            _ => return Err(CodeError::RunLength(run_part.to_string())),
        };

        let mut code = GameCode {
            difficulty,
            length,
            run_len,
            auto_enter: false,
            autoguesses: 0,
            delay_tenths: 0,
            penalty_tenths: 0,
            blind: false,
            hide_keyboard: false,
        };

        for section in sections {
            let bad = || CodeError::Section(section.to_string());
            let mut sc = section.chars();
            match sc.next() {
                Some('a') => {
                    let digits: Vec<char> = sc.collect();
                    if digits.len() != 2 {
                        return Err(bad());
                    }
                    code.auto_enter = match digits[0] {
                        '0' => false,
                        '1' => true,
                        _ => return Err(bad()),
                    };
                    code.autoguesses = match digits[1].to_digit(10) {
                        Some(n) if n <= 5 => n as u8,
                        _ => return Err(bad()),
                    };
                }
                Some('d') => {
                    code.delay_tenths = sc.as_str().parse().map_err(|_| bad())?;
                }
                Some('p') => {
                    code.penalty_tenths = sc.as_str().parse().map_err(|_| bad())?;
                }
                _ => return Err(bad()),
            }
        }

        for v in variants.chars() {
            match v {
                'b' => code.blind = true,
                'k' => code.hide_keyboard = true,
                _ => return Err(CodeError::Variant(v)),
            }
        }

        Ok(code)
    }
}
