use crate::app_dirs::AppDirs;
use crate::difficulty::Difficulty;
use crate::words::{LengthChoice, WordBank};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Resolved runtime settings: what the session actually runs with
/// after merging the config file and the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub length: LengthChoice,
    pub windows: Vec<usize>,
    pub difficulty: Difficulty,
    pub auto_enter: bool,
    pub autoguess: String,
    pub delay_secs: f64,
    pub penalty_secs: f64,
    pub bank: WordBank,
    pub blind: bool,
    pub hide_keyboard: bool,
    pub colorblind: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Config::default().resolve()
    }
}

/// Persisted form of the settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub word_length: String,
    pub windows: Vec<usize>,
    pub difficulty: Difficulty,
    pub auto_enter: bool,
    pub autoguess: String,
    pub delay_secs: f64,
    pub penalty_secs: f64,
    pub word_bank: String,
    pub blind: bool,
    pub hide_keyboard: bool,
    pub colorblind: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            word_length: "5".to_string(),
            windows: vec![10],
            difficulty: Difficulty::Normal,
            auto_enter: false,
            autoguess: String::new(),
            delay_secs: 0.0,
            penalty_secs: 0.0,
            word_bank: "standard".to_string(),
            blind: false,
            hide_keyboard: false,
            colorblind: false,
        }
    }
}

impl Config {
    /// Turn the stringly persisted fields back into typed settings.
    /// Unparseable values fall back to the defaults rather than
    /// failing, so a stale or hand-edited file never blocks startup.
    pub fn resolve(&self) -> Settings {
        let length = self
            .word_length
            .parse::<LengthChoice>()
            .unwrap_or(LengthChoice::Fixed(5));
        let bank = ValueEnum::from_str(&self.word_bank, true).unwrap_or_default();
        let windows = if self.windows.is_empty() {
            vec![10]
        } else {
            self.windows.clone()
        };
        Settings {
            length,
            windows,
            difficulty: self.difficulty,
            auto_enter: self.auto_enter,
            autoguess: self.autoguess.clone(),
            delay_secs: self.delay_secs,
            penalty_secs: self.penalty_secs,
            bank,
            blind: self.blind,
            hide_keyboard: self.hide_keyboard,
            colorblind: self.colorblind,
        }
    }
}

impl From<&Settings> for Config {
    fn from(rs: &Settings) -> Self {
        Self {
            word_length: rs.length.to_string(),
            windows: rs.windows.clone(),
            difficulty: rs.difficulty,
            auto_enter: rs.auto_enter,
            autoguess: rs.autoguess.clone(),
            delay_secs: rs.delay_secs,
            penalty_secs: rs.penalty_secs,
            word_bank: rs.bank.to_string().to_lowercase(),
            blind: rs.blind,
            hide_keyboard: rs.hide_keyboard,
            colorblind: rs.colorblind,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path()
            .unwrap_or_else(|| PathBuf::from("wordrush_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg;
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
