// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod challenge;
pub mod clue;
pub mod config;
pub mod difficulty;
pub mod game;
pub mod game_code;
pub mod history;
pub mod round_log;
pub mod runtime;
pub mod speed_stats;
pub mod util;
pub mod words;
