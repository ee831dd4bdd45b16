use crate::app_dirs::AppDirs;
use chrono::{DateTime, Local};
use rusqlite::{params, Connection, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// One finished round as persisted across sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundRecord {
    pub finished_at: DateTime<Local>,
    /// Game code of the session, e.g. `v01-H5x10`. Rounds are only
    /// comparable within one mode.
    pub mode: String,
    pub word: String,
    pub secs: f64,
    pub correct: bool,
}

/// Lifetime aggregate for one game mode.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeSummary {
    pub rounds: i64,
    pub solved: i64,
    pub mean_secs: Option<f64>,
}

/// Database manager for the round history
#[derive(Debug)]
pub struct HistoryDb {
    conn: Connection,
}

impl HistoryDb {
    /// Open the default database, creating it (and its directory) if
    /// needed.
    pub fn open_default() -> Result<Self> {
        let db_path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("wordrush_history.db"));

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }

        Self::with_conn(Connection::open(&db_path)?)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_conn(Connection::open(path)?)
    }

    /// In-memory database, used by tests.
    pub fn in_memory() -> Result<Self> {
        Self::with_conn(Connection::open_in_memory()?)
    }

    fn with_conn(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS rounds (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                finished_at TEXT NOT NULL,
                mode TEXT NOT NULL,
                word TEXT NOT NULL,
                secs REAL NOT NULL,
                correct BOOLEAN NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_rounds_mode ON rounds(mode)",
            [],
        )?;

        Ok(HistoryDb { conn })
    }

    pub fn record_round(&self, rec: &RoundRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO rounds (finished_at, mode, word, secs, correct)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                rec.finished_at.to_rfc3339(),
                rec.mode,
                rec.word,
                rec.secs,
                rec.correct,
            ],
        )?;

        Ok(())
    }

    /// Most recent rounds first.
    pub fn recent_rounds(&self, limit: usize) -> Result<Vec<RoundRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT finished_at, mode, word, secs, correct
            FROM rounds
            ORDER BY id DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map([limit as i64], |row| {
            let finished_str: String = row.get(0)?;
            let finished_at = DateTime::parse_from_rfc3339(&finished_str)
                .map_err(|_| {
                    rusqlite::Error::InvalidColumnType(
                        0,
                        "finished_at".to_string(),
                        rusqlite::types::Type::Text,
                    )
                })?
                .with_timezone(&Local);

            Ok(RoundRecord {
                finished_at,
                mode: row.get(1)?,
                word: row.get(2)?,
                secs: row.get(3)?,
                correct: row.get(4)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }

        Ok(records)
    }

    /// Lifetime counts and mean solve time for one mode. The mean only
    /// covers solved rounds; lost rounds have no meaningful time.
    pub fn mode_summary(&self, mode: &str) -> Result<ModeSummary> {
        self.conn.query_row(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN correct = 1 THEN 1 ELSE 0 END), 0),
                AVG(CASE WHEN correct = 1 THEN secs END)
            FROM rounds
            WHERE mode = ?1
            "#,
            [mode],
            |row| {
                Ok(ModeSummary {
                    rounds: row.get(0)?,
                    solved: row.get(1)?,
                    mean_secs: row.get(2)?,
                })
            },
        )
    }
}

/// Append-only CSV mirror of the round history, for spreadsheets and
/// scripts. Never read back by the app.
#[derive(Debug, Clone)]
pub struct RoundCsvLog {
    path: PathBuf,
}

impl RoundCsvLog {
    pub fn at_default() -> Option<Self> {
        AppDirs::round_log_path().map(|path| Self { path })
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn append(&self, rec: &RoundRecord) -> csv::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let needs_header = !self.path.exists();
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            wtr.write_record(["finished_at", "mode", "word", "secs", "correct"])?;
        }
        wtr.write_record([
            rec.finished_at.to_rfc3339(),
            rec.mode.clone(),
            rec.word.clone(),
            format!("{:.2}", rec.secs),
            rec.correct.to_string(),
        ])?;
        wtr.flush()?;
        Ok(())
    }
}
