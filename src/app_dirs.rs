use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("wordrush"),
            )
        } else {
            ProjectDirs::from("", "", "wordrush")
                .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }

    /// Round history database.
    pub fn db_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("history.db"))
    }

    /// Append-only CSV mirror of the round history.
    pub fn round_log_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("rounds.csv"))
    }

    /// Persisted settings file.
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "wordrush")
            .map(|proj_dirs| proj_dirs.config_dir().join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_paths_share_a_directory() {
        // Both state files land next to each other regardless of how
        // the base directory was resolved.
        if let (Some(db), Some(csv)) = (AppDirs::db_path(), AppDirs::round_log_path()) {
            assert_eq!(db.parent(), csv.parent());
            assert_eq!(db.file_name().unwrap(), "history.db");
            assert_eq!(csv.file_name().unwrap(), "rounds.csv");
        }
    }
}
