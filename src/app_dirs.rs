use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// State directory holding the key-value store, history database and
    /// printed receipts. Prefers the XDG-style `~/.local/state/till`.
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("till"),
            )
        } else {
            ProjectDirs::from("", "", "till").map(|pd| pd.data_local_dir().to_path_buf())
        }
    }

    pub fn store_dir() -> Option<PathBuf> {
        Self::state_dir().map(|d| d.join("store"))
    }

    pub fn history_db_path() -> Option<PathBuf> {
        Self::state_dir().map(|d| d.join("history.db"))
    }

    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "till").map(|pd| pd.config_dir().join("config.json"))
    }
}
