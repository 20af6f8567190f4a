//! Path helpers

use std::path::PathBuf;

/// Data directory (~/.ebisu)
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .expect("failed to locate home directory")
        .join(".ebisu")
}

/// Config file location
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

/// Persisted session snapshots
pub fn sessions_dir() -> PathBuf {
    data_dir().join("sessions")
}

/// Sanitize a session key for use as a file name
pub fn safe_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            _ => c,
        })
        .collect()
}
