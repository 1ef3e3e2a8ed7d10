//! Platform-specific directories.
//!
//! - macOS: `~/Library/Caches/battle-sim/logs`, `~/Library/Application Support/battle-sim`
//! - Linux: `~/.cache/battle-sim/logs`, `~/.local/share/battle-sim`
//! - Windows: `%LOCALAPPDATA%\battle-sim\logs`, `%APPDATA%\battle-sim`
use std::path::PathBuf;

use directories::ProjectDirs;

const APPLICATION: &str = "battle-sim";

pub fn log_dir() -> PathBuf {
    ProjectDirs::from("", "", APPLICATION)
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp/battle-sim"))
        .join("logs")
}

pub fn replay_dir() -> PathBuf {
    ProjectDirs::from("", "", APPLICATION)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./battle-data"))
        .join("replays")
}
