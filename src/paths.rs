//! Centralized file names for everything the console persists.
//!
//! This module is the single source of truth for leaf filenames. No other
//! module should hard-code these strings.

use std::path::{Path, PathBuf};

// ── Leaf filenames ───────────────────────────────────────────────

pub const CONFIG_FILE: &str = "devconsole.json";
pub const HISTORY_FILE: &str = "DevConsole-CommandHistory.txt";
pub const MACRO_FILE: &str = "DevConsole-Macros.txt";

// ── Data-dir functions ───────────────────────────────────────────

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

/// Resolve a configured store file name. Absolute names are used as is.
pub fn store_path(data_dir: &Path, file_name: &str) -> PathBuf {
    let path = Path::new(file_name);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        data_dir.join(path)
    }
}
