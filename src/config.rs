use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ConsoleError;
use crate::objects::ObjectCatalog;
use crate::paths;
use crate::registry::CandidateSource;
use crate::storage::{atomic_write, FileStore, LineStore, MemoryStore};

const CONFIG_VERSION: u32 = 1;

/// Console behaviour, stored as `devconsole.json` in the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub version: u32,
    /// Most recent commands kept in history.
    pub max_history: usize,
    /// Upper bound on listed hints.
    pub max_hints: usize,
    /// Stay open after a successful submit.
    pub keep_open_after_command: bool,
    /// Also execute commands submitted while a macro is recording.
    pub record_executes: bool,
    /// Save history and macros when the console closes.
    pub autosave: bool,
    pub history_file: String,
    pub macro_file: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            max_history: 32,
            max_hints: 32,
            keep_open_after_command: false,
            record_executes: false,
            autosave: true,
            history_file: paths::HISTORY_FILE.to_string(),
            macro_file: paths::MACRO_FILE.to_string(),
        }
    }
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConsoleError> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ConsoleError> {
    let json = serde_json::to_string_pretty(value)?;
    atomic_write(path, json.as_bytes())
}

/// Load the config from the data directory. Returns None if there is no
/// config file or it does not parse.
pub fn load_config(data_dir: &Path) -> Option<ConsoleConfig> {
    let path = paths::config_path(data_dir);
    if !path.exists() {
        return None;
    }
    match read_json::<ConsoleConfig>(&path) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
            None
        }
    }
}

pub fn save_config(data_dir: &Path, config: &ConsoleConfig) -> Result<(), ConsoleError> {
    std::fs::create_dir_all(data_dir)?;
    write_json(&paths::config_path(data_dir), config)
}

// ── Construction-time setup ─────────────────────────────────────

/// Everything a console needs at construction: behaviour, the two durable
/// endpoints, the command source and the named-object catalog.
pub struct ConsoleSetup {
    pub config: ConsoleConfig,
    pub history_store: Box<dyn LineStore>,
    pub macro_store: Box<dyn LineStore>,
    pub source: Arc<dyn CandidateSource>,
    pub objects: ObjectCatalog,
}

impl ConsoleSetup {
    /// In-memory stores and an empty catalog.
    pub fn new(config: ConsoleConfig, source: Arc<dyn CandidateSource>) -> Self {
        Self {
            config,
            history_store: Box::new(MemoryStore::new("history")),
            macro_store: Box::new(MemoryStore::new("macros")),
            source,
            objects: ObjectCatalog::new(),
        }
    }

    /// File-backed setup rooted at `data_dir`, using the config stored there
    /// or the defaults.
    pub fn in_dir(data_dir: &Path, source: Arc<dyn CandidateSource>) -> Self {
        let config = load_config(data_dir).unwrap_or_default();
        let history = FileStore::new(paths::store_path(data_dir, &config.history_file));
        let macros = FileStore::new(paths::store_path(data_dir, &config.macro_file));
        Self::new(config, source).with_stores(history, macros)
    }

    pub fn with_stores(
        mut self,
        history: impl LineStore + 'static,
        macros: impl LineStore + 'static,
    ) -> Self {
        self.history_store = Box::new(history);
        self.macro_store = Box::new(macros);
        self
    }

    pub fn with_objects(mut self, objects: ObjectCatalog) -> Self {
        self.objects = objects;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::registry::HostCommands;

    #[test]
    fn config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(dir.path()).is_none());

        let config = ConsoleConfig {
            keep_open_after_command: true,
            max_hints: 8,
            ..ConsoleConfig::default()
        };
        save_config(dir.path(), &config).unwrap();
        assert_eq!(load_config(dir.path()).expect("should load"), config);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(paths::config_path(dir.path()), r#"{ "max_history": 5 }"#).unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.max_history, 5);
        assert_eq!(config.max_hints, 32);
        assert_eq!(config.history_file, paths::HISTORY_FILE);
    }

    #[test]
    fn setup_in_dir_uses_configured_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConsoleConfig {
            history_file: "h.txt".into(),
            ..ConsoleConfig::default()
        };
        save_config(dir.path(), &config).unwrap();
        let setup = ConsoleSetup::in_dir(dir.path(), Arc::new(HostCommands::new()));
        assert_eq!(
            setup.history_store.describe(),
            dir.path().join("h.txt").display().to_string()
        );
    }
}
