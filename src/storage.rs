//! Durable endpoints for the history and macro files.
//!
//! The console only sees `LineStore`: a whole-text read and a whole-text
//! write. `FileStore` backs it with a file on disk, `MemoryStore` with a
//! shared string (tests, embedding hosts that persist elsewhere).

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;

use crate::error::ConsoleError;

pub trait LineStore: Send {
    /// `None` when nothing has been stored yet.
    fn load(&self) -> Result<Option<String>, ConsoleError>;
    fn store(&self, contents: &str) -> Result<(), ConsoleError>;
    /// Name used in log messages and errors.
    fn describe(&self) -> String;
}

// ── Files ───────────────────────────────────────────────────────

static FILE_LOCKS: LazyLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Atomically write bytes to a file.
///
/// 1. Takes a per-path lock so concurrent writers do not share the `.tmp` file
/// 2. Writes `<name>.tmp` and fsyncs it
/// 3. Moves the existing file to `<name>.bak` (best-effort)
/// 4. Renames the `.tmp` file over the target
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<(), ConsoleError> {
    let lock = Arc::clone(
        FILE_LOCKS
            .lock()
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(()))),
    );
    let _guard = lock.lock();

    let file_name = path.file_name().unwrap_or_default();

    let mut tmp_name = OsString::from(file_name);
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(&tmp_name);

    let mut bak_name = OsString::from(file_name);
    bak_name.push(".bak");
    let bak_path = path.with_file_name(&bak_name);

    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;
    drop(file);

    if path.exists() {
        let _ = fs::rename(path, &bak_path);
    }

    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LineStore for FileStore {
    fn load(&self) -> Result<Option<String>, ConsoleError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, contents: &str) -> Result<(), ConsoleError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        atomic_write(&self.path, contents.as_bytes())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// ── Memory ──────────────────────────────────────────────────────

/// In-memory store. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    label: String,
    contents: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            contents: Arc::default(),
        }
    }

    pub fn with_contents(label: impl Into<String>, contents: impl Into<String>) -> Self {
        let store = Self::new(label);
        *store.contents.lock() = Some(contents.into());
        store
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().clone()
    }

    pub fn set_contents(&self, contents: impl Into<String>) {
        *self.contents.lock() = Some(contents.into());
    }
}

impl LineStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, ConsoleError> {
        Ok(self.contents())
    }

    fn store(&self, contents: &str) -> Result<(), ConsoleError> {
        self.set_contents(contents);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("memory:{}", self.label)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn file_store_round_trip_keeps_a_backup() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("history.txt"));
        assert_eq!(store.load().unwrap(), None);

        store.store("first\n").unwrap();
        store.store("second\n").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("second\n"));

        let bak = dir.path().join("nested").join("history.txt.bak");
        assert_eq!(fs::read_to_string(bak).unwrap(), "first\n");
    }

    #[test]
    fn memory_store_clones_share_contents() {
        let a = MemoryStore::new("h");
        let b = a.clone();
        a.store("x").unwrap();
        assert_eq!(b.load().unwrap().as_deref(), Some("x"));
        assert_eq!(b.describe(), "memory:h");
    }
}
