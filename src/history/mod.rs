pub mod format;
pub mod macros;
pub mod record;

use serde::Serialize;

use crate::error::ConsoleError;
use crate::objects::ObjectCatalog;
use crate::registry::CommandRegistry;
use crate::storage::LineStore;

use format::{decode_history, encode_history, Decoded};
pub use macros::{Macro, MacroStore};
pub use record::{HistoryRecord, ResolutionState};

/// Resolved vs total records in one store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreSummary {
    pub valid: usize,
    pub total: usize,
}

impl StoreSummary {
    pub fn of<'a>(records: impl Iterator<Item = &'a HistoryRecord>) -> Self {
        records.fold(Self::default(), |mut s, r| {
            s.total += 1;
            if r.is_resolved() {
                s.valid += 1;
            }
            s
        })
    }
}

/// Read and decode a store. `Ok(None)` means nothing was stored yet. A
/// malformed tail is logged and dropped; a foreign version is an error.
pub(crate) fn load_items<T>(
    store: &dyn LineStore,
    decode: fn(&str, &str) -> Result<Decoded<T>, ConsoleError>,
) -> Result<Option<Vec<T>>, ConsoleError> {
    let Some(text) = store.load()? else {
        return Ok(None);
    };
    let decoded = decode(&store.describe(), &text).inspect_err(|e| {
        tracing::error!(error = %e, "discarding stored records");
    })?;
    if let Some(e) = decoded.malformed {
        tracing::warn!(error = %e, "ignoring the rest of the file");
    }
    Ok(Some(decoded.items))
}

/// Bounded most-recent-first list of executed commands.
#[derive(Debug)]
pub struct History {
    records: Vec<HistoryRecord>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Vec::new(),
            capacity,
        }
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&HistoryRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Put a just-executed record at the front, replacing any earlier record
    /// of the same invocation, then drop the oldest beyond capacity.
    pub fn push_executed(&mut self, record: HistoryRecord) {
        self.records.retain(|r| !r.same_invocation(&record));
        self.records.insert(0, record);
        self.records.truncate(self.capacity);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn resolve_all(&mut self, registry: &CommandRegistry, objects: &ObjectCatalog) {
        for record in &mut self.records {
            record.resolve(registry, objects);
        }
    }

    pub fn has_unresolved(&self) -> bool {
        self.records.iter().any(|r| !r.is_resolved())
    }

    pub fn summary(&self) -> StoreSummary {
        StoreSummary::of(self.records.iter())
    }

    /// Replace the list with the stored one. Missing or unreadable storage
    /// keeps the current list; a foreign file version clears it.
    pub fn load(
        &mut self,
        store: &dyn LineStore,
        registry: &CommandRegistry,
        objects: &ObjectCatalog,
    ) -> Result<StoreSummary, ConsoleError> {
        match load_items(store, decode_history) {
            Ok(Some(mut records)) => {
                records.truncate(self.capacity);
                self.records = records;
            }
            Ok(None) => {}
            Err(e) => {
                if matches!(e, ConsoleError::FormatVersion { .. }) {
                    self.records.clear();
                }
                return Err(e);
            }
        }
        self.resolve_all(registry, objects);
        Ok(self.summary())
    }

    pub fn save(&self, store: &dyn LineStore) -> Result<(), ConsoleError> {
        store.store(&encode_history(&self.records))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::model::{ParamType, Value};
    use crate::registry::StaticTable;
    use crate::storage::MemoryStore;

    fn executed(n: i64) -> HistoryRecord {
        HistoryRecord::executed(format!("Set {n}"), "Set", vec![n.to_string()], vec![Value::Int(n)])
    }

    fn registry() -> CommandRegistry {
        let mut table = StaticTable::new("tests");
        table.function("Set", |_| Ok(())).param("n", ParamType::INT);
        let mut registry = CommandRegistry::new();
        registry.register_static(table.into_candidates()).unwrap();
        registry
    }

    #[test]
    fn repeated_invocation_moves_to_front() {
        let mut history = History::new(32);
        history.push_executed(executed(1));
        history.push_executed(executed(2));
        history.push_executed(executed(1));
        assert_eq!(history.len(), 2);
        assert_eq!(history.records()[0].values, vec![Value::Int(1)]);
        assert_eq!(history.records()[1].values, vec![Value::Int(2)]);
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut history = History::new(32);
        for n in 0..37 {
            history.push_executed(executed(n));
        }
        assert_eq!(history.len(), 32);
        assert_eq!(history.records()[0].values, vec![Value::Int(36)]);
        assert_eq!(history.records()[31].values, vec![Value::Int(5)]);
    }

    #[test]
    fn save_load_resolve_round_trip() {
        let backing = MemoryStore::new("history");
        let mut history = History::new(32);
        history.push_executed(executed(7));
        history.save(&backing).unwrap();

        let mut loaded = History::new(32);
        let summary = loaded.load(&backing, &registry(), &ObjectCatalog::new()).unwrap();
        assert_eq!(summary, StoreSummary { valid: 1, total: 1 });
        assert_eq!(loaded.records()[0].values, vec![Value::Int(7)]);
        assert_eq!(loaded.records()[0].display, "Set 7");
    }

    #[test]
    fn records_wait_for_their_command() {
        let backing = MemoryStore::with_contents("history", "FileVersion 0.1\n3\nSet 3\nSet\n3\n");
        let mut history = History::new(32);
        let summary = history
            .load(&backing, &CommandRegistry::new(), &ObjectCatalog::new())
            .unwrap();
        assert_eq!(summary, StoreSummary { valid: 0, total: 1 });
        assert!(history.has_unresolved());

        history.resolve_all(&registry(), &ObjectCatalog::new());
        assert!(!history.has_unresolved());
    }

    #[test]
    fn version_mismatch_empties_the_list() {
        let mut history = History::new(32);
        history.push_executed(executed(1));
        let backing = MemoryStore::with_contents("history", "not a history file\n");
        let result = history.load(&backing, &registry(), &ObjectCatalog::new());
        assert!(matches!(result, Err(ConsoleError::FormatVersion { .. })));
        assert!(history.is_empty());
    }

    struct Unreadable;

    impl LineStore for Unreadable {
        fn load(&self) -> Result<Option<String>, ConsoleError> {
            Err(ConsoleError::Io {
                message: "permission denied".into(),
            })
        }

        fn store(&self, _: &str) -> Result<(), ConsoleError> {
            Ok(())
        }

        fn describe(&self) -> String {
            "unreadable".into()
        }
    }

    #[test]
    fn read_errors_keep_current_list() {
        let mut history = History::new(32);
        history.push_executed(executed(1));
        let result = history.load(&Unreadable, &registry(), &ObjectCatalog::new());
        assert!(matches!(result, Err(ConsoleError::Io { .. })));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn missing_storage_keeps_current_list() {
        let mut history = History::new(32);
        history.push_executed(executed(1));
        let summary = history
            .load(&MemoryStore::new("empty"), &registry(), &ObjectCatalog::new())
            .unwrap();
        assert_eq!(summary.total, 1);
    }
}
