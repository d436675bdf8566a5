use crate::error::ConsoleError;
use crate::input::tokenizer::eq_ignore_case;
use crate::objects::ObjectCatalog;
use crate::registry::CommandRegistry;
use crate::storage::LineStore;

use super::format::{decode_macros, encode_macros};
use super::record::HistoryRecord;
use super::{load_items, StoreSummary};

/// Commands recorded under a trigger key, replayed in recorded order.
#[derive(Debug, Clone, PartialEq)]
pub struct Macro {
    /// Key name the host maps to this macro. Compared ignoring case.
    pub trigger: String,
    pub records: Vec<HistoryRecord>,
}

#[derive(Debug, Default)]
pub struct MacroStore {
    macros: Vec<Macro>,
    recording: Option<Macro>,
}

impl MacroStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn macros(&self) -> &[Macro] {
        &self.macros
    }

    pub fn find(&self, trigger: &str) -> Option<&Macro> {
        self.macros.iter().find(|m| eq_ignore_case(&m.trigger, trigger))
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    pub fn recording_trigger(&self) -> Option<&str> {
        self.recording.as_ref().map(|m| m.trigger.as_str())
    }

    /// Begin recording under `trigger`.
    pub fn start(&mut self, trigger: &str) -> Result<(), ConsoleError> {
        if self.recording.is_some() {
            return Err(ConsoleError::MacroRecording);
        }
        let trigger = trigger.trim();
        if self.find(trigger).is_some() {
            return Err(ConsoleError::MacroExists {
                trigger: trigger.to_string(),
            });
        }
        tracing::info!(trigger, "recording macro");
        self.recording = Some(Macro {
            trigger: trigger.to_string(),
            records: Vec::new(),
        });
        Ok(())
    }

    /// Append to the active recording. Returns false when not recording.
    pub fn capture(&mut self, record: HistoryRecord) -> bool {
        match &mut self.recording {
            Some(m) => {
                m.records.push(record);
                true
            }
            None => false,
        }
    }

    /// Finish the active recording. An empty recording is discarded and
    /// `Ok(None)` returned; otherwise the number of captured commands.
    pub fn stop(&mut self) -> Result<Option<usize>, ConsoleError> {
        let recorded = self.recording.take().ok_or(ConsoleError::NotRecording)?;
        if recorded.records.is_empty() {
            tracing::info!(trigger = %recorded.trigger, "discarding empty macro");
            return Ok(None);
        }
        let count = recorded.records.len();
        tracing::info!(trigger = %recorded.trigger, commands = count, "macro saved");
        self.macros.push(recorded);
        Ok(Some(count))
    }

    pub fn remove(&mut self, trigger: &str) -> bool {
        let before = self.macros.len();
        self.macros.retain(|m| !eq_ignore_case(&m.trigger, trigger));
        self.macros.len() != before
    }

    pub fn clear(&mut self) {
        self.macros.clear();
    }

    pub fn resolve_all(&mut self, registry: &CommandRegistry, objects: &ObjectCatalog) {
        for record in self.macros.iter_mut().flat_map(|m| m.records.iter_mut()) {
            record.resolve(registry, objects);
        }
    }

    pub fn summary(&self) -> StoreSummary {
        StoreSummary::of(self.macros.iter().flat_map(|m| m.records.iter()))
    }

    /// Replace the macros with the stored ones. Missing or unreadable
    /// storage keeps the current set; a foreign file version clears it.
    pub fn load(
        &mut self,
        store: &dyn LineStore,
        registry: &CommandRegistry,
        objects: &ObjectCatalog,
    ) -> Result<StoreSummary, ConsoleError> {
        match load_items(store, decode_macros) {
            Ok(Some(macros)) => self.macros = macros,
            Ok(None) => {}
            Err(e) => {
                if matches!(e, ConsoleError::FormatVersion { .. }) {
                    self.macros.clear();
                }
                return Err(e);
            }
        }
        self.resolve_all(registry, objects);
        Ok(self.summary())
    }

    pub fn save(&self, store: &dyn LineStore) -> Result<(), ConsoleError> {
        store.store(&encode_macros(&self.macros))
    }
}
