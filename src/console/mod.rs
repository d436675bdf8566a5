//! The console facade.
//!
//! Owns the registry, the history and macro stores and the current input
//! line. The input layer drives it with `set_input`, `navigate`,
//! `backspace`, `insert_selected_hint` and `submit`; every input change
//! re-parses the whole line and regenerates the hints.

pub mod builtins;

use std::sync::Arc;

use serde::Serialize;

use crate::config::{ConsoleConfig, ConsoleSetup};
use crate::error::ConsoleError;
use crate::history::{History, HistoryRecord, MacroStore, StoreSummary};
use crate::input::tokenizer::words;
use crate::input::{
    generate_hints, parse, recall_hints, HintContext, HintList, HintPayload, Hints, ParseState,
};
use crate::model::{ParameterDescriptor, Value};
use crate::objects::ObjectCatalog;
use crate::registry::catalog::help_text;
use crate::registry::{
    execute, CandidateSource, CommandAction, CommandDescriptor, CommandRegistry, Dispatch,
    ExecutionReport,
};
use crate::storage::LineStore;

use builtins::Builtin;

// ── Public result types ─────────────────────────────────────────

/// History recall: the empty input first waits, and the first navigation
/// switches the hint list over to the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Recall {
    Hidden,
    WaitForInput,
    Showing,
}

/// Resolved vs total records in both stores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionSummary {
    pub history: StoreSummary,
    pub macros: StoreSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome")]
pub enum SubmitOutcome {
    /// A host command ran. `recorded` is set when it was also captured
    /// into the macro being recorded.
    Executed {
        report: ExecutionReport,
        recorded: bool,
    },
    /// Captured into the macro being recorded without running.
    Recorded { trigger: String },
    Builtin {
        command: &'static str,
        messages: Vec<String>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MacroReplay {
    pub trigger: String,
    pub executed: usize,
    /// Records that no longer resolve, or whose command refused to run.
    pub skipped: usize,
    pub reports: Vec<ExecutionReport>,
}

// ── Console ─────────────────────────────────────────────────────

pub struct Console {
    config: ConsoleConfig,
    registry: CommandRegistry,
    objects: ObjectCatalog,
    source: Arc<dyn CandidateSource>,
    history_store: Box<dyn LineStore>,
    macro_store: Box<dyn LineStore>,
    history: History,
    macros: MacroStore,
    input: String,
    parse: ParseState,
    hints: HintList,
    recall: Recall,
    open: bool,
    initialized: bool,
    /// Stores whose load failed on I/O. Autosave leaves them untouched.
    unreadable: Unreadable,
}

#[derive(Debug, Clone, Copy, Default)]
struct Unreadable {
    history: bool,
    macros: bool,
}

impl Console {
    pub fn new(setup: ConsoleSetup) -> Self {
        let capacity = setup.config.max_history;
        Self {
            config: setup.config,
            registry: CommandRegistry::new(),
            objects: setup.objects,
            source: setup.source,
            history_store: setup.history_store,
            macro_store: setup.macro_store,
            history: History::new(capacity),
            macros: MacroStore::new(),
            input: String::new(),
            parse: ParseState::default(),
            hints: HintList::default(),
            recall: Recall::Hidden,
            open: false,
            initialized: false,
            unreadable: Unreadable::default(),
        }
    }

    // ── Lifecycle ───────────────────────────────────────────────

    /// Open the console. The first call registers static commands and loads
    /// both stores; every call rescans live targets and re-resolves.
    pub fn open(&mut self) -> ResolutionSummary {
        let summary = self.prepare();
        self.open = true;
        self.recall = Recall::Hidden;
        self.set_input(String::new());
        tracing::info!(
            history = %format!("{}/{}", summary.history.valid, summary.history.total),
            macros = %format!("{}/{}", summary.macros.valid, summary.macros.total),
            "console opened"
        );
        summary
    }

    /// Close the console. An active recording ends here; empty recordings
    /// are dropped.
    pub fn close(&mut self) {
        if self.macros.is_recording() {
            if let Err(e) = self.macros.stop() {
                tracing::warn!(error = %e, "could not end macro recording");
            }
        }
        if self.config.autosave && self.initialized {
            self.save_stores();
        }
        self.open = false;
        self.input.clear();
        self.parse = ParseState::default();
        self.hints.clear();
        self.recall = Recall::Hidden;
    }

    /// Rescan live targets after the host created or destroyed objects.
    pub fn refresh_targets(&mut self) -> ResolutionSummary {
        if !self.initialized {
            return self.prepare();
        }
        let summary = self.rebuild_instances();
        self.refresh();
        summary
    }

    /// Swap in a new named-object catalog and re-resolve against it.
    pub fn set_objects(&mut self, objects: ObjectCatalog) -> ResolutionSummary {
        self.objects = objects;
        let summary = self.resolve_records();
        self.refresh();
        summary
    }

    fn prepare(&mut self) -> ResolutionSummary {
        if !self.initialized {
            self.initialize();
        }
        self.rebuild_instances()
    }

    fn initialize(&mut self) {
        let mut statics = Builtin::candidates();
        statics.extend(self.source.static_candidates());
        match self.registry.register_static(statics) {
            Ok(summary) => tracing::debug!(
                commands = summary.commands,
                collisions = summary.collisions,
                "static commands registered"
            ),
            Err(e) => tracing::warn!(error = %e, "static registration skipped"),
        }
        self.initialized = true;

        if let Err(e) = self
            .history
            .load(self.history_store.as_ref(), &self.registry, &self.objects)
        {
            tracing::warn!(store = %self.history_store.describe(), error = %e, "history not loaded");
            self.unreadable.history = matches!(e, ConsoleError::Io { .. });
        }
        if let Err(e) = self
            .macros
            .load(self.macro_store.as_ref(), &self.registry, &self.objects)
        {
            tracing::warn!(store = %self.macro_store.describe(), error = %e, "macros not loaded");
            self.unreadable.macros = matches!(e, ConsoleError::Io { .. });
        }
    }

    fn rebuild_instances(&mut self) -> ResolutionSummary {
        let summary = self
            .registry
            .register_instance(self.source.instance_candidates());
        tracing::debug!(
            commands = summary.commands,
            targets = summary.targets,
            duplicates = summary.duplicate_targets,
            "instance commands rebuilt"
        );
        self.resolve_records()
    }

    fn resolve_records(&mut self) -> ResolutionSummary {
        self.history.resolve_all(&self.registry, &self.objects);
        self.macros.resolve_all(&self.registry, &self.objects);
        self.resolution_summary()
    }

    fn save_stores(&self) {
        if self.unreadable.history {
            tracing::debug!(store = %self.history_store.describe(), "autosave skipped");
        } else if let Err(e) = self.history.save(self.history_store.as_ref()) {
            tracing::warn!(error = %e, "history not saved");
        }
        if self.unreadable.macros {
            tracing::debug!(store = %self.macro_store.describe(), "autosave skipped");
        } else if let Err(e) = self.macros.save(self.macro_store.as_ref()) {
            tracing::warn!(error = %e, "macros not saved");
        }
    }

    // ── Input ───────────────────────────────────────────────────

    /// Replace the input line, re-parse it and regenerate hints.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
        self.recall = match (self.recall, self.input.is_empty()) {
            (_, false) => Recall::Hidden,
            (Recall::Hidden, true) => Recall::WaitForInput,
            (state, true) => state,
        };
        self.refresh();
    }

    fn refresh(&mut self) {
        self.parse = parse(&self.input, &self.registry, &self.objects);
        let hints = match self.recall {
            Recall::Showing => recall_hints(self.history.records(), self.config.max_hints),
            // The empty line shows nothing until the first navigation.
            Recall::WaitForInput => Hints::default(),
            Recall::Hidden => generate_hints(
                &self.parse,
                &HintContext {
                    registry: &self.registry,
                    objects: &self.objects,
                    max_hints: self.config.max_hints,
                },
            ),
        };
        self.hints.refresh(hints);
    }

    /// Move the hint selection. On an empty line the first move switches
    /// to the history list.
    pub fn navigate(&mut self, delta: i32) {
        if self.recall == Recall::WaitForInput && !self.history.is_empty() {
            self.recall = Recall::Showing;
            self.hints.clear();
            self.refresh();
        }
        self.hints.navigate(delta);
    }

    /// Splice the selected hint into the input. Returns false when nothing
    /// is selected or the entry is disabled.
    pub fn insert_selected_hint(&mut self) -> bool {
        let Some(entry) = self.hints.selected_entry() else {
            return false;
        };
        if !entry.enabled {
            tracing::debug!(hint = %entry.display_text, "hint is disabled");
            return false;
        }
        let text = match &entry.payload {
            HintPayload::History(i) => self.history.get(*i).map(HistoryRecord::command_line),
            HintPayload::Command(_) => Some(entry.insert_text.clone()),
            HintPayload::Value(_) => self.with_committed_prefix(&entry.insert_text),
        };
        let Some(mut text) = text else {
            return false;
        };
        text.push(' ');
        self.hints.clear();
        self.set_input(text);
        true
    }

    /// Command name and committed argument texts, followed by `tail`.
    fn with_committed_prefix(&self, tail: &str) -> Option<String> {
        let descriptor = self.selected_command()?;
        let mut parts = vec![descriptor.display_name.as_str()];
        parts.extend(
            self.parse
                .committed_arguments()
                .map(|a| a.display_text.as_str()),
        );
        parts.push(tail);
        Some(parts.join(" "))
    }

    /// Delete the last character, or with `whole_item` the last command,
    /// argument or unmatched text.
    pub fn backspace(&mut self, whole_item: bool) {
        if !whole_item {
            let mut text = self.input.clone();
            text.pop();
            self.set_input(text);
            return;
        }
        let text = match self.selected_command() {
            None => {
                let mut items = words(&self.input);
                items.pop();
                items.join(" ")
            }
            Some(descriptor) => {
                let mut items = vec![descriptor.display_name.as_str()];
                items.extend(self.parse.arguments.iter().map(|a| a.display_text.as_str()));
                if !self.parse.remainder.is_empty() {
                    items.push(self.parse.remainder.as_str());
                }
                items.pop();
                let mut text = items.join(" ");
                if !items.is_empty() {
                    text.push(' ');
                }
                text
            }
        };
        self.set_input(text);
    }

    /// A command is selected, nothing is left unmatched and every
    /// parameter past the typed ones has a default.
    pub fn can_submit(&self) -> bool {
        let Some(descriptor) = self.selected_command() else {
            return false;
        };
        self.parse.remainder.is_empty()
            && descriptor
                .params
                .iter()
                .skip(self.parse.arguments.len())
                .all(ParameterDescriptor::has_default)
    }

    // ── Submit ──────────────────────────────────────────────────

    /// Execute the current line, or capture it into the macro being
    /// recorded. Built-in console commands always run and are never
    /// captured.
    pub fn submit(&mut self) -> Result<SubmitOutcome, ConsoleError> {
        let Some(index) = self.parse.command else {
            return Err(ConsoleError::UnknownCommand {
                name: self.input.trim().to_string(),
            });
        };
        let descriptor = self
            .registry
            .get(index)
            .ok_or_else(|| ConsoleError::UnknownCommand {
                name: self.input.trim().to_string(),
            })?;
        if !self.parse.remainder.is_empty() {
            return Err(ConsoleError::InvalidArgument {
                command: descriptor.display_name.clone(),
                parameter: descriptor
                    .param(self.parse.arguments.len())
                    .map_or_else(|| "argument".to_string(), |p| p.name.clone()),
                text: self.parse.remainder.clone(),
            });
        }
        if let Some(missing) = descriptor
            .params
            .iter()
            .skip(self.parse.arguments.len())
            .find(|p| !p.has_default())
        {
            return Err(ConsoleError::MissingArgument {
                command: descriptor.display_name.clone(),
                parameter: missing.name.clone(),
            });
        }

        let values = self.parse.values();
        let record = HistoryRecord::executed(
            self.input.trim(),
            descriptor.display_name.clone(),
            self.parse.argument_texts(),
            values.clone(),
        );
        let is_builtin = matches!(descriptor.action, CommandAction::Builtin(_));

        let outcome = match self.macros.recording_trigger().map(str::to_string) {
            Some(trigger) if !is_builtin => {
                self.macros.capture(record.clone());
                if self.config.record_executes {
                    match self.dispatch(index, &values)? {
                        SubmitOutcome::Executed { report, .. } => SubmitOutcome::Executed {
                            report,
                            recorded: true,
                        },
                        other => other,
                    }
                } else {
                    tracing::debug!(command = %record.display, %trigger, "captured into macro");
                    SubmitOutcome::Recorded { trigger }
                }
            }
            _ => self.dispatch(index, &values)?,
        };

        self.history.push_executed(record);
        let stay_open = self.config.keep_open_after_command || self.macros.is_recording();
        self.set_input(String::new());
        if self.open && !stay_open {
            self.close();
        }
        Ok(outcome)
    }

    /// Replace the input with `text` and submit it.
    pub fn execute_text(&mut self, text: &str) -> Result<SubmitOutcome, ConsoleError> {
        self.set_input(text);
        self.submit()
    }

    fn dispatch(&mut self, index: usize, values: &[Value]) -> Result<SubmitOutcome, ConsoleError> {
        match execute(&self.registry, index, values)? {
            Dispatch::Ran(report) => Ok(SubmitOutcome::Executed {
                report,
                recorded: false,
            }),
            Dispatch::Builtin(builtin, args) => {
                let messages = self.run_builtin(builtin, &args)?;
                for message in &messages {
                    tracing::info!(command = builtin.name(), "{message}");
                }
                Ok(SubmitOutcome::Builtin {
                    command: builtin.name(),
                    messages,
                })
            }
        }
    }

    fn run_builtin(&mut self, builtin: Builtin, args: &[Value]) -> Result<Vec<String>, ConsoleError> {
        let text_arg = |i: usize| args.get(i).and_then(Value::as_text).unwrap_or("").trim();
        let history_store = self.history_store.describe();
        let macro_store = self.macro_store.describe();

        let messages = match builtin {
            Builtin::ClearCommandHistory => {
                self.history.clear();
                if args.first().and_then(Value::as_bool).unwrap_or(true) {
                    self.history.save(self.history_store.as_ref())?;
                    self.unreadable.history = false;
                    vec![format!("Command history cleared and saved to {history_store}")]
                } else {
                    vec!["Command history cleared".to_string()]
                }
            }
            Builtin::SaveHistoryCommands => {
                self.history.save(self.history_store.as_ref())?;
                self.unreadable.history = false;
                vec![format!("Saved {} commands to {history_store}", self.history.len())]
            }
            Builtin::LoadHistoryCommands => {
                let summary =
                    self.history
                        .load(self.history_store.as_ref(), &self.registry, &self.objects)?;
                self.unreadable.history = false;
                vec![format!(
                    "Loaded history from {history_store}: {}/{} resolved",
                    summary.valid, summary.total
                )]
            }
            Builtin::StartMacro => {
                let trigger = text_arg(0);
                self.macros.start(trigger)?;
                vec![format!("Recording macro for ({trigger})")]
            }
            Builtin::StopMacro => {
                let trigger = self.macros.recording_trigger().map(str::to_string);
                let message = match self.macros.stop()? {
                    Some(count) => {
                        if self.config.autosave && !self.unreadable.macros {
                            self.macros.save(self.macro_store.as_ref())?;
                        }
                        format!(
                            "Macro ({}) saved with {count} commands",
                            trigger.unwrap_or_default()
                        )
                    }
                    None => "Empty macro discarded".to_string(),
                };
                vec![message]
            }
            Builtin::SaveMacroCommands => {
                self.macros.save(self.macro_store.as_ref())?;
                self.unreadable.macros = false;
                vec![format!("Saved {} macros to {macro_store}", self.macros.macros().len())]
            }
            Builtin::LoadMacroCommands => {
                let summary =
                    self.macros
                        .load(self.macro_store.as_ref(), &self.registry, &self.objects)?;
                self.unreadable.macros = false;
                vec![format!(
                    "Loaded macros from {macro_store}: {}/{} resolved",
                    summary.valid, summary.total
                )]
            }
            Builtin::ClearAllMacros => {
                self.macros.clear();
                vec!["All macros cleared".to_string()]
            }
            Builtin::RemoveMacro => {
                let trigger = text_arg(0);
                if self.macros.remove(trigger) {
                    vec![format!("Macro ({trigger}) removed")]
                } else {
                    vec![format!("No macro bound to ({trigger})")]
                }
            }
            Builtin::ShowMacros => {
                let print_commands = args.first().and_then(Value::as_bool).unwrap_or(false);
                let mut lines = Vec::new();
                for m in self.macros.macros() {
                    lines.push(format!("Macro -> ({})", m.trigger));
                    if print_commands {
                        for record in &m.records {
                            if record.is_resolved() {
                                lines.push(format!("  Command: {}", record.display));
                            } else {
                                lines.push(format!("  Unresolved: {}", record.display));
                            }
                        }
                    }
                }
                if lines.is_empty() {
                    lines.push("No macros".to_string());
                }
                lines
            }
            Builtin::Help => help_text(&self.registry, Some(text_arg(0)))
                .lines()
                .map(str::to_string)
                .collect(),
        };
        Ok(messages)
    }

    // ── Macros ──────────────────────────────────────────────────

    /// Replay the macro bound to `trigger`, in recorded order, against the
    /// current targets. History is left untouched.
    pub fn trigger_macro(&mut self, trigger: &str) -> Result<MacroReplay, ConsoleError> {
        self.refresh_targets();
        let found = self
            .macros
            .find(trigger)
            .map(|m| (m.trigger.clone(), m.records.clone()))
            .ok_or_else(|| ConsoleError::UnknownMacro {
                trigger: trigger.to_string(),
            })?;
        let (trigger, records) = found;

        let mut replay = MacroReplay {
            trigger,
            ..MacroReplay::default()
        };
        for record in records {
            let index = record
                .is_resolved()
                .then(|| self.registry.lookup_by_display_name(&record.command_name))
                .flatten();
            let Some(index) = index else {
                tracing::debug!(command = %record.display, "skipping unresolved macro command");
                replay.skipped += 1;
                continue;
            };
            match self.dispatch(index, &record.values) {
                Ok(outcome) => {
                    replay.executed += 1;
                    if let SubmitOutcome::Executed { report, .. } = outcome {
                        replay.reports.push(report);
                    }
                }
                Err(e) => {
                    tracing::warn!(command = %record.display, error = %e, "macro command failed");
                    replay.skipped += 1;
                }
            }
        }
        tracing::info!(
            trigger = %replay.trigger,
            executed = replay.executed,
            skipped = replay.skipped,
            "macro replayed"
        );
        Ok(replay)
    }

    // ── Accessors ───────────────────────────────────────────────

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn parse_state(&self) -> &ParseState {
        &self.parse
    }

    pub fn hints(&self) -> &HintList {
        &self.hints
    }

    pub fn recall(&self) -> Recall {
        self.recall
    }

    pub fn selected_command(&self) -> Option<&CommandDescriptor> {
        self.parse.command.and_then(|i| self.registry.get(i))
    }

    /// The parameter the operator is filling in, if the command has one.
    pub fn pending_parameter(&self) -> Option<&ParameterDescriptor> {
        self.selected_command()?
            .param(self.parse.pending_parameter())
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn objects(&self) -> &ObjectCatalog {
        &self.objects
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn macros(&self) -> &MacroStore {
        &self.macros
    }

    pub fn recording_trigger(&self) -> Option<&str> {
        self.macros.recording_trigger()
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    pub fn resolution_summary(&self) -> ResolutionSummary {
        ResolutionSummary {
            history: self.history.summary(),
            macros: self.macros.summary(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use parking_lot::Mutex;

    use super::*;
    use crate::model::ParamType;
    use crate::registry::{HostCommands, StaticTable};
    use crate::storage::MemoryStore;

    struct Fixture {
        console: Console,
        calls: Arc<Mutex<Vec<String>>>,
        history: MemoryStore,
    }

    fn fixture(config: ConsoleConfig) -> Fixture {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut table = StaticTable::new("tests");
        let log = calls.clone();
        table
            .function("Add", move |args| {
                log.lock().push(format!("{}", args.int(0)? + args.int(1)?));
                Ok(())
            })
            .param("a", ParamType::INT)
            .param_with_default("b", ParamType::INT, Value::Int(10));
        let log = calls.clone();
        table
            .function("Say", move |args| {
                log.lock().push(args.text(0)?.to_string());
                Ok(())
            })
            .param("message", ParamType::Text);
        let source = HostCommands::new().with_statics(table);
        let history = MemoryStore::new("history");
        let setup = ConsoleSetup::new(config, Arc::new(source))
            .with_stores(history.clone(), MemoryStore::new("macros"));
        Fixture {
            console: Console::new(setup),
            calls,
            history,
        }
    }

    fn open_fixture() -> Fixture {
        let mut f = fixture(ConsoleConfig::default());
        f.console.open();
        f
    }

    #[test]
    fn open_registers_builtins_and_host_commands() {
        let f = open_fixture();
        assert!(f.console.is_open());
        assert!(f.console.registry().lookup_by_display_name("StartMacro").is_some());
        assert!(f.console.registry().lookup_by_display_name("add").is_some());
        assert_eq!(f.console.recall(), Recall::WaitForInput);
    }

    #[test]
    fn submit_runs_fills_defaults_and_closes() {
        let mut f = open_fixture();
        let outcome = f.console.execute_text("Add 5").unwrap();
        assert!(matches!(outcome, SubmitOutcome::Executed { ref report, .. } if report.invoked == 1));
        assert_eq!(f.calls.lock().as_slice(), ["15"]);
        assert!(!f.console.is_open());
        assert_eq!(f.console.history().len(), 1);
        // Closing autosaves.
        assert!(f.history.contents().unwrap().contains("Add 5"));
    }

    #[test]
    fn keep_open_after_command() {
        let mut f = fixture(ConsoleConfig {
            keep_open_after_command: true,
            ..ConsoleConfig::default()
        });
        f.console.open();
        f.console.execute_text("Add 1 2").unwrap();
        assert!(f.console.is_open());
        assert_eq!(f.console.input(), "");
        assert_eq!(f.console.recall(), Recall::WaitForInput);
    }

    #[test]
    fn submit_errors_leave_the_line_alone() {
        let mut f = open_fixture();
        assert!(matches!(
            f.console.execute_text("Nope"),
            Err(ConsoleError::UnknownCommand { .. })
        ));
        assert!(matches!(
            f.console.execute_text("Add x"),
            Err(ConsoleError::InvalidArgument { ref parameter, .. }) if parameter == "a"
        ));
        assert!(matches!(
            f.console.execute_text("Say"),
            Err(ConsoleError::MissingArgument { ref parameter, .. }) if parameter == "message"
        ));
        assert_eq!(f.console.input(), "Say");
        assert!(f.console.is_open());
        assert!(f.console.history().is_empty());
    }

    #[test]
    fn can_submit_needs_defaults_for_missing_parameters() {
        let mut f = open_fixture();
        f.console.set_input("Add");
        assert!(!f.console.can_submit());
        f.console.set_input("Add 3");
        assert!(f.console.can_submit());
        f.console.set_input("Add 3 4 5");
        assert!(!f.console.can_submit());
    }

    #[test]
    fn inserting_a_command_hint_commits_it() {
        let mut f = open_fixture();
        f.console.set_input("add");
        f.console.navigate(1);
        assert!(f.console.insert_selected_hint());
        assert_eq!(f.console.input(), "Add ");
        assert_eq!(f.console.pending_parameter().map(|p| p.name.as_str()), Some("a"));
    }

    #[test]
    fn recall_shows_history_after_first_navigation() {
        let mut f = fixture(ConsoleConfig {
            keep_open_after_command: true,
            ..ConsoleConfig::default()
        });
        f.console.open();
        f.console.execute_text("Say hello").unwrap();
        f.console.execute_text("Add 1").unwrap();

        assert_eq!(f.console.recall(), Recall::WaitForInput);
        f.console.navigate(1);
        assert_eq!(f.console.recall(), Recall::Showing);
        assert_eq!(f.console.hints().len(), 2);
        assert_eq!(f.console.hints().selected(), Some(0));
        assert!(f.console.insert_selected_hint());
        assert_eq!(f.console.input(), "Add 1 ");
        assert_eq!(f.console.recall(), Recall::Hidden);
    }

    #[test]
    fn backspace_removes_whole_items() {
        let mut f = open_fixture();
        f.console.set_input("Add 1 2");
        f.console.backspace(true);
        assert_eq!(f.console.input(), "Add 1 ");
        f.console.backspace(true);
        assert_eq!(f.console.input(), "Add ");
        f.console.backspace(true);
        assert_eq!(f.console.input(), "");

        f.console.set_input("no such thing");
        f.console.backspace(true);
        assert_eq!(f.console.input(), "no such");
        f.console.backspace(false);
        assert_eq!(f.console.input(), "no suc");
    }

    #[test]
    fn recording_captures_instead_of_running() {
        let mut f = open_fixture();
        f.console.execute_text("StartMacro F5").unwrap();
        assert!(f.console.is_open());
        let outcome = f.console.execute_text("Say hi").unwrap();
        assert_eq!(outcome, SubmitOutcome::Recorded { trigger: "F5".into() });
        assert!(f.calls.lock().is_empty());
        f.console.execute_text("StopMacro").unwrap();
        assert!(!f.console.is_open());

        let replay = f.console.trigger_macro("f5").unwrap();
        assert_eq!(replay.executed, 1);
        assert_eq!(f.calls.lock().as_slice(), ["hi"]);
    }

    #[test]
    fn record_executes_runs_and_captures() {
        let mut f = fixture(ConsoleConfig {
            record_executes: true,
            ..ConsoleConfig::default()
        });
        f.console.open();
        f.console.execute_text("StartMacro F6").unwrap();
        let outcome = f.console.execute_text("Say hi").unwrap();
        assert!(matches!(outcome, SubmitOutcome::Executed { recorded: true, .. }));
        assert_eq!(f.calls.lock().len(), 1);
    }

    #[test]
    fn closing_ends_an_empty_recording() {
        let mut f = open_fixture();
        f.console.execute_text("StartMacro F7").unwrap();
        f.console.close();
        assert!(f.console.recording_trigger().is_none());
        assert!(f.console.macros().macros().is_empty());
        assert!(matches!(
            f.console.trigger_macro("F7"),
            Err(ConsoleError::UnknownMacro { .. })
        ));
    }

    #[test]
    fn help_lists_commands() {
        let mut f = open_fixture();
        let outcome = f.console.execute_text("Help Add").unwrap();
        assert!(matches!(
            outcome,
            SubmitOutcome::Builtin { command: "Help", ref messages }
                if messages.iter().any(|m| m.contains("Add"))
        ));
    }

    #[test]
    fn clear_history_can_skip_the_save() {
        let mut f = fixture(ConsoleConfig {
            keep_open_after_command: true,
            autosave: false,
            ..ConsoleConfig::default()
        });
        f.console.open();
        f.console.execute_text("Add 1 2").unwrap();
        f.console.execute_text("SaveHistoryCommands").unwrap();

        f.console.execute_text("ClearCommandHistory false").unwrap();
        assert!(f.history.contents().unwrap().contains("Add 1 2"));
        f.console.execute_text("ClearCommandHistory").unwrap();
        assert!(!f.history.contents().unwrap().contains("Add 1 2"));
    }

    /// Store that fails every read and counts writes.
    #[derive(Clone, Default)]
    struct BrokenStore {
        writes: Arc<Mutex<usize>>,
    }

    impl LineStore for BrokenStore {
        fn load(&self) -> Result<Option<String>, ConsoleError> {
            Err(ConsoleError::Io {
                message: "device not ready".into(),
            })
        }

        fn store(&self, _: &str) -> Result<(), ConsoleError> {
            *self.writes.lock() += 1;
            Ok(())
        }

        fn describe(&self) -> String {
            "broken".into()
        }
    }

    #[test]
    fn unreadable_stores_are_not_overwritten_on_close() {
        let history = BrokenStore::default();
        let macros = BrokenStore::default();
        let source = HostCommands::new().with_statics(StaticTable::new("tests"));
        let setup = ConsoleSetup::new(ConsoleConfig::default(), Arc::new(source))
            .with_stores(history.clone(), macros.clone());
        let mut console = Console::new(setup);

        console.open();
        console.execute_text("ShowMacros").unwrap();
        assert_eq!(console.history().len(), 1);
        assert!(!console.is_open());
        assert_eq!(*history.writes.lock(), 0);
        assert_eq!(*macros.writes.lock(), 0);

        // An explicit save takes the store back, so closing saves it too.
        console.open();
        console.execute_text("SaveHistoryCommands").unwrap();
        assert_eq!(*history.writes.lock(), 2);
        assert_eq!(*macros.writes.lock(), 0);
    }
}
