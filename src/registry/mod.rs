pub mod catalog;
pub mod execute;
pub mod member;
pub mod target;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::ConsoleError;
use crate::model::ParameterDescriptor;

pub use execute::{execute, fill_defaults, Args, Dispatch, ExecutionReport};
pub use member::{
    instance_candidates, CandidateSource, CommandAction, CommandCandidate, CommandHost,
    CommandKind, Handler, HostCommands, MemberId, MemberTable, StaticTable,
};
pub use target::TargetHandle;

// ── Command descriptor ──────────────────────────────────────────

/// One registered command: display name, schema, identity and targets.
#[derive(Debug, Clone)]
pub struct CommandDescriptor {
    pub display_name: String,
    pub member: MemberId,
    pub kind: CommandKind,
    pub params: Vec<ParameterDescriptor>,
    pub action: CommandAction,
    targets: Vec<TargetHandle>,
    scope: Scope,
    hint_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Scope {
    Static,
    Instance,
}

impl CommandDescriptor {
    fn from_candidate(candidate: CommandCandidate) -> Self {
        let display_name = candidate.name().to_string();
        let hint_text = hint_text(&display_name, &candidate.params);
        let (scope, targets) = match candidate.target {
            Some(target) => (Scope::Instance, vec![target]),
            None => (Scope::Static, Vec::new()),
        };
        Self {
            display_name,
            member: candidate.member,
            kind: candidate.kind,
            params: candidate.params,
            action: candidate.action,
            targets,
            scope,
            hint_text,
        }
    }

    /// Adds `target` unless the same object is already a target.
    fn add_target(&mut self, target: TargetHandle) -> bool {
        if self.targets.iter().any(|t| t.same_as(&target)) {
            return false;
        }
        self.targets.push(target);
        true
    }

    pub fn targets(&self) -> &[TargetHandle] {
        &self.targets
    }

    pub fn live_targets(&self) -> usize {
        self.targets.iter().filter(|t| t.is_alive()).count()
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn is_static(&self) -> bool {
        self.scope == Scope::Static
    }

    pub fn param(&self, index: usize) -> Option<&ParameterDescriptor> {
        self.params.get(index)
    }

    /// `Name <p1> <p2>`, shown in command hints and listings.
    pub fn hint_text(&self) -> &str {
        &self.hint_text
    }
}

fn hint_text(name: &str, params: &[ParameterDescriptor]) -> String {
    let mut text = name.to_string();
    for p in params {
        text.push_str(" <");
        text.push_str(&p.name);
        text.push('>');
    }
    text
}

// ── Registry ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegistrationSummary {
    /// Descriptors created by this pass.
    pub commands: usize,
    /// Targets attached to descriptors.
    pub targets: usize,
    /// Targets already present on their descriptor.
    pub duplicate_targets: usize,
    /// Candidates skipped because a different member owns the name.
    pub collisions: usize,
}

/// Catalog of commands, keyed by lowercase display name in registration
/// order. Static commands come first and survive instance rebuilds.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: IndexMap<String, CommandDescriptor>,
    static_count: usize,
    static_registered: bool,
    generation: u64,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the static scan. Allowed once per registry.
    pub fn register_static(
        &mut self,
        candidates: Vec<CommandCandidate>,
    ) -> Result<RegistrationSummary, ConsoleError> {
        if self.static_registered {
            return Err(ConsoleError::StaticAlreadyRegistered);
        }
        // Instance descriptors, if any, are rebuilt on top of the statics.
        self.commands.clear();
        let mut summary = RegistrationSummary::default();
        for candidate in candidates {
            self.insert(candidate, &mut summary);
        }
        self.static_count = self.commands.len();
        self.static_registered = true;
        self.generation += 1;
        tracing::info!(
            commands = summary.commands,
            collisions = summary.collisions,
            "registered static commands"
        );
        Ok(summary)
    }

    /// Rebuild instance commands from the current live objects. Candidates
    /// sharing a member identity merge into one descriptor; a target listed
    /// twice is kept once.
    pub fn register_instance(&mut self, candidates: Vec<CommandCandidate>) -> RegistrationSummary {
        self.commands.truncate(self.static_count);
        let mut summary = RegistrationSummary::default();
        for candidate in candidates {
            self.insert(candidate, &mut summary);
        }
        self.generation += 1;
        tracing::debug!(
            commands = summary.commands,
            targets = summary.targets,
            duplicates = summary.duplicate_targets,
            "registered instance commands"
        );
        summary
    }

    fn insert(&mut self, candidate: CommandCandidate, summary: &mut RegistrationSummary) {
        let key = candidate.name().to_lowercase();
        if key.is_empty() || key.contains(char::is_whitespace) {
            tracing::warn!(name = candidate.name(), "command names must be a single word");
            summary.collisions += 1;
            return;
        }
        match self.commands.get_mut(&key) {
            Some(existing) if existing.member == candidate.member => {
                if let Some(target) = candidate.target {
                    if existing.add_target(target) {
                        summary.targets += 1;
                    } else {
                        summary.duplicate_targets += 1;
                    }
                }
            }
            Some(existing) => {
                tracing::warn!(
                    name = %existing.display_name,
                    kept = existing.member.owner_name,
                    skipped = candidate.member.owner_name,
                    "display name already taken by another member"
                );
                summary.collisions += 1;
            }
            None => {
                let descriptor = CommandDescriptor::from_candidate(candidate);
                summary.targets += descriptor.targets.len();
                summary.commands += 1;
                self.commands.insert(key, descriptor);
            }
        }
    }

    pub fn lookup_by_display_name(&self, name: &str) -> Option<usize> {
        self.commands.get_index_of(&name.to_lowercase())
    }

    pub fn get(&self, index: usize) -> Option<&CommandDescriptor> {
        self.commands.get_index(index).map(|(_, d)| d)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &CommandDescriptor)> {
        self.commands.values().enumerate()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn static_registered(&self) -> bool {
        self.static_registered
    }

    /// Bumped on every registration pass; persisted records re-resolve when
    /// it changes.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::ParamType;

    struct Door;

    impl CommandHost for Door {
        fn declare_commands(table: &mut MemberTable<Self>) {
            table.event("Open", |_| {});
            table
                .method("Lock", |_, _| Ok(()))
                .param("code", ParamType::INT)
                .param("loud", ParamType::Bool);
        }
    }

    struct Window;

    impl CommandHost for Window {
        fn declare_commands(table: &mut MemberTable<Self>) {
            table.event("Open", |_| {});
        }
    }

    fn statics() -> Vec<CommandCandidate> {
        let mut table = StaticTable::new("tests");
        table.function("Load", |_| Ok(()));
        table.function("LoadScene", |_| Ok(())).param("name", ParamType::Text);
        table.into_candidates()
    }

    #[test]
    fn static_registration_runs_once() {
        let mut registry = CommandRegistry::new();
        registry.register_static(statics()).unwrap();
        assert_eq!(
            registry.register_static(statics()),
            Err(ConsoleError::StaticAlreadyRegistered)
        );
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn instance_registration_is_idempotent() {
        let a = Arc::new(Door);
        let b = Arc::new(Door);
        let scan = || {
            let mut c = instance_candidates(&a);
            c.extend(instance_candidates(&b));
            c.extend(instance_candidates(&a));
            c
        };
        let mut registry = CommandRegistry::new();
        registry.register_static(statics()).unwrap();
        let first = registry.register_instance(scan());
        assert_eq!(first.commands, 2);
        assert_eq!(first.targets, 4);
        assert_eq!(first.duplicate_targets, 2);

        registry.register_instance(scan());
        assert_eq!(registry.len(), 4);
        let open = registry.get(registry.lookup_by_display_name("open").unwrap()).unwrap();
        assert_eq!(open.targets().len(), 2);
        assert_eq!(open.scope(), Scope::Instance);
    }

    #[test]
    fn colliding_member_is_skipped() {
        let door = Arc::new(Door);
        let window = Arc::new(Window);
        let mut registry = CommandRegistry::new();
        let mut candidates = instance_candidates(&door);
        candidates.extend(instance_candidates(&window));
        let summary = registry.register_instance(candidates);
        assert_eq!(summary.collisions, 1);
        let open = registry.get(registry.lookup_by_display_name("Open").unwrap()).unwrap();
        assert_eq!(open.member, MemberId::of_type::<Door>("Open"));
        assert_eq!(open.targets().len(), 1);
    }

    #[test]
    fn hint_text_lists_parameters() {
        let door = Arc::new(Door);
        let mut registry = CommandRegistry::new();
        registry.register_instance(instance_candidates(&door));
        let lock = registry.get(registry.lookup_by_display_name("LOCK").unwrap()).unwrap();
        assert_eq!(lock.hint_text(), "Lock <code> <loud>");
    }

    #[test]
    fn generation_advances_per_pass() {
        let mut registry = CommandRegistry::new();
        assert_eq!(registry.generation(), 0);
        registry.register_static(statics()).unwrap();
        registry.register_instance(Vec::new());
        assert_eq!(registry.generation(), 2);
    }
}
