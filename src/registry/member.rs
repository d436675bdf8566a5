//! Explicit registration tables.
//!
//! Hosts declare their commands once per type (`CommandHost`) or per module
//! (`StaticTable`). Every declaration becomes a `CommandCandidate`: member
//! identity, parameter schema, optional display-name override, the action to
//! run and, for instance members, a weak handle to the owning object.

use std::any::{Any, TypeId};
use std::marker::PhantomData;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::execute::Args;
use super::target::TargetHandle;
use crate::console::builtins::Builtin;
use crate::error::InvokeError;
use crate::model::{ParamType, ParameterDescriptor, Value};

/// Host callable. Static commands receive `None` as the target.
pub type Handler =
    Arc<dyn Fn(Option<&(dyn Any + Send + Sync)>, &Args<'_>) -> Result<(), InvokeError> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    Type(TypeId),
    Module(&'static str),
}

/// Identity of the underlying callable. Two candidates with equal ids are the
/// same command, whatever their targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberId {
    pub owner: Owner,
    pub owner_name: &'static str,
    pub member: String,
}

impl MemberId {
    pub fn of_type<T: Any>(member: impl Into<String>) -> Self {
        Self {
            owner: Owner::Type(TypeId::of::<T>()),
            owner_name: std::any::type_name::<T>(),
            member: member.into(),
        }
    }

    pub fn of_module(module: &'static str, member: impl Into<String>) -> Self {
        Self {
            owner: Owner::Module(module),
            owner_name: module,
            member: member.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum CommandKind {
    Method,
    FieldOrEvent,
}

#[derive(Clone)]
pub enum CommandAction {
    Handler(Handler),
    Builtin(Builtin),
}

impl std::fmt::Debug for CommandAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandAction::Handler(_) => f.write_str("Handler"),
            CommandAction::Builtin(b) => write!(f, "Builtin({b:?})"),
        }
    }
}

/// One discoverable member, as handed to the registry.
#[derive(Debug, Clone)]
pub struct CommandCandidate {
    pub member: MemberId,
    pub kind: CommandKind,
    pub params: Vec<ParameterDescriptor>,
    pub display_name: Option<String>,
    pub action: CommandAction,
    pub target: Option<TargetHandle>,
}

impl CommandCandidate {
    pub fn new(member: MemberId, kind: CommandKind, action: CommandAction) -> Self {
        Self {
            member,
            kind,
            params: Vec::new(),
            display_name: None,
            action,
            target: None,
        }
    }

    /// Display name, falling back to the member's declared name.
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.member.member)
    }

    pub fn param(&mut self, name: &str, ty: ParamType) -> &mut Self {
        self.params.push(ParameterDescriptor::new(name, ty));
        self
    }

    pub fn param_with_default(&mut self, name: &str, ty: ParamType, default: Value) -> &mut Self {
        self.params
            .push(ParameterDescriptor::new(name, ty).with_default(default));
        self
    }

    pub fn display_name(&mut self, name: &str) -> &mut Self {
        self.display_name = Some(name.to_string());
        self
    }
}

#[allow(clippy::indexing_slicing)] // the entry was just pushed
fn push_candidate(
    entries: &mut Vec<CommandCandidate>,
    candidate: CommandCandidate,
) -> &mut CommandCandidate {
    entries.push(candidate);
    let last = entries.len() - 1;
    &mut entries[last]
}

// ── Instance members ────────────────────────────────────────────

/// Command declarations for one host type.
pub struct MemberTable<T> {
    entries: Vec<CommandCandidate>,
    _owner: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> MemberTable<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            _owner: PhantomData,
        }
    }

    fn wrap<F>(f: F) -> Handler
    where
        F: Fn(&T, &Args<'_>) -> Result<(), InvokeError> + Send + Sync + 'static,
    {
        Arc::new(move |target: Option<&(dyn Any + Send + Sync)>, args: &Args<'_>| {
            let target = target
                .and_then(|t| t.downcast_ref::<T>())
                .ok_or(InvokeError::WrongTarget {
                    expected: std::any::type_name::<T>(),
                })?;
            f(target, args)
        })
    }

    /// A method command. Declare its parameters on the returned candidate.
    pub fn method<F>(&mut self, name: &str, f: F) -> &mut CommandCandidate
    where
        F: Fn(&T, &Args<'_>) -> Result<(), InvokeError> + Send + Sync + 'static,
    {
        push_candidate(
            &mut self.entries,
            CommandCandidate::new(
                MemberId::of_type::<T>(name),
                CommandKind::Method,
                CommandAction::Handler(Self::wrap(f)),
            ),
        )
    }

    /// A settable field: one parameter named after the field.
    pub fn field<F>(&mut self, name: &str, ty: ParamType, set: F) -> &mut CommandCandidate
    where
        F: Fn(&T, &Value) -> Result<(), InvokeError> + Send + Sync + 'static,
    {
        let candidate = push_candidate(
            &mut self.entries,
            CommandCandidate::new(
                MemberId::of_type::<T>(name),
                CommandKind::FieldOrEvent,
                CommandAction::Handler(Self::wrap(move |t, args| set(t, args.value(0)?))),
            ),
        );
        candidate.param(name, ty)
    }

    /// An event with no parameters.
    pub fn event<F>(&mut self, name: &str, raise: F) -> &mut CommandCandidate
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        push_candidate(
            &mut self.entries,
            CommandCandidate::new(
                MemberId::of_type::<T>(name),
                CommandKind::FieldOrEvent,
                CommandAction::Handler(Self::wrap(move |t, _| {
                    raise(t);
                    Ok(())
                })),
            ),
        )
    }

    pub fn into_candidates(self) -> Vec<CommandCandidate> {
        self.entries
    }
}

impl<T: Any + Send + Sync> Default for MemberTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A host type whose instances expose commands.
pub trait CommandHost: Any + Send + Sync + Sized {
    fn declare_commands(table: &mut MemberTable<Self>);
}

/// Candidates for one live object, each bound to it as a target.
pub fn instance_candidates<T: CommandHost>(object: &Arc<T>) -> Vec<CommandCandidate> {
    let mut table = MemberTable::<T>::new();
    T::declare_commands(&mut table);
    let target = TargetHandle::new(object);
    table
        .into_candidates()
        .into_iter()
        .map(|mut c| {
            c.target = Some(target.clone());
            c
        })
        .collect()
}

// ── Static members ──────────────────────────────────────────────

/// Free functions grouped under a module path.
pub struct StaticTable {
    module: &'static str,
    entries: Vec<CommandCandidate>,
}

impl StaticTable {
    pub fn new(module: &'static str) -> Self {
        Self {
            module,
            entries: Vec::new(),
        }
    }

    pub fn function<F>(&mut self, name: &str, f: F) -> &mut CommandCandidate
    where
        F: Fn(&Args<'_>) -> Result<(), InvokeError> + Send + Sync + 'static,
    {
        let handler: Handler =
            Arc::new(move |_: Option<&(dyn Any + Send + Sync)>, args: &Args<'_>| f(args));
        push_candidate(
            &mut self.entries,
            CommandCandidate::new(
                MemberId::of_module(self.module, name),
                CommandKind::Method,
                CommandAction::Handler(handler),
            ),
        )
    }

    pub fn into_candidates(self) -> Vec<CommandCandidate> {
        self.entries
    }
}

// ── Candidate source ────────────────────────────────────────────

/// Where the console discovers commands. The static scan runs once per
/// registry; the instance scan runs on every open and target refresh.
pub trait CandidateSource: Send + Sync {
    fn static_candidates(&self) -> Vec<CommandCandidate>;
    fn instance_candidates(&self) -> Vec<CommandCandidate>;
}

trait LiveObject: Send + Sync {
    fn is_alive(&self) -> bool;
    fn candidates(&self) -> Vec<CommandCandidate>;
}

struct Tracked<T>(Weak<T>);

impl<T: CommandHost> LiveObject for Tracked<T> {
    fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }

    fn candidates(&self) -> Vec<CommandCandidate> {
        self.0
            .upgrade()
            .map(|object| instance_candidates(&object))
            .unwrap_or_default()
    }
}

/// Default `CandidateSource`: static tables fixed at construction plus a
/// list of weakly tracked host objects. Dropped objects fall out of the
/// list on the next instance scan.
#[derive(Default)]
pub struct HostCommands {
    statics: Vec<CommandCandidate>,
    live: Mutex<Vec<Box<dyn LiveObject>>>,
}

impl HostCommands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_statics(mut self, table: StaticTable) -> Self {
        self.statics.extend(table.into_candidates());
        self
    }

    pub fn track<T: CommandHost>(&self, object: &Arc<T>) {
        self.live
            .lock()
            .push(Box::new(Tracked(Arc::downgrade(object))));
    }

    pub fn tracked_count(&self) -> usize {
        self.live.lock().iter().filter(|o| o.is_alive()).count()
    }
}

impl CandidateSource for HostCommands {
    fn static_candidates(&self) -> Vec<CommandCandidate> {
        self.statics.clone()
    }

    fn instance_candidates(&self) -> Vec<CommandCandidate> {
        let mut live = self.live.lock();
        live.retain(|o| o.is_alive());
        live.iter().flat_map(|o| o.candidates()).collect()
    }
}
