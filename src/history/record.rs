use serde::Serialize;

use crate::convert::convert;
use crate::input::tokenizer::eq_ignore_case;
use crate::model::Value;
use crate::objects::ObjectCatalog;
use crate::registry::CommandRegistry;

/// How far a stored record has been matched against the live registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ResolutionState {
    Unresolved,
    CommandMatched,
    FullyResolved,
}

/// One previously executed command, as typed and as resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    /// The line exactly as the operator typed it.
    pub display: String,
    pub command_name: String,
    pub argument_texts: Vec<String>,
    /// Converted prefix of `argument_texts`. Complete only when fully resolved.
    pub values: Vec<Value>,
    pub state: ResolutionState,
}

impl HistoryRecord {
    /// A record for a command that just ran.
    pub fn executed(
        display: impl Into<String>,
        command_name: impl Into<String>,
        argument_texts: Vec<String>,
        values: Vec<Value>,
    ) -> Self {
        Self {
            display: sanitize(&display.into()),
            command_name: command_name.into(),
            argument_texts,
            values,
            state: ResolutionState::FullyResolved,
        }
    }

    /// A record read back from storage, not yet matched.
    pub fn unresolved(
        display: impl Into<String>,
        command_name: impl Into<String>,
        argument_texts: Vec<String>,
    ) -> Self {
        Self {
            display: sanitize(&display.into()),
            command_name: command_name.into(),
            argument_texts,
            values: Vec::new(),
            state: ResolutionState::Unresolved,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.state == ResolutionState::FullyResolved
    }

    /// Canonical input line: command name followed by argument texts.
    pub fn command_line(&self) -> String {
        let mut line = self.command_name.clone();
        for arg in &self.argument_texts {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// Re-derive the typed values from the stored texts. Runs from scratch so
    /// the result only depends on the current registry and catalog.
    /// Returns the index of the matched command.
    pub fn resolve(&mut self, registry: &CommandRegistry, objects: &ObjectCatalog) -> Option<usize> {
        let before = self.state;
        self.values.clear();
        let Some(index) = registry.lookup_by_display_name(&self.command_name) else {
            self.state = ResolutionState::Unresolved;
            return None;
        };
        let Some(descriptor) = registry.get(index) else {
            self.state = ResolutionState::Unresolved;
            return None;
        };
        self.command_name.clone_from(&descriptor.display_name);
        self.state = ResolutionState::CommandMatched;

        for (i, text) in self.argument_texts.iter().enumerate() {
            let Some(param) = descriptor.param(i) else {
                break;
            };
            match convert(&param.ty, text, objects) {
                Ok(value) => self.values.push(value),
                Err(_) => break,
            }
        }
        if self.values.len() == self.argument_texts.len() {
            self.state = ResolutionState::FullyResolved;
            if before != ResolutionState::FullyResolved {
                tracing::debug!(command = %self.display, "history record resolved");
            }
        }
        Some(index)
    }

    /// Same command (ignoring case) with equal argument values.
    pub fn same_invocation(&self, other: &HistoryRecord) -> bool {
        eq_ignore_case(&self.command_name, &other.command_name)
            && if self.is_resolved() && other.is_resolved() {
                self.values == other.values
            } else {
                self.argument_texts == other.argument_texts
            }
    }
}

/// Records are stored one field per line.
fn sanitize(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::model::ParamType;
    use crate::registry::StaticTable;

    fn registry() -> CommandRegistry {
        let mut table = StaticTable::new("tests");
        table
            .function("Teleport", |_| Ok(()))
            .param("to", ParamType::VEC2)
            .param("fast", ParamType::Bool);
        let mut registry = CommandRegistry::new();
        registry.register_static(table.into_candidates()).unwrap();
        registry
    }

    #[test]
    fn unknown_command_stays_unresolved() {
        let mut record = HistoryRecord::unresolved("Warp 1", "Warp", vec!["1".into()]);
        assert_eq!(record.resolve(&registry(), &ObjectCatalog::new()), None);
        assert_eq!(record.state, ResolutionState::Unresolved);
    }

    #[test]
    fn partial_arguments_leave_a_prefix() {
        let mut record =
            HistoryRecord::unresolved("teleport 1 2 maybe", "teleport", vec!["1 2".into(), "maybe".into()]);
        assert_eq!(record.resolve(&registry(), &ObjectCatalog::new()), Some(0));
        assert_eq!(record.state, ResolutionState::CommandMatched);
        assert_eq!(record.command_name, "Teleport");
        assert_eq!(record.values, vec![Value::Vec2([1.0, 2.0])]);
    }

    #[test]
    fn full_resolution_recovers_values() {
        let mut record =
            HistoryRecord::unresolved("Teleport 1 2 true", "Teleport", vec!["1 2".into(), "true".into()]);
        record.resolve(&registry(), &ObjectCatalog::new());
        assert!(record.is_resolved());
        assert_eq!(record.values[1], Value::Bool(true));
        assert_eq!(record.command_line(), "Teleport 1 2 true");
    }

    #[test]
    fn too_many_arguments_never_resolve() {
        let mut record = HistoryRecord::unresolved(
            "x",
            "Teleport",
            vec!["1 2".into(), "true".into(), "extra".into()],
        );
        record.resolve(&registry(), &ObjectCatalog::new());
        assert_eq!(record.state, ResolutionState::CommandMatched);
    }

    #[test]
    fn invocation_identity_uses_values() {
        let a = HistoryRecord::executed("teleport 1 2", "Teleport", vec!["1 2".into()], vec![Value::Vec2([1.0, 2.0])]);
        let b = HistoryRecord::executed("TELEPORT 1.0 2", "teleport", vec!["1.0 2".into()], vec![Value::Vec2([1.0, 2.0])]);
        let c = HistoryRecord::executed("Teleport 2 1", "Teleport", vec!["2 1".into()], vec![Value::Vec2([2.0, 1.0])]);
        assert!(a.same_invocation(&b));
        assert!(!a.same_invocation(&c));
    }

    #[test]
    fn display_text_is_kept_on_one_line() {
        let record = HistoryRecord::unresolved("a\nb", "a", Vec::new());
        assert_eq!(record.display, "a b");
    }
}
