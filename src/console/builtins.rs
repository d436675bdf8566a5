//! Commands the console registers for itself: history and macro
//! management plus `Help`. They dispatch back into the console instead of
//! running a host handler.

use crate::model::{ParamType, Value};
use crate::registry::{CommandAction, CommandCandidate, CommandKind, MemberId};

pub const MODULE: &str = "devconsole::console";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    ClearCommandHistory,
    SaveHistoryCommands,
    LoadHistoryCommands,
    StartMacro,
    StopMacro,
    SaveMacroCommands,
    LoadMacroCommands,
    ClearAllMacros,
    RemoveMacro,
    ShowMacros,
    Help,
}

impl Builtin {
    pub fn all() -> &'static [Builtin] {
        &[
            Self::ClearCommandHistory,
            Self::SaveHistoryCommands,
            Self::LoadHistoryCommands,
            Self::StartMacro,
            Self::StopMacro,
            Self::SaveMacroCommands,
            Self::LoadMacroCommands,
            Self::ClearAllMacros,
            Self::RemoveMacro,
            Self::ShowMacros,
            Self::Help,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ClearCommandHistory => "ClearCommandHistory",
            Self::SaveHistoryCommands => "SaveHistoryCommands",
            Self::LoadHistoryCommands => "LoadHistoryCommands",
            Self::StartMacro => "StartMacro",
            Self::StopMacro => "StopMacro",
            Self::SaveMacroCommands => "SaveMacroCommands",
            Self::LoadMacroCommands => "LoadMacroCommands",
            Self::ClearAllMacros => "ClearAllMacros",
            Self::RemoveMacro => "RemoveMacro",
            Self::ShowMacros => "ShowMacros",
            Self::Help => "Help",
        }
    }

    fn candidate(self) -> CommandCandidate {
        let mut candidate = CommandCandidate::new(
            MemberId::of_module(MODULE, self.name()),
            CommandKind::Method,
            CommandAction::Builtin(self),
        );
        match self {
            Self::StartMacro | Self::RemoveMacro => {
                candidate.param("trigger", ParamType::Text);
            }
            Self::ClearCommandHistory => {
                candidate.param_with_default("save", ParamType::Bool, Value::Bool(true));
            }
            Self::ShowMacros => {
                candidate.param_with_default("print_commands", ParamType::Bool, Value::Bool(false));
            }
            Self::Help => {
                candidate.param_with_default("topic", ParamType::Text, Value::Text(String::new()));
            }
            _ => {}
        }
        candidate
    }

    /// Static candidates for every built-in command.
    pub fn candidates() -> Vec<CommandCandidate> {
        Self::all().iter().map(|b| b.candidate()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_is_a_static_module_command() {
        let candidates = Builtin::candidates();
        assert_eq!(candidates.len(), Builtin::all().len());
        for c in &candidates {
            assert!(c.target.is_none());
            assert!(matches!(c.action, CommandAction::Builtin(b) if b.name() == c.name()));
        }
    }

    #[test]
    fn optional_parameters_have_defaults() {
        let candidates = Builtin::candidates();
        let show = candidates.iter().find(|c| c.name() == "ShowMacros");
        assert!(show.is_some_and(|c| c.params.iter().all(|p| p.has_default())));
        let clear = candidates.iter().find(|c| c.name() == "ClearCommandHistory");
        assert!(clear.is_some_and(|c| c.params.len() == 1 && c.params.iter().all(|p| p.has_default())));
        let start = candidates.iter().find(|c| c.name() == "StartMacro");
        assert!(start.is_some_and(|c| c.params.len() == 1 && !c.params.iter().any(|p| p.has_default())));
    }
}
