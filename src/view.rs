//! Render-facing snapshot of the console: what the input box, the argument
//! chips and the hint list need to draw one frame.

use serde::Serialize;

use crate::console::{Console, Recall};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts-export", derive(ts_rs::TS))]
pub struct ArgumentChip {
    pub text: String,
    /// Tentative chips are still being typed and may change.
    pub committed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts-export", derive(ts_rs::TS))]
pub struct HintView {
    pub text: String,
    pub enabled: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts-export", derive(ts_rs::TS))]
pub struct ConsoleView {
    pub open: bool,
    /// Trigger of the macro being recorded.
    pub recording: Option<String>,
    pub input: String,
    pub command: Option<String>,
    pub arguments: Vec<ArgumentChip>,
    /// `(name: type)` of the parameter being filled in.
    pub pending_parameter: Option<String>,
    pub remainder: String,
    pub hints: Vec<HintView>,
    pub showing_history: bool,
    pub can_submit: bool,
}

impl ConsoleView {
    pub fn of(console: &Console) -> Self {
        let state = console.parse_state();
        let selected = console.hints().selected();
        Self {
            open: console.is_open(),
            recording: console.recording_trigger().map(str::to_string),
            input: console.input().to_string(),
            command: console.selected_command().map(|d| d.display_name.clone()),
            arguments: state
                .arguments
                .iter()
                .map(|a| ArgumentChip {
                    text: a.display_text.clone(),
                    committed: a.committed,
                })
                .collect(),
            pending_parameter: console
                .pending_parameter()
                .map(|p| format!("({}: {})", p.name, p.ty)),
            remainder: state.remainder.clone(),
            hints: console
                .hints()
                .entries()
                .iter()
                .enumerate()
                .map(|(i, h)| HintView {
                    text: h.display_text.clone(),
                    enabled: h.enabled,
                    selected: selected == Some(i),
                })
                .collect(),
            showing_history: console.recall() == Recall::Showing,
            can_submit: console.can_submit(),
        }
    }
}
