//! Hint engine: completions for the current parse state, recomputed from
//! scratch on every input change, plus the selection cursor over them.

use crate::convert;
use crate::history::record::{HistoryRecord, ResolutionState};
use crate::model::{ParamType, Value};
use crate::objects::ObjectCatalog;
use crate::registry::CommandRegistry;

use super::parser::{symbolic_names, ParseState};
use super::tokenizer::{contains_all_words, words};

#[derive(Debug, Clone, PartialEq)]
pub enum HintPayload {
    Command(usize),
    Value(Value),
    /// Index into the history list.
    History(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HintEntry {
    pub display_text: String,
    /// Text spliced into the input when the hint is inserted.
    pub insert_text: String,
    pub payload: HintPayload,
    /// Disabled entries are listed but cannot be inserted.
    pub enabled: bool,
}

/// Freshly generated hints, with the entry to pre-select if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hints {
    pub entries: Vec<HintEntry>,
    pub auto_select: Option<usize>,
}

pub struct HintContext<'a> {
    pub registry: &'a CommandRegistry,
    pub objects: &'a ObjectCatalog,
    pub max_hints: usize,
}

pub fn generate_hints(state: &ParseState, ctx: &HintContext<'_>) -> Hints {
    let Some(index) = state.command else {
        return command_hints(&words(&state.remainder), ctx);
    };
    let Some(descriptor) = ctx.registry.get(index) else {
        return Hints::default();
    };
    if !state.command_committed {
        return command_hints(&[descriptor.display_name.as_str()], ctx);
    }
    // Past the last parameter the command is full.
    let Some(param) = descriptor.param(state.pending_parameter()) else {
        return Hints::default();
    };

    let active = state.active_text();
    match &param.ty {
        ParamType::Bool | ParamType::Enum(_) | ParamType::Object(_) => {
            let filter = words(active);
            let filter: &[&str] = if matches!(param.ty, ParamType::Bool) {
                &[]
            } else {
                &filter
            };
            let entries = symbolic_names(&param.ty, ctx.objects)
                .into_iter()
                .filter(|name| contains_all_words(name, filter))
                .filter_map(|name| {
                    let value = convert::convert(&param.ty, &name, ctx.objects).ok()?;
                    Some(HintEntry {
                        display_text: name.clone(),
                        insert_text: name,
                        payload: HintPayload::Value(value),
                        enabled: true,
                    })
                })
                .take(ctx.max_hints)
                .collect();
            Hints {
                entries,
                auto_select: None,
            }
        }
        ParamType::Unsupported(_) => Hints::default(),
        _ => {
            // "Apply current value": only offered once the text converts.
            let text = active.trim();
            match convert::convert(&param.ty, text, ctx.objects) {
                Ok(value) if !text.is_empty() && ctx.max_hints > 0 => Hints {
                    entries: vec![HintEntry {
                        display_text: text.to_string(),
                        insert_text: text.to_string(),
                        payload: HintPayload::Value(value),
                        enabled: true,
                    }],
                    auto_select: Some(0),
                },
                _ => Hints::default(),
            }
        }
    }
}

/// Every command whose display name contains all the words, in registry order.
fn command_hints(filter: &[&str], ctx: &HintContext<'_>) -> Hints {
    let entries = ctx
        .registry
        .iter()
        .filter(|(_, d)| contains_all_words(&d.display_name, filter))
        .map(|(index, d)| HintEntry {
            display_text: d.hint_text().to_string(),
            insert_text: d.display_name.clone(),
            payload: HintPayload::Command(index),
            enabled: true,
        })
        .take(ctx.max_hints)
        .collect();
    Hints {
        entries,
        auto_select: None,
    }
}

/// Recall mode: the history list, most recent first. Records that no longer
/// resolve are shown but disabled.
pub fn recall_hints(records: &[HistoryRecord], max_hints: usize) -> Hints {
    let entries = records
        .iter()
        .enumerate()
        .take(max_hints)
        .map(|(i, record)| HintEntry {
            display_text: record.display.clone(),
            insert_text: record.command_line(),
            payload: HintPayload::History(i),
            enabled: record.state == ResolutionState::FullyResolved,
        })
        .collect();
    Hints {
        entries,
        auto_select: None,
    }
}

// ── Selection ───────────────────────────────────────────────────

/// The visible hint list and its selection. `None` means nothing is
/// selected; navigation wraps through it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HintList {
    entries: Vec<HintEntry>,
    selected: Option<usize>,
}

impl HintList {
    /// Swap in freshly generated hints. An auto-selected entry wins;
    /// otherwise the previous selection is kept while still in range.
    pub fn refresh(&mut self, hints: Hints) {
        self.entries = hints.entries;
        self.selected = hints
            .auto_select
            .or(self.selected)
            .filter(|&i| i < self.entries.len());
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.selected = None;
    }

    /// Move the selection by `delta`, wrapping through "no selection".
    pub fn navigate(&mut self, delta: i32) {
        let Ok(count) = i64::try_from(self.entries.len()) else {
            return;
        };
        if count == 0 {
            self.selected = None;
            return;
        }
        let current = self
            .selected
            .and_then(|i| i64::try_from(i).ok())
            .map_or(0, |i| i + 1);
        let next = (current + i64::from(delta)).rem_euclid(count + 1);
        self.selected = usize::try_from(next - 1).ok();
    }

    pub fn entries(&self) -> &[HintEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_entry(&self) -> Option<&HintEntry> {
        self.selected.and_then(|i| self.entries.get(i))
    }
}
