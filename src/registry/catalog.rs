use serde::Serialize;

use super::{CommandKind, CommandRegistry, Scope};

/// Listing entry for one registered command.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "ts-export", derive(ts_rs::TS))]
pub struct CommandSummary {
    pub name: String,
    pub hint: String,
    #[cfg_attr(feature = "ts-export", ts(type = "string"))]
    pub kind: CommandKind,
    #[cfg_attr(feature = "ts-export", ts(type = "string"))]
    pub scope: Scope,
    pub params: Vec<ParamSummary>,
    pub targets: usize,
    pub live_targets: usize,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "ts-export", derive(ts_rs::TS))]
pub struct ParamSummary {
    pub name: String,
    pub ty: String,
    pub default: Option<String>,
}

/// Every command in registry order.
pub fn command_list(registry: &CommandRegistry) -> Vec<CommandSummary> {
    registry
        .iter()
        .map(|(_, d)| CommandSummary {
            name: d.display_name.clone(),
            hint: d.hint_text().to_string(),
            kind: d.kind,
            scope: d.scope(),
            params: d
                .params
                .iter()
                .map(|p| ParamSummary {
                    name: p.name.clone(),
                    ty: p.ty.to_string(),
                    default: p.default.as_ref().map(ToString::to_string),
                })
                .collect(),
            targets: d.targets().len(),
            live_targets: d.live_targets(),
        })
        .collect()
}

/// Help text for the console. No topic lists every command; a topic that
/// names a command shows its parameters; anything else filters the list.
pub fn help_text(registry: &CommandRegistry, topic: Option<&str>) -> String {
    let list = command_list(registry);
    let topic = topic.map(str::trim).filter(|t| !t.is_empty());

    match topic {
        None => {
            let mut lines = vec![format!("{} commands:", list.len())];
            for scope in [Scope::Static, Scope::Instance] {
                for entry in list.iter().filter(|e| e.scope == scope) {
                    lines.push(format!("  {}", describe_line(entry)));
                }
            }
            lines.push(String::new());
            lines.push("Use Help <command> for parameter details.".to_string());
            lines.join("\n")
        }
        Some(topic) => {
            if let Some(index) = registry.lookup_by_display_name(topic) {
                if let Some(entry) = list.get(index) {
                    return describe_command(entry);
                }
            }

            let words = crate::input::tokenizer::words(topic);
            let matching: Vec<&CommandSummary> = list
                .iter()
                .filter(|e| crate::input::tokenizer::contains_all_words(&e.name, &words))
                .collect();
            if matching.is_empty() {
                format!("Unknown topic: \"{topic}\". Use Help to list commands.")
            } else {
                let mut lines = vec![format!("Commands matching \"{topic}\":")];
                for entry in matching {
                    lines.push(format!("  {}", describe_line(entry)));
                }
                lines.join("\n")
            }
        }
    }
}

fn describe_line(entry: &CommandSummary) -> String {
    match entry.scope {
        Scope::Static => entry.hint.clone(),
        Scope::Instance => format!("{}  [{} target(s)]", entry.hint, entry.live_targets),
    }
}

fn describe_command(entry: &CommandSummary) -> String {
    let mut lines = vec![
        entry.hint.clone(),
        format!(
            "Kind: {:?} | Scope: {:?} | Targets: {}/{} live",
            entry.kind, entry.scope, entry.live_targets, entry.targets
        ),
    ];
    if entry.params.is_empty() {
        lines.push("No parameters.".to_string());
    } else {
        lines.push(String::new());
        lines.push("Parameters:".to_string());
        for p in &entry.params {
            match &p.default {
                Some(default) => lines.push(format!("  {}: {} = {default}", p.name, p.ty)),
                None => lines.push(format!("  {}: {}", p.name, p.ty)),
            }
        }
    }
    lines.join("\n")
}
