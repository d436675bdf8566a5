//! Input parser.
//!
//! The whole input line is parsed from scratch on every change: the same
//! text always yields the same `ParseState`.
//!
//! Argument matching is greedy-prefix for every parameter, with the prefix
//! shape decided by the declared type:
//!
//! * bool, enum and named-object parameters take the longest known name the
//!   remaining text starts with, ending on a word boundary;
//! * scalars take one word;
//! * an n-component vector takes exactly n words;
//! * a string takes one word, or everything left when it is the last
//!   parameter.
//!
//! Matching halts at the first parameter that does not convert. A token that
//! is not yet followed by whitespace is tentative: it is resolved, but the
//! hint engine keeps offering alternatives for it.

use crate::convert::{self, FALSE_LITERAL, TRUE_LITERAL};
use crate::model::{ParamType, ParameterDescriptor, Value};
use crate::objects::ObjectCatalog;
use crate::registry::CommandRegistry;

use super::tokenizer::{at_boundary, strip_prefix_ignore_case, words, Cursor};

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedArgument {
    /// Canonical text for the value: the declared name for symbolic
    /// values, the typed text otherwise.
    pub display_text: String,
    /// What the operator actually typed for this argument.
    pub source_text: String,
    pub value: Value,
    /// Followed by whitespace in the input.
    pub committed: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseState {
    pub command: Option<usize>,
    /// The command name is followed by whitespace.
    pub command_committed: bool,
    /// Always a prefix of the command's parameter list.
    pub arguments: Vec<ResolvedArgument>,
    /// Unconsumed text, leading whitespace trimmed. Without a command this
    /// is the whole input.
    pub remainder: String,
}

impl ParseState {
    /// Index of the parameter the operator is working on. A tentative last
    /// argument keeps its own slot open.
    pub fn pending_parameter(&self) -> usize {
        match self.arguments.last() {
            Some(last) if !last.committed => self.arguments.len() - 1,
            _ => self.arguments.len(),
        }
    }

    /// Text being typed for the pending slot.
    pub fn active_text(&self) -> &str {
        match self.arguments.last() {
            Some(last) if !last.committed => &last.source_text,
            _ => &self.remainder,
        }
    }

    pub fn active_words(&self) -> Vec<&str> {
        words(self.active_text())
    }

    /// Arguments whose slot is closed by trailing whitespace.
    pub fn committed_arguments(&self) -> impl Iterator<Item = &ResolvedArgument> {
        self.arguments.iter().take(self.pending_parameter())
    }

    pub fn values(&self) -> Vec<Value> {
        self.arguments.iter().map(|a| a.value.clone()).collect()
    }

    pub fn argument_texts(&self) -> Vec<String> {
        self.arguments.iter().map(|a| a.display_text.clone()).collect()
    }
}

/// Longest registered display name that prefixes `text` on a word boundary.
/// Returns the command index and the text after the name.
pub fn match_command<'t>(text: &'t str, registry: &CommandRegistry) -> Option<(usize, &'t str)> {
    registry
        .iter()
        .filter_map(|(index, descriptor)| {
            strip_prefix_ignore_case(text, &descriptor.display_name)
                .filter(|rest| at_boundary(rest))
                .map(|rest| (index, rest, descriptor.display_name.len()))
        })
        .max_by_key(|(_, _, len)| *len)
        .map(|(index, rest, _)| (index, rest))
}

pub fn parse(text: &str, registry: &CommandRegistry, objects: &ObjectCatalog) -> ParseState {
    let text = text.trim_start();
    let Some((index, after)) = match_command(text, registry) else {
        return ParseState {
            remainder: text.to_string(),
            ..ParseState::default()
        };
    };
    let mut state = ParseState {
        command: Some(index),
        command_committed: after.starts_with(char::is_whitespace),
        ..ParseState::default()
    };
    let Some(descriptor) = registry.get(index) else {
        return state;
    };

    let mut cursor = Cursor::new(after);
    let count = descriptor.params.len();
    for (i, param) in descriptor.params.iter().enumerate() {
        cursor.skip_whitespace();
        if cursor.is_at_end() {
            break;
        }
        let Some((display_text, source_text, value)) =
            take_argument(&mut cursor, param, i + 1 == count, objects)
        else {
            break;
        };
        state.arguments.push(ResolvedArgument {
            display_text,
            source_text,
            value,
            committed: cursor.followed_by_whitespace(),
        });
    }
    cursor.skip_whitespace();
    state.remainder = cursor.rest().to_string();
    state
}

/// Names a symbolic parameter can take, in declaration order.
pub fn symbolic_names(ty: &ParamType, objects: &ObjectCatalog) -> Vec<String> {
    match ty {
        ParamType::Bool => vec![TRUE_LITERAL.to_string(), FALSE_LITERAL.to_string()],
        ParamType::Enum(def) => def.members().map(|(_, name, _)| name.to_string()).collect(),
        ParamType::Object(ty) => objects.assignable(ty).map(|o| o.name.clone()).collect(),
        _ => Vec::new(),
    }
}

/// Consume one argument for `param`. On failure the cursor is left where it
/// was and `None` is returned.
fn take_argument(
    cursor: &mut Cursor<'_>,
    param: &ParameterDescriptor,
    last: bool,
    objects: &ObjectCatalog,
) -> Option<(String, String, Value)> {
    let mark = cursor.position();
    let result = match &param.ty {
        ParamType::Bool | ParamType::Enum(_) | ParamType::Object(_) => {
            take_symbolic(cursor, &param.ty, objects)
        }
        ParamType::Scalar(_) => cursor.take_words(1).and_then(|raw| {
            let value = convert::convert(&param.ty, &raw, objects).ok()?;
            Some((raw.clone(), raw, value))
        }),
        ParamType::Vector(arity) => cursor.take_words(*arity).and_then(|raw| {
            let value = convert::convert(&param.ty, &raw, objects).ok()?;
            Some((raw.clone(), raw, value))
        }),
        ParamType::Text => {
            let raw = if last {
                Some(cursor.take_rest().to_string())
            } else {
                cursor.take_words(1)
            };
            raw.and_then(|raw| {
                let value = convert::convert(&param.ty, &raw, objects).ok()?;
                Some((raw.clone(), raw, value))
            })
        }
        ParamType::Unsupported(_) => None,
    };
    if result.is_none() {
        cursor.rewind(mark);
    }
    result
}

fn take_symbolic(
    cursor: &mut Cursor<'_>,
    ty: &ParamType,
    objects: &ObjectCatalog,
) -> Option<(String, String, Value)> {
    let rest = cursor.rest();
    let name = symbolic_names(ty, objects)
        .into_iter()
        .filter(|name| {
            strip_prefix_ignore_case(rest, name).is_some_and(at_boundary)
        })
        .max_by_key(String::len)?;
    let mark = cursor.position();
    if !cursor.eat_ignore_case(&name) {
        return None;
    }
    let source = cursor.consumed_since(mark).to_string();
    let value = convert::convert(ty, &name, objects).ok()?;
    Some((value.to_string(), source, value))
}
