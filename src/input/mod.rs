pub mod hints;
pub mod parser;
pub mod tokenizer;

pub use hints::{generate_hints, recall_hints, HintContext, HintEntry, HintList, HintPayload, Hints};
pub use parser::{match_command, parse, ParseState, ResolvedArgument};
