use serde::Serialize;
use thiserror::Error;

/// Structured error type for the console. Front ends match on `code` and
/// render `detail`; parse and conversion failures never show up here, they
/// are carried as data in the parse state.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "code", content = "detail")]
pub enum ConsoleError {
    #[error("static commands have already been registered")]
    StaticAlreadyRegistered,
    #[error("unknown command: {name}")]
    UnknownCommand { name: String },
    #[error("{command}: missing value for parameter '{parameter}'")]
    MissingArgument { command: String, parameter: String },
    #[error("{command}: '{text}' is not a valid {parameter}")]
    InvalidArgument {
        command: String,
        parameter: String,
        text: String,
    },
    #[error("{store}: unsupported file version '{found}'")]
    FormatVersion { store: String, found: String },
    #[error("{store}: malformed record at line {line}: {message}")]
    Malformed {
        store: String,
        line: usize,
        message: String,
    },
    #[error("I/O error: {message}")]
    Io { message: String },
    #[error("config error: {message}")]
    Config { message: String },
    #[error("a macro bound to '{trigger}' already exists")]
    MacroExists { trigger: String },
    #[error("no macro is bound to '{trigger}'")]
    UnknownMacro { trigger: String },
    #[error("a macro is already being recorded")]
    MacroRecording,
    #[error("no macro is being recorded")]
    NotRecording,
}

impl From<std::io::Error> for ConsoleError {
    fn from(e: std::io::Error) -> Self {
        ConsoleError::Io {
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(e: serde_json::Error) -> Self {
        ConsoleError::Config {
            message: e.to_string(),
        }
    }
}

/// Failure raised by a command handler while running against one target.
/// The dispatcher logs and counts these; they never abort the remaining targets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvokeError {
    #[error("argument {index} is missing")]
    MissingArgument { index: usize },
    #[error("argument {index}: expected {expected}")]
    WrongType { index: usize, expected: &'static str },
    #[error("target is not a {expected}")]
    WrongTarget { expected: &'static str },
    #[error("{0}")]
    Failed(String),
}

impl From<String> for InvokeError {
    fn from(s: String) -> Self {
        InvokeError::Failed(s)
    }
}

impl From<&str> for InvokeError {
    fn from(s: &str) -> Self {
        InvokeError::Failed(s.to_string())
    }
}
