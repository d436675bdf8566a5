pub mod config;
pub mod console;
pub mod convert;
pub mod demo;
pub mod error;
pub mod history;
pub mod input;
pub mod model;
pub mod objects;
pub mod paths;
pub mod registry;
pub mod storage;
pub mod view;

pub use config::{ConsoleConfig, ConsoleSetup};
pub use console::{Console, MacroReplay, Recall, ResolutionSummary, SubmitOutcome};
pub use error::{ConsoleError, InvokeError};
pub use view::ConsoleView;
