//! Command parsing and dispatch.

pub mod dispatcher;
pub mod parser;

pub use dispatcher::{DispatchContext, Dispatcher};
pub use parser::{parse_command, ParsedCommand};
