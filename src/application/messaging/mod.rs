//! Message handling - Parsing and dispatching inbound text

pub mod dispatcher;
pub mod parser;

pub use dispatcher::{MessageDispatcher, UNKNOWN_COMMAND_REPLY};
pub use parser::{MessageParser, ParsedCommand};
