//! Domain entities - Commands, messages, senders and content sources

pub mod user;
pub mod message;
pub mod command;
pub mod source;

pub use user::User;
pub use message::{InboundMessage, OutboundReply};
pub use command::{Command, CommandContext, CommandHandler, CommandRegistry, ComputeFn};
pub use source::ContentSource;
