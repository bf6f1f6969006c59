//! Application services - Registry construction and message processing

pub mod command_service;
pub mod message_service;

pub use command_service::{help_text, CommandService};
pub use message_service::MessageService;
