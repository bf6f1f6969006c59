//! Application layer errors

use thiserror::Error;

/// Transport errors raised by platform adapters
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Telegram API error: {0}")]
    Api(String),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Another client is already polling updates for the same token
    #[error("Polling conflict: {0}")]
    Conflict(String),
}

/// Command registration and lookup errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("Command already registered: /{0}")]
    Duplicate(String),

    #[error("Invalid command name: {0}")]
    InvalidName(String),
}

/// Errors from fetching and extracting external content
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Network(String),

    #[error("Unexpected status: {0}")]
    Status(u16),

    #[error("Invalid JSON body: {0}")]
    Decode(String),

    #[error("Missing or non-scalar field: {0}")]
    Shape(String),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing bot token: set TELEGRAM_BOT_TOKEN or pass --token")]
    MissingToken,

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
