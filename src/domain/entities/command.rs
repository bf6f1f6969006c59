use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{ContentSource, User};
use crate::application::errors::CommandError;

/// Input available to a computed handler
pub struct CommandContext<'a> {
    /// Text after the command token, trimmed
    pub args: &'a str,
    pub registry: &'a CommandRegistry,
    pub sender: Option<&'a User>,
}

/// Local computation run synchronously by the dispatcher
pub type ComputeFn = Arc<dyn Fn(&CommandContext<'_>) -> String + Send + Sync>;

/// What a command does when invoked
#[derive(Clone)]
pub enum CommandHandler {
    /// Fixed reply text
    Static(String),
    /// Reply computed locally, never suspends
    Computed(ComputeFn),
    /// Reply fetched from an external JSON API
    Fetched(ContentSource),
}

impl CommandHandler {
    pub fn text(text: impl Into<String>) -> Self {
        CommandHandler::Static(text.into())
    }

    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&CommandContext<'_>) -> String + Send + Sync + 'static,
    {
        CommandHandler::Computed(Arc::new(f))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CommandHandler::Static(_) => "static",
            CommandHandler::Computed(_) => "computed",
            CommandHandler::Fetched(_) => "fetched",
        }
    }
}

impl fmt::Debug for CommandHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandHandler::Static(text) => f.debug_tuple("Static").field(text).finish(),
            CommandHandler::Computed(_) => f.write_str("Computed(..)"),
            CommandHandler::Fetched(source) => f.debug_tuple("Fetched").field(&source.url).finish(),
        }
    }
}

/// Represents a bot command
#[derive(Debug, Clone)]
pub struct Command {
    /// Name without the leading slash
    pub name: String,
    pub description: String,
    pub handler: CommandHandler,
}

impl Command {
    pub fn new(name: impl AsRef<str>, handler: CommandHandler) -> Self {
        Self {
            name: name.as_ref().trim_start_matches('/').to_string(),
            description: String::new(),
            handler,
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Name as typed by users, e.g. `/help`
    pub fn slash_name(&self) -> String {
        format!("/{}", self.name)
    }
}

/// Ordered, append-only set of commands
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<Command>,
    index: HashMap<String, usize>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, command: Command) -> Result<(), CommandError> {
        let name = &command.name;
        if name.is_empty() || name.contains(|c: char| c.is_whitespace() || c == '/' || c == '@') {
            return Err(CommandError::InvalidName(name.clone()));
        }
        if self.index.contains_key(name) {
            return Err(CommandError::Duplicate(name.clone()));
        }
        self.index.insert(name.clone(), self.commands.len());
        self.commands.push(command);
        Ok(())
    }

    /// Exact lookup by stored name, without the leading slash
    pub fn lookup(&self, name: &str) -> Option<&Command> {
        self.index.get(name).map(|&i| &self.commands[i])
    }

    /// `(slash name, description)` pairs in registration order
    pub fn describe_all(&self) -> Vec<(String, String)> {
        self.iter()
            .map(|c| (c.slash_name(), c.description.clone()))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
