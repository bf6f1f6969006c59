//! Message dispatcher - Routes command text to its handler

use std::sync::Arc;

use super::parser::MessageParser;
use crate::domain::entities::{Command, CommandContext, CommandHandler, CommandRegistry, InboundMessage, OutboundReply};
use crate::domain::traits::ContentFetcher;

pub const UNKNOWN_COMMAND_REPLY: &str = "Unknown command! Type /help to see the available commands.";

/// Stateless dispatcher shared by every in-flight message
pub struct MessageDispatcher {
    parser: MessageParser,
    registry: Arc<CommandRegistry>,
    fetcher: Arc<dyn ContentFetcher>,
}

impl MessageDispatcher {
    pub fn new(registry: Arc<CommandRegistry>, fetcher: Arc<dyn ContentFetcher>) -> Self {
        Self {
            parser: MessageParser::new(),
            registry,
            fetcher,
        }
    }

    pub fn with_parser(mut self, parser: MessageParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Turn one inbound message into the replies it should produce
    pub async fn dispatch(&self, message: &InboundMessage) -> Vec<OutboundReply> {
        let Some(parsed) = self.parser.parse(&message.text) else {
            return Vec::new();
        };

        let Some(command) = self.registry.lookup(&parsed.name) else {
            tracing::info!("[{}] unknown command /{} from {}", message.chat_id, parsed.name, message.sender_label());
            return vec![OutboundReply::new(&message.chat_id, UNKNOWN_COMMAND_REPLY)];
        };

        tracing::info!("[{}] /{} from {}", message.chat_id, command.name, message.sender_label());
        let text = self.run_handler(command, &parsed.args, message).await;
        vec![OutboundReply::new(&message.chat_id, text)]
    }

    async fn run_handler(&self, command: &Command, args: &str, message: &InboundMessage) -> String {
        match &command.handler {
            CommandHandler::Static(text) => text.clone(),
            CommandHandler::Computed(compute) => compute(&CommandContext {
                args,
                registry: &self.registry,
                sender: message.sender.as_ref(),
            }),
            CommandHandler::Fetched(source) => match self.fetcher.fetch(source).await {
                Ok(content) => source.success_text(&content),
                Err(e) => {
                    tracing::error!(
                        "[{}] /{} failed to fetch from {}: {}",
                        message.chat_id, command.name, source.url, e
                    );
                    source.apology_text()
                }
            },
        }
    }
}
