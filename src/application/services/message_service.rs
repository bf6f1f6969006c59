use std::sync::Arc;

use crate::application::messaging::MessageDispatcher;
use crate::domain::entities::InboundMessage;
use crate::domain::traits::Bot;

/// Service for processing messages: dispatch, then deliver every reply
pub struct MessageService<B: Bot> {
    bot: Arc<B>,
    dispatcher: Arc<MessageDispatcher>,
}

impl<B: Bot> Clone for MessageService<B> {
    fn clone(&self) -> Self {
        Self {
            bot: Arc::clone(&self.bot),
            dispatcher: Arc::clone(&self.dispatcher),
        }
    }
}

impl<B: Bot + 'static> MessageService<B> {
    pub fn new(bot: Arc<B>, dispatcher: Arc<MessageDispatcher>) -> Self {
        Self { bot, dispatcher }
    }

    pub fn bot(&self) -> &B {
        &self.bot
    }

    /// Handle one message to completion; returns how many replies were sent
    pub async fn process(&self, message: InboundMessage) -> usize {
        let replies = self.dispatcher.dispatch(&message).await;
        let mut sent = 0;

        for reply in replies {
            let preview: String = reply.text.chars().take(100).collect();
            tracing::info!("Sending response to chat_id {}: {}", reply.chat_id, preview);
            match self.bot.send_message(&reply.chat_id, &reply.text).await {
                Ok(_) => sent += 1,
                Err(e) => tracing::error!("Failed to send message: {}", e),
            }
        }

        sent
    }

    /// Handle a message on its own task so slow fetches never hold up the caller
    pub fn spawn(&self, message: InboundMessage) -> tokio::task::JoinHandle<usize> {
        let service = self.clone();
        tokio::spawn(async move { service.process(message).await })
    }
}
