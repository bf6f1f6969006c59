use super::User;

/// A text message received from a conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub chat_id: String,
    pub text: String,
    pub sender: Option<User>,
}

impl InboundMessage {
    pub fn new(chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            text: text.into(),
            sender: None,
        }
    }

    pub fn with_sender(mut self, user: User) -> Self {
        self.sender = Some(user);
        self
    }

    /// Best-effort display name of whoever sent the message
    pub fn sender_label(&self) -> String {
        self.sender
            .as_ref()
            .map(User::display_name)
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Text to deliver back to a conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundReply {
    pub chat_id: String,
    pub text: String,
}

impl OutboundReply {
    pub fn new(chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            text: text.into(),
        }
    }
}
