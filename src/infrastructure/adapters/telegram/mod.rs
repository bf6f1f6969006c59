//! Telegram adapter

mod poller;

pub use poller::poll_loop;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::application::errors::BotError;
use crate::domain::entities::{InboundMessage, User as Sender};
use crate::domain::traits::{Bot, BotInfo};

/// Telegram API base URL
const API_BASE: &str = "https://api.telegram.org";

/// Telegram update type
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chat {
    pub id: i64,
}

/// Envelope around every Bot API response
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

impl Update {
    /// Text messages become inbound messages; everything else is skipped
    pub fn into_inbound(self) -> Option<InboundMessage> {
        let msg = self.message?;
        let text = msg.text?;
        let mut inbound = InboundMessage::new(msg.chat.id.to_string(), text);

        if let Some(from) = msg.from {
            let mut sender = Sender::new(from.id.to_string());
            if let Some(first) = from.first_name {
                sender = sender.with_name(first, from.last_name);
            }
            if let Some(username) = from.username {
                sender = sender.with_username(username);
            }
            inbound = inbound.with_sender(sender);
        }

        Some(inbound)
    }
}

/// Telegram bot adapter
pub struct TelegramAdapter {
    token: String,
    base_url: String,
    client: Client,
    info: BotInfo,
}

impl TelegramAdapter {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, API_BASE)
    }

    /// Point the adapter at another API host (used by tests)
    pub fn with_base_url(token: impl Into<String>, base_url: &str) -> Self {
        Self {
            token: token.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
            info: BotInfo {
                id: "unknown".to_string(),
                name: "relay-bot".to_string(),
                username: "relay_bot".to_string(),
            },
        }
    }

    /// Get the API URL for a method
    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    /// POST a JSON request and unwrap the `result` field
    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, BotError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.client
            .post(self.api_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| BotError::Network(e.without_url().to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| BotError::Network(e.without_url().to_string()))?;

        let data: ApiResponse<T> = match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(_) if !status.is_success() => {
                return Err(BotError::Api(format!("{} failed: {}", method, status)));
            }
            Err(e) => return Err(BotError::Parse(format!("{}: {}", method, e))),
        };

        let description = data.description.unwrap_or_else(|| status.to_string());
        if status == StatusCode::CONFLICT {
            return Err(BotError::Conflict(description));
        }
        if !status.is_success() || !data.ok {
            return Err(BotError::Api(format!("{} failed: {}", method, description)));
        }

        data.result
            .ok_or_else(|| BotError::Parse(format!("{}: missing result", method)))
    }

    /// Fetch bot info from Telegram API
    pub async fn fetch_bot_info(&mut self) -> Result<(), BotError> {
        #[derive(Deserialize)]
        struct Me {
            id: i64,
            first_name: String,
            username: String,
        }

        let me: Me = self.call("getMe", &serde_json::json!({})).await?;
        self.info = BotInfo {
            id: me.id.to_string(),
            name: me.first_name,
            username: me.username,
        };

        Ok(())
    }

    /// Get updates from Telegram using getUpdates API
    pub async fn get_updates(&self, offset: i64, timeout: u64) -> Result<Vec<Update>, BotError> {
        #[derive(Serialize)]
        struct GetUpdatesRequest {
            offset: i64,
            timeout: u64,
            allowed_updates: Vec<&'static str>,
        }

        let request = GetUpdatesRequest {
            offset,
            timeout,
            allowed_updates: vec!["message"],
        };

        self.call("getUpdates", &request).await
    }

    /// Get the next update offset
    pub fn get_next_offset(updates: &[Update], current: i64) -> i64 {
        updates.iter()
            .map(|u| u.update_id + 1)
            .max()
            .unwrap_or(current)
            .max(current)
    }

    /// Publish the command menu shown by Telegram clients
    pub async fn register_commands(&self, commands: &[(String, String)]) -> Result<(), BotError> {
        #[derive(Serialize)]
        struct BotCommand<'a> {
            command: &'a str,
            description: &'a str,
        }

        #[derive(Serialize)]
        struct SetMyCommandsRequest<'a> {
            commands: Vec<BotCommand<'a>>,
        }

        let request = SetMyCommandsRequest {
            commands: commands
                .iter()
                .map(|(name, description)| BotCommand {
                    command: name.trim_start_matches('/'),
                    description,
                })
                .collect(),
        };

        let _: bool = self.call("setMyCommands", &request).await?;
        tracing::info!("Registered {} bot commands with Telegram", commands.len());
        Ok(())
    }
}

#[async_trait]
impl Bot for TelegramAdapter {
    async fn start(&self) -> Result<(), BotError> {
        let masked: String = self.token.chars().take(8).collect();
        tracing::info!("Starting Telegram bot (token: {}...)", masked);
        Ok(())
    }

    async fn send_message(&self, chat_id: &str, text: &str) -> Result<String, BotError> {
        #[derive(Serialize)]
        struct SendMessageRequest<'a> {
            chat_id: &'a str,
            text: &'a str,
        }

        #[derive(Deserialize)]
        struct MessageResult {
            message_id: i64,
        }

        tracing::debug!("Sending to {}: {}", chat_id, text);
        let result: MessageResult = self.call("sendMessage", &SendMessageRequest { chat_id, text }).await?;
        Ok(result.message_id.to_string())
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_into_inbound() {
        let update: Update = serde_json::from_value(json!({
            "update_id": 10,
            "message": {
                "message_id": 1,
                "from": {"id": 5, "is_bot": false, "first_name": "Ada", "username": "ada"},
                "chat": {"id": -100},
                "text": "/cat"
            }
        }))
        .unwrap();

        let inbound = update.into_inbound().unwrap();
        assert_eq!(inbound.chat_id, "-100");
        assert_eq!(inbound.text, "/cat");
        assert_eq!(inbound.sender_label(), "Ada");
    }

    #[test]
    fn test_non_text_skipped() {
        let update: Update = serde_json::from_value(json!({
            "update_id": 11,
            "message": {"message_id": 2, "chat": {"id": 1}}
        }))
        .unwrap();
        assert!(update.into_inbound().is_none());
    }

    #[test]
    fn test_next_offset() {
        let updates: Vec<Update> = serde_json::from_value(json!([
            {"update_id": 4}, {"update_id": 7}
        ]))
        .unwrap();
        assert_eq!(TelegramAdapter::get_next_offset(&updates, 0), 8);
        assert_eq!(TelegramAdapter::get_next_offset(&[], 8), 8);
    }

    #[tokio::test]
    async fn test_send_message() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path("/bottest-token/sendMessage"))
            .and(matchers::body_json(json!({"chat_id": "42", "text": "hi"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": {"message_id": 77}})))
            .expect(1)
            .mount(&server)
            .await;

        let bot = TelegramAdapter::with_base_url("test-token", &server.uri());
        assert_eq!(bot.send_message("42", "hi").await.unwrap(), "77");
    }

    #[tokio::test]
    async fn test_get_updates_conflict() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path_regex(r"/bot.*/getUpdates"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "ok": false,
                "error_code": 409,
                "description": "Conflict: terminated by other getUpdates request"
            })))
            .mount(&server)
            .await;

        let bot = TelegramAdapter::with_base_url("test-token", &server.uri());
        match bot.get_updates(0, 0).await {
            Err(BotError::Conflict(msg)) => assert!(msg.contains("other getUpdates")),
            other => panic!("expected conflict, got {:?}", other.map(|u| u.len())),
        }
    }

    #[tokio::test]
    async fn test_fetch_bot_info_and_register_commands() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path_regex(r"/bot.*/getMe"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": {"id": 1, "is_bot": true, "first_name": "Relay", "username": "relay_test_bot"}
            })))
            .mount(&server)
            .await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path_regex(r"/bot.*/setMyCommands"))
            .and(matchers::body_json(json!({"commands": [{"command": "cat", "description": "Get a random cat fact"}]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": true})))
            .expect(1)
            .mount(&server)
            .await;

        let mut bot = TelegramAdapter::with_base_url("test-token", &server.uri());
        bot.fetch_bot_info().await.unwrap();
        assert_eq!(bot.bot_info().username, "relay_test_bot");

        bot.register_commands(&[("/cat".to_string(), "Get a random cat fact".to_string())])
            .await
            .unwrap();
    }
}
