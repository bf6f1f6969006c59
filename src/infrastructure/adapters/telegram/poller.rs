//! Long-polling loop for Telegram Bot API `getUpdates`.
//!
//! Every text message is handed to the [`MessageService`] on its own task,
//! so a slow fetch for one chat never delays replies to another.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use super::TelegramAdapter;
use crate::application::errors::BotError;
use crate::application::services::MessageService;

/// Pause after a failed getUpdates call
const ERROR_PAUSE: Duration = Duration::from_secs(5);

/// Run the long-polling loop until `cancel` turns true.
pub async fn poll_loop(
    bot: Arc<TelegramAdapter>,
    service: MessageService<TelegramAdapter>,
    poll_timeout: u64,
    mut cancel: watch::Receiver<bool>,
) {
    let mut offset: i64 = 0;

    tracing::info!("Starting message loop...");

    loop {
        if *cancel.borrow() {
            tracing::info!("Telegram poller shutting down");
            return;
        }

        let result = tokio::select! {
            result = bot.get_updates(offset, poll_timeout) => result,
            changed = cancel.changed() => {
                if changed.is_err() {
                    return;
                }
                continue;
            }
        };

        match result {
            Ok(updates) => {
                if !updates.is_empty() {
                    tracing::debug!("Received {} updates", updates.len());
                }
                offset = TelegramAdapter::get_next_offset(&updates, offset);

                for update in updates {
                    if let Some(message) = update.into_inbound() {
                        service.spawn(message);
                    }
                }
            }
            Err(e) => {
                match &e {
                    BotError::Conflict(_) => tracing::error!(
                        "Another instance is polling with this token, retrying in {:?}: {}", ERROR_PAUSE, e
                    ),
                    _ => tracing::error!("Failed to get updates: {}", e),
                }
                tokio::select! {
                    _ = tokio::time::sleep(ERROR_PAUSE) => {}
                    changed = cancel.changed() => {
                        if changed.is_err() {
                            return;
                        }
                    }
                }
            }
        }
    }
}
