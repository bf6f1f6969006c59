//! Console adapter for development/testing

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use crate::application::errors::BotError;
use crate::application::services::MessageService;
use crate::domain::entities::{InboundMessage, User};
use crate::domain::traits::{Bot, BotInfo};

/// Chat id used for every console message
pub const CONSOLE_CHAT_ID: &str = "console";

/// Console bot adapter for local development
pub struct ConsoleAdapter {
    info: BotInfo,
}

impl ConsoleAdapter {
    pub fn new() -> Self {
        Self {
            info: BotInfo {
                id: "console".to_string(),
                name: "relay-bot".to_string(),
                username: "console".to_string(),
            },
        }
    }
}

impl Default for ConsoleAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Bot for ConsoleAdapter {
    async fn start(&self) -> Result<(), BotError> {
        tracing::info!("Starting console bot (dev mode)");
        Ok(())
    }

    async fn send_message(&self, _chat_id: &str, text: &str) -> Result<String, BotError> {
        println!("[BOT] {}", text);
        Ok("console_msg".to_string())
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}

/// Read stdin line by line until EOF, answering each line in order
pub async fn run_console(service: MessageService<ConsoleAdapter>) -> Result<(), BotError> {
    service.bot().start().await?;
    println!("Type a command (e.g. /help), Ctrl-D to quit.");

    let sender = User::new("local").with_username(whoami());
    let handled = answer_lines(&service, BufReader::new(tokio::io::stdin()), sender).await?;
    tracing::info!("Console closed after {} messages", handled);
    Ok(())
}

/// Answer each non-blank line from `input`; returns the number of lines handled
async fn answer_lines<R>(
    service: &MessageService<ConsoleAdapter>,
    input: R,
    sender: User,
) -> Result<usize, BotError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut handled = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let message = InboundMessage::new(CONSOLE_CHAT_ID, line).with_sender(sender.clone());
        service.process(message).await;
        handled += 1;
    }

    Ok(handled)
}

fn whoami() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "console".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::task::{Context, Poll};
    use tokio::io::{AsyncRead, ReadBuf};

    use crate::application::errors::FetchError;
    use crate::application::messaging::MessageDispatcher;
    use crate::application::services::CommandService;
    use crate::domain::entities::ContentSource;
    use crate::domain::traits::ContentFetcher;

    struct NoFetch;

    #[async_trait]
    impl ContentFetcher for NoFetch {
        async fn fetch(&self, _source: &ContentSource) -> Result<String, FetchError> {
            Err(FetchError::Network("offline".to_string()))
        }
    }

    /// Reader whose every read fails, like a closed terminal
    struct BrokenInput;

    impl AsyncRead for BrokenInput {
        fn poll_read(self: Pin<&mut Self>, _cx: &mut Context<'_>, _buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal gone")))
        }
    }

    fn service() -> MessageService<ConsoleAdapter> {
        let mut commands = CommandService::new();
        commands.register_defaults().unwrap();
        let dispatcher = MessageDispatcher::new(Arc::new(commands.into_registry()), Arc::new(NoFetch));
        MessageService::new(Arc::new(ConsoleAdapter::new()), Arc::new(dispatcher))
    }

    #[tokio::test]
    async fn test_answers_non_blank_lines() {
        let input: &[u8] = b"/start\n\n   \n/echo hi\nhello\n";
        let handled = answer_lines(&service(), input, User::new("local")).await.unwrap();
        assert_eq!(handled, 3);
    }

    #[tokio::test]
    async fn test_read_failure_is_io_error() {
        let result = answer_lines(&service(), BufReader::new(BrokenInput), User::new("local")).await;
        match result {
            Err(BotError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("expected io error, got {:?}", other),
        }
    }
}
