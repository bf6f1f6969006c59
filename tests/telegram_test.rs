//! End-to-end: getUpdates -> dispatch -> fetch -> sendMessage, all against mock servers
//! Run with: cargo test --test telegram_test

use std::sync::{Arc, Once};
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::watch;
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

use relay_bot::application::messaging::MessageDispatcher;
use relay_bot::application::services::{CommandService, MessageService};
use relay_bot::domain::entities::{Command, CommandHandler, ContentSource};
use relay_bot::infrastructure::adapters::telegram::{poll_loop, TelegramAdapter};
use relay_bot::infrastructure::config::FetchConfig;
use relay_bot::infrastructure::fetcher::HttpFetcher;

static INIT: Once = Once::new();

fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

fn text_update(update_id: i64, chat_id: i64, text: &str) -> Value {
    json!({
        "update_id": update_id,
        "message": {
            "message_id": update_id,
            "from": {"id": chat_id, "is_bot": false, "first_name": "Tester"},
            "chat": {"id": chat_id},
            "text": text
        }
    })
}

async fn sent_messages(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path().ends_with("/sendMessage"))
        .filter_map(|r| serde_json::from_slice(&r.body).ok())
        .collect()
}

#[tokio::test]
async fn test_poll_dispatch_and_reply() {
    ensure_init();

    let telegram = MockServer::start().await;
    let content = MockServer::start().await;

    Mock::given(matchers::method("GET"))
        .and(matchers::path("/dog"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Dogs dream."})))
        .mount(&content)
        .await;

    // First poll delivers three messages, later polls are empty
    Mock::given(matchers::method("POST"))
        .and(matchers::path_regex(r"/bot.*/getUpdates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": [
                text_update(1, 11, "/dog"),
                text_update(2, 22, "/echo ping"),
                text_update(3, 33, "just chatting")
            ]
        })))
        .up_to_n_times(1)
        .mount(&telegram)
        .await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path_regex(r"/bot.*/getUpdates"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"ok": true, "result": []}))
                .set_delay(Duration::from_millis(50)),
        )
        .mount(&telegram)
        .await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path_regex(r"/bot.*/sendMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": {"message_id": 1}})))
        .mount(&telegram)
        .await;

    let mut commands = CommandService::new();
    commands.register_defaults().unwrap();
    commands
        .register(
            Command::new(
                "dog",
                CommandHandler::Fetched(ContentSource::new(
                    format!("{}/dog", content.uri()),
                    "🐶 Dog Fact:",
                    "a dog fact",
                    "{/message}",
                )),
            )
            .with_description("Get a dog fact"),
        )
        .unwrap();

    let fetcher = Arc::new(HttpFetcher::new(&FetchConfig::default()).unwrap());
    let dispatcher = Arc::new(MessageDispatcher::new(Arc::new(commands.into_registry()), fetcher));
    let bot = Arc::new(TelegramAdapter::with_base_url("test-token", &telegram.uri()));
    let service = MessageService::new(Arc::clone(&bot), dispatcher);

    let (cancel_tx, cancel_rx) = watch::channel(false);
    let poller = tokio::spawn(poll_loop(bot, service, 0, cancel_rx));

    let mut sent = Vec::new();
    for _ in 0..100 {
        sent = sent_messages(&telegram).await;
        if sent.len() >= 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    cancel_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(2), poller).await.unwrap().unwrap();

    assert_eq!(sent.len(), 2, "plain chatter must not be answered: {:?}", sent);
    assert!(sent.contains(&json!({"chat_id": "11", "text": "🐶 Dog Fact: Dogs dream."})));
    assert!(sent.contains(&json!({"chat_id": "22", "text": "You said: ping"})));
}

#[tokio::test]
async fn test_poller_survives_conflict() {
    ensure_init();

    let telegram = MockServer::start().await;
    Mock::given(matchers::method("POST"))
        .and(matchers::path_regex(r"/bot.*/getUpdates"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "ok": false,
            "error_code": 409,
            "description": "Conflict: terminated by other getUpdates request"
        })))
        .mount(&telegram)
        .await;

    let mut commands = CommandService::new();
    commands.register_defaults().unwrap();
    let fetcher = Arc::new(HttpFetcher::new(&FetchConfig::default()).unwrap());
    let dispatcher = Arc::new(MessageDispatcher::new(Arc::new(commands.into_registry()), fetcher));
    let bot = Arc::new(TelegramAdapter::with_base_url("test-token", &telegram.uri()));
    let service = MessageService::new(Arc::clone(&bot), dispatcher);

    let (cancel_tx, cancel_rx) = watch::channel(false);
    let poller = tokio::spawn(poll_loop(bot, service, 0, cancel_rx));

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!poller.is_finished());

    // Cancellation interrupts the error pause
    cancel_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(2), poller).await.unwrap().unwrap();
}
