//! Liveness endpoint
//!
//! Answers `GET <path>` with a fixed body. With `lazy-start` the first request
//! also releases the Telegram poller, which waits on [`StartSignal`].

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::Router;
use tokio::sync::Notify;

use crate::infrastructure::config::HealthConfig;

/// One-shot latch fired by the first health request
#[derive(Debug, Default)]
pub struct StartSignal {
    fired: AtomicBool,
    notify: Notify,
}

impl StartSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true only for the call that fired the latch
    pub fn fire(&self) -> bool {
        let first = !self.fired.swap(true, Ordering::SeqCst);
        if first {
            self.notify.notify_one();
        }
        first
    }

    pub fn is_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Wait until [`fire`](Self::fire) has been called at least once
    pub async fn wait(&self) {
        if self.is_fired() {
            return;
        }
        self.notify.notified().await;
    }
}

#[derive(Clone)]
struct HealthState {
    body: Arc<str>,
    signal: Arc<StartSignal>,
}

pub fn router(config: &HealthConfig, signal: Arc<StartSignal>) -> Router {
    let state = HealthState {
        body: Arc::from(config.body.as_str()),
        signal,
    };

    Router::new()
        .route(&config.path, get(handle_health))
        .with_state(state)
}

async fn handle_health(State(state): State<HealthState>) -> String {
    if state.signal.fire() {
        tracing::info!("First health request received");
    }
    state.body.to_string()
}

/// Bind the health server and run it on a background task.
///
/// Returns the bound address (useful when the configured port is 0).
pub async fn serve(
    config: &HealthConfig,
    port: u16,
    signal: Arc<StartSignal>,
) -> Result<(SocketAddr, tokio::task::JoinHandle<()>), std::io::Error> {
    let app = router(config, signal);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!("Health endpoint listening on http://{}{}", local_addr, config.path);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Health server error: {}", e);
        }
    });

    Ok((local_addr, handle))
}
