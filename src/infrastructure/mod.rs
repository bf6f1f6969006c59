//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Fetcher: HTTP client for content sources
//! - Health: Liveness endpoint
//! - Adapters: Platform integrations (Telegram, console)

pub mod config;
pub mod fetcher;
pub mod health;
pub mod adapters;
