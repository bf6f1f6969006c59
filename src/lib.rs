//! relay-bot - a Telegram bot that answers slash commands with static text,
//! local computations, or content fetched from public JSON APIs.

pub mod domain;
pub mod application;
pub mod infrastructure;
