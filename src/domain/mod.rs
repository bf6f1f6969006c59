//! Domain layer - Core types with no knowledge of any platform
//!
//! This layer contains:
//! - Entities: Command, CommandRegistry, InboundMessage, OutboundReply, ContentSource
//! - Traits: Abstractions for infrastructure (Bot, ContentFetcher)

pub mod entities;
pub mod traits;
