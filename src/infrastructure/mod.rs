//! # Infrastructure Layer
//!
//! Handles interactions with external systems: the Telegram Bot API, state storage
//! and the webhook HTTP server. Implements the traits defined in the Domain layer.

pub mod server;
pub mod store;
pub mod telegram;
