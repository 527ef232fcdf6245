//! # Telegram
//!
//! Transport adapter for the Telegram Bot API: inbound update normalization and the
//! outbound `ChatProvider` implementation.

pub mod client;
pub mod update;

pub use client::TelegramService;
pub use update::{Inbound, Update};
