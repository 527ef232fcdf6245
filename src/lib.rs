//! # chatflow
//!
//! Conversational command engine: maps inbound chat messages (typed commands, button
//! presses, free-text replies) to registered commands, keeps a small state per
//! conversation across turns, and renders declarative responses to Telegram.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interface;
pub mod strings;
