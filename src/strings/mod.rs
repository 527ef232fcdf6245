//! # Strings Module
//!
//! Centralizes user-facing strings: menu texts, prompts and help text.

pub mod help;
pub mod messages;
