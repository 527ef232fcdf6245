//! # Domain Layer
//!
//! Core definitions, types, and traits that define the conversation engine.
//! Independent of the transport and storage, serving as the contract for other layers.

pub mod config;
pub mod error;
pub mod message;
pub mod response;
pub mod state;
pub mod traits;
