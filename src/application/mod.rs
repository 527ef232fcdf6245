//! # Application Layer
//!
//! Contains the conversation engine: command registry, routing state machine,
//! response rendering and the per-conversation runtime.

pub mod logging;
pub mod registry;
pub mod render;
pub mod router;
pub mod runtime;

#[cfg(test)]
pub mod testing;
