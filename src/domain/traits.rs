//! # Domain Traits
//!
//! Abstract interfaces for the engine's seams: commands, the chat transport and state storage.
//! Concrete implementations live in `interface::commands` and `infrastructure`.

use crate::domain::error::{RenderError, StoreError};
use crate::domain::message::Message;
use crate::domain::response::{ReplyOptions, Response};
use crate::domain::state::ConversationState;
use anyhow::Result;
use async_trait::async_trait;

/// A unit of conversational behavior addressed by a text trigger.
///
/// `Ok(None)` from either handler means "no response"; errors are reserved for failures.
/// A command that wants the next free-text message calls
/// [`ConversationState::expect_reply`] with its own id, and whichever handler consumes the
/// reply is responsible for clearing it.
#[async_trait]
pub trait Command: Send + Sync {
    /// Stable identifier, referenced by the pending-reply marker.
    fn id(&self) -> &str;

    /// Case-insensitive keyword, e.g. `/echo`.
    fn trigger(&self) -> &str;

    fn description(&self) -> &str;

    fn requires_authentication(&self) -> bool {
        false
    }

    /// Fresh invocation through the trigger. Arguments are available via `Message::arguments`.
    async fn handle_invocation(
        &self,
        state: &mut ConversationState,
        message: &Message,
    ) -> Result<Option<Response>>;

    /// Continuation reply routed through the pending-reply marker.
    async fn handle_reply(
        &self,
        state: &mut ConversationState,
        reply: &Message,
    ) -> Result<Option<Response>>;
}

/// Abstract interface for a chat transport (e.g. Telegram).
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a new message, returning its id
    async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        options: &ReplyOptions,
    ) -> Result<String, RenderError>;

    /// Edit an existing message in place
    async fn edit_message(
        &self,
        chat_id: &str,
        message_id: &str,
        text: &str,
        options: &ReplyOptions,
    ) -> Result<(), RenderError>;

    async fn delete_message(&self, chat_id: &str, message_id: &str) -> Result<(), RenderError>;
}

/// Durable storage for conversation state, keyed by chat id.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load(&self, chat_id: &str) -> Result<Option<ConversationState>, StoreError>;

    async fn save(&self, chat_id: &str, state: &ConversationState) -> Result<(), StoreError>;
}
