//! # Command Router
//!
//! Routes an inbound message to the matching command for one turn. A message is either a
//! fresh invocation (its leading token is a registered trigger), a continuation reply
//! (a command is waiting for free text), or unroutable.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::sync::Arc;

use crate::application::registry::CommandRegistry;
use crate::domain::message::Message;
use crate::domain::response::Response;
use crate::domain::state::ConversationState;
use crate::domain::traits::Command;

/// How a message resolved against the registry and the conversation state.
pub enum Route {
    Invocation(Arc<dyn Command>),
    Reply(Arc<dyn Command>),
    Unroutable,
}

/// Result of a routed turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Respond(Response),
    /// The command ran and chose not to respond.
    Silent,
    /// Authenticated-only command invoked without authentication. Dropped silently.
    Denied,
    Unroutable,
}

impl Outcome {
    pub fn response(&self) -> Option<&Response> {
        match self {
            Outcome::Respond(response) => Some(response),
            _ => None,
        }
    }

    fn from_handler(response: Option<Response>) -> Self {
        response.map_or(Outcome::Silent, Outcome::Respond)
    }
}

pub struct CommandRouter {
    registry: Arc<CommandRegistry>,
    trusted_aliases: HashSet<String>,
}

impl CommandRouter {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self {
            registry,
            trusted_aliases: HashSet::new(),
        }
    }

    /// Aliases that are treated as authenticated, checked on every turn.
    pub fn with_trusted_aliases(mut self, aliases: impl IntoIterator<Item = String>) -> Self {
        self.trusted_aliases = aliases.into_iter().map(|a| a.to_lowercase()).collect();
        self
    }

    /// Resolves without running anything.
    pub fn resolve(&self, message: &Message, state: &ConversationState) -> Route {
        if let Some(command) = message
            .leading_token()
            .map(strip_bot_suffix)
            .and_then(|token| self.registry.resolve(token))
        {
            return Route::Invocation(command);
        }

        match state.pending_reply() {
            Some(id) => match self.registry.resolve_by_id(id) {
                Some(command) => Route::Reply(command),
                None => {
                    tracing::warn!("Pending reply references unknown command '{}'", id);
                    Route::Unroutable
                }
            },
            None => Route::Unroutable,
        }
    }

    /// Runs one turn against `state`.
    pub async fn dispatch(&self, state: &mut ConversationState, message: &Message) -> Result<Outcome> {
        if state.identity_changed(message) {
            self.reset_identity(state, message);
        }
        if !state.is_authenticated && self.is_trusted(&state.alias) {
            tracing::info!("Authenticating trusted alias '{}' in chat {}", state.alias, state.chat_id);
            state.is_authenticated = true;
        }

        match self.resolve(message, state) {
            Route::Invocation(command) => {
                if command.requires_authentication() && !state.is_authenticated {
                    tracing::debug!(
                        "Dropping '{}' for unauthenticated chat {}",
                        command.trigger(),
                        state.chat_id
                    );
                    return Ok(Outcome::Denied);
                }

                tracing::info!(
                    "Router dispatching cmd='{}' args='{}' chat='{}'",
                    command.trigger(),
                    message.arguments().join(" "),
                    state.chat_id
                );

                // A new command abandons any prompt still waiting for a reply.
                state.clear_pending_reply();

                let response = command
                    .handle_invocation(state, message)
                    .await
                    .with_context(|| format!("{} failed on '{}'", command.id(), message.text))?;
                Ok(Outcome::from_handler(response))
            }
            Route::Reply(command) => {
                tracing::info!(
                    "Router dispatching reply to '{}' chat='{}'",
                    command.id(),
                    state.chat_id
                );

                let response = command
                    .handle_reply(state, message)
                    .await
                    .with_context(|| format!("{} failed handling a reply", command.id()))?;
                Ok(Outcome::from_handler(response))
            }
            Route::Unroutable => {
                tracing::debug!("No route for message {} in chat {}", message.id, state.chat_id);
                Ok(Outcome::Unroutable)
            }
        }
    }

    fn reset_identity(&self, state: &mut ConversationState, message: &Message) {
        tracing::info!(
            "Resetting conversation {} for sender '{}'",
            state.chat_id,
            message.sender_alias.as_deref().unwrap_or("")
        );
        state.reset(message);
    }

    fn is_trusted(&self, alias: &str) -> bool {
        !alias.is_empty() && self.trusted_aliases.contains(&alias.to_lowercase())
    }
}

/// `/echo@my_bot` -> `/echo`
fn strip_bot_suffix(token: &str) -> &str {
    token.split_once('@').map_or(token, |(trigger, _)| trigger)
}
