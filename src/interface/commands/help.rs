//! # Help Command
//!
//! Handles `/help`. Lists the registered commands in registration order.

use anyhow::Result;
use async_trait::async_trait;

use crate::application::registry::CommandRegistry;
use crate::domain::message::Message;
use crate::domain::response::Response;
use crate::domain::state::ConversationState;
use crate::domain::traits::Command;
use crate::strings::help;

pub const ID: &str = "HelpCommand";
pub const TRIGGER: &str = "/help";
const DESCRIPTION: &str = "List available commands";

pub struct HelpCommand {
    listing: String,
}

impl HelpCommand {
    /// Snapshot of `registry` plus this command's own entry.
    pub fn for_registry(registry: &CommandRegistry) -> Self {
        let lines = registry
            .iter()
            .filter(|c| c.id() != ID)
            .map(|c| help::entry(c.trigger(), c.description(), c.requires_authentication()))
            .chain(std::iter::once(help::entry(TRIGGER, DESCRIPTION, false)));

        let listing = std::iter::once(help::HEADER.to_string())
            .chain(lines)
            .collect::<Vec<_>>()
            .join("\n");
        Self { listing }
    }
}

#[async_trait]
impl Command for HelpCommand {
    fn id(&self) -> &str {
        ID
    }

    fn trigger(&self) -> &str {
        TRIGGER
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    async fn handle_invocation(
        &self,
        _state: &mut ConversationState,
        _message: &Message,
    ) -> Result<Option<Response>> {
        Ok(Some(Response::text(self.listing.as_str())))
    }

    async fn handle_reply(
        &self,
        _state: &mut ConversationState,
        _reply: &Message,
    ) -> Result<Option<Response>> {
        Ok(None)
    }
}
