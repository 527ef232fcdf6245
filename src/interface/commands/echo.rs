//! # Echo Command
//!
//! Handles `/echo`. Shows a two-option menu; `/echo reply` asks for free text and the reply
//! is echoed back into the prompt message.

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::message::Message;
use crate::domain::response::{ReplyOption, ReplyOptions, Response};
use crate::domain::state::{ConversationState, ScratchKey};
use crate::domain::traits::Command;
use crate::strings::messages;

pub const ID: &str = "EchoCommand";
pub const TRIGGER: &str = "/echo";

/// Message id of the prompt waiting for the echo text.
pub const MESSAGE_ID: ScratchKey = ScratchKey::new("echo-messageid");

pub struct EchoCommand;

#[async_trait]
impl Command for EchoCommand {
    fn id(&self) -> &str {
        ID
    }

    fn trigger(&self) -> &str {
        TRIGGER
    }

    fn description(&self) -> &str {
        "Echo command"
    }

    async fn handle_invocation(
        &self,
        state: &mut ConversationState,
        message: &Message,
    ) -> Result<Option<Response>> {
        let Some(argument) = message.argument(0) else {
            state.scratch.remove(MESSAGE_ID);
            let options = ReplyOptions::new()
                .option(ReplyOption::new(messages::ECHO_OPTION, format!("{TRIGGER} reply")))
                .option(ReplyOption::new(messages::EXIT_OPTION, format!("{TRIGGER} exit")));
            return Ok(Some(
                Response::text(messages::ECHO_MENU)
                    .deleting(&message.id)
                    .with_options(options),
            ));
        };

        let response = match argument.to_lowercase().as_str() {
            "reply" => {
                state.scratch.set(MESSAGE_ID, message.id.as_str());
                state.expect_reply(ID);
                Some(Response::text(messages::ECHO_PROMPT).updating(&message.id))
            }
            "exit" => {
                state.scratch.remove(MESSAGE_ID);
                Some(Response::delete(&message.id))
            }
            _ => None,
        };
        Ok(response)
    }

    async fn handle_reply(
        &self,
        state: &mut ConversationState,
        reply: &Message,
    ) -> Result<Option<Response>> {
        state.clear_pending_reply();

        let Some(origin) = state.scratch.take_text(MESSAGE_ID) else {
            return Ok(None);
        };

        let back = ReplyOptions::new().option(ReplyOption::new(messages::BACK_TO_MENU, TRIGGER));
        Ok(Some(
            Response::text(reply.text.as_str())
                .updating(origin)
                .with_options(back),
        ))
    }
}
