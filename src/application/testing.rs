//! Test doubles for the router, renderer and runtime.

use crate::domain::error::RenderError;
use crate::domain::message::Message;
use crate::domain::response::{ReplyOptions, Response};
use crate::domain::state::{ConversationState, ScratchKey};
use crate::domain::traits::{ChatProvider, Command};
use anyhow::{Result, bail};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

pub const STUB_TOUCHED: ScratchKey = ScratchKey::new("stub-touched");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubMode {
    Respond,
    Fail,
    Panic,
}

/// Command with predictable output. Invocation with the argument `ask` sets the
/// pending reply; replies clear it.
pub struct StubCommand {
    id: String,
    trigger: String,
    auth: bool,
    mode: StubMode,
}

impl StubCommand {
    pub fn new(id: &str, trigger: &str) -> Self {
        Self {
            id: id.to_string(),
            trigger: trigger.to_string(),
            auth: false,
            mode: StubMode::Respond,
        }
    }

    pub fn authenticated(mut self) -> Self {
        self.auth = true;
        self
    }

    pub fn mode(mut self, mode: StubMode) -> Self {
        self.mode = mode;
        self
    }
}

#[async_trait]
impl Command for StubCommand {
    fn id(&self) -> &str {
        &self.id
    }

    fn trigger(&self) -> &str {
        &self.trigger
    }

    fn description(&self) -> &str {
        "stub"
    }

    fn requires_authentication(&self) -> bool {
        self.auth
    }

    async fn handle_invocation(
        &self,
        state: &mut ConversationState,
        message: &Message,
    ) -> Result<Option<Response>> {
        state.scratch.set(STUB_TOUCHED, message.id.as_str());
        match self.mode {
            StubMode::Fail => bail!("stub failure"),
            StubMode::Panic => panic!("stub panic"),
            StubMode::Respond => {}
        }
        if message.argument(0) == Some("ask") {
            state.expect_reply(&self.id);
        }
        Ok(Some(Response::text(format!(
            "{} invoked [{}]",
            self.id,
            message.arguments().join(" ")
        ))))
    }

    async fn handle_reply(
        &self,
        state: &mut ConversationState,
        reply: &Message,
    ) -> Result<Option<Response>> {
        state.clear_pending_reply();
        Ok(Some(Response::text(format!("{} got {}", self.id, reply.text))))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCall {
    Send {
        chat_id: String,
        text: String,
        options: ReplyOptions,
    },
    Edit {
        chat_id: String,
        message_id: String,
        text: String,
        options: ReplyOptions,
    },
    Delete {
        chat_id: String,
        message_id: String,
    },
}

/// Records every transport call. Message ids handed out by `send_message` start at 1000.
#[derive(Default)]
pub struct RecordingChat {
    calls: Mutex<Vec<ChatCall>>,
    next_id: AtomicU64,
    fail_edits: bool,
    fail_deletes: bool,
}

impl RecordingChat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_edits(mut self) -> Self {
        self.fail_edits = true;
        self
    }

    pub fn failing_deletes(mut self) -> Self {
        self.fail_deletes = true;
        self
    }

    pub fn calls(&self) -> Vec<ChatCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: ChatCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ChatProvider for RecordingChat {
    async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        options: &ReplyOptions,
    ) -> Result<String, RenderError> {
        self.record(ChatCall::Send {
            chat_id: chat_id.to_string(),
            text: text.to_string(),
            options: options.clone(),
        });
        Ok((1000 + self.next_id.fetch_add(1, Ordering::SeqCst)).to_string())
    }

    async fn edit_message(
        &self,
        chat_id: &str,
        message_id: &str,
        text: &str,
        options: &ReplyOptions,
    ) -> Result<(), RenderError> {
        self.record(ChatCall::Edit {
            chat_id: chat_id.to_string(),
            message_id: message_id.to_string(),
            text: text.to_string(),
            options: options.clone(),
        });
        if self.fail_edits {
            return Err(RenderError::Api {
                method: "editMessageText".into(),
                description: "Bad Request: message to edit not found".into(),
            });
        }
        Ok(())
    }

    async fn delete_message(&self, chat_id: &str, message_id: &str) -> Result<(), RenderError> {
        self.record(ChatCall::Delete {
            chat_id: chat_id.to_string(),
            message_id: message_id.to_string(),
        });
        if self.fail_deletes {
            return Err(RenderError::Api {
                method: "deleteMessage".into(),
                description: "Bad Request: message can't be deleted".into(),
            });
        }
        Ok(())
    }
}
