//! # Inbound Messages
//!
//! The transport-neutral shape every inbound event is normalized into before it
//! reaches the router: plain text, edited text and button presses all become a `Message`.

use serde::{Deserialize, Serialize};

/// Which kind of upstream event produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MessageOrigin {
    #[default]
    Text,
    Edited,
    /// A button press. The message id is the id of the message carrying the buttons.
    Callback,
}

/// One inbound message for a single turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Opaque platform message identifier.
    pub id: String,
    pub sender_alias: Option<String>,
    pub sender_name: Option<String>,
    /// Raw text or callback payload.
    pub text: String,
    #[serde(default)]
    pub origin: MessageOrigin,
}

impl Message {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sender_alias: None,
            sender_name: None,
            text: text.into(),
            origin: MessageOrigin::Text,
        }
    }

    pub fn with_sender(mut self, alias: Option<String>, name: Option<String>) -> Self {
        self.sender_alias = alias;
        self.sender_name = name;
        self
    }

    pub fn with_origin(mut self, origin: MessageOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// First whitespace-delimited token, the candidate trigger.
    pub fn leading_token(&self) -> Option<&str> {
        self.text.split_whitespace().next()
    }

    /// Tokens after the trigger.
    pub fn arguments(&self) -> Vec<&str> {
        self.text.split_whitespace().skip(1).collect()
    }

    pub fn argument(&self, index: usize) -> Option<&str> {
        self.text.split_whitespace().nth(index + 1)
    }

    pub fn is_callback(&self) -> bool {
        self.origin == MessageOrigin::Callback
    }
}
