//! # Telegram Updates
//!
//! Just enough of the Bot API `Update` object to normalize the three event kinds the engine
//! handles (message, edited message, callback query) into a `Message`.

use serde::Deserialize;

use crate::domain::error::InboundError;
use crate::domain::message::{Message, MessageOrigin};

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<TgMessage>,
    #[serde(default)]
    pub edited_message: Option<TgMessage>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TgMessage {
    pub message_id: i64,
    pub chat: Chat,
    /// Sender. Absent for channel posts.
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub message: Option<TgMessage>,
    #[serde(default)]
    pub data: Option<String>,
}

/// A normalized message together with the conversation it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub chat_id: String,
    pub message: Message,
}

impl Update {
    pub fn parse(body: &[u8]) -> Result<Self, InboundError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Conversation key of the update.
    pub fn chat_id(&self) -> Result<i64, InboundError> {
        self.message
            .as_ref()
            .or(self.edited_message.as_ref())
            .map(|m| m.chat.id)
            .or_else(|| {
                self.callback_query
                    .as_ref()
                    .and_then(|q| q.message.as_ref())
                    .map(|m| m.chat.id)
            })
            .ok_or(InboundError::MissingChat)
    }

    /// Short name of the update kind, for logs.
    pub fn kind(&self) -> &'static str {
        if self.message.is_some() {
            "message"
        } else if self.edited_message.is_some() {
            "edited_message"
        } else if self.callback_query.is_some() {
            "callback_query"
        } else {
            "other"
        }
    }

    /// `Ok(None)` for updates the engine ignores (non-text messages, blank callbacks).
    pub fn normalize(&self) -> Result<Option<Inbound>, InboundError> {
        let chat_id = self.chat_id()?.to_string();

        let message = if let Some(msg) = &self.message {
            from_text_message(msg, MessageOrigin::Text)
        } else if let Some(msg) = &self.edited_message {
            from_text_message(msg, MessageOrigin::Edited)
        } else if let Some(query) = &self.callback_query {
            from_callback(query)
        } else {
            None
        };

        Ok(message.map(|message| Inbound { chat_id, message }))
    }
}

fn from_text_message(msg: &TgMessage, origin: MessageOrigin) -> Option<Message> {
    let text = msg.text.as_deref().filter(|t| !t.trim().is_empty())?;
    // In groups the chat is the group itself; identity comes from the sender.
    let (alias, name) = match &msg.from {
        Some(user) => user.identity(),
        None => (
            msg.chat.username.clone(),
            full_name(msg.chat.first_name.as_deref(), msg.chat.last_name.as_deref()),
        ),
    };
    Some(
        Message::new(msg.message_id.to_string(), text)
            .with_sender(alias, name)
            .with_origin(origin),
    )
}

fn from_callback(query: &CallbackQuery) -> Option<Message> {
    let carrier = query.message.as_ref()?;
    let data = query.data.as_deref().filter(|d| !d.trim().is_empty())?;
    let (alias, name) = query.from.identity();
    Some(
        Message::new(carrier.message_id.to_string(), data)
            .with_sender(alias, name)
            .with_origin(MessageOrigin::Callback),
    )
}

impl User {
    fn identity(&self) -> (Option<String>, Option<String>) {
        (
            self.username.clone(),
            full_name(self.first_name.as_deref(), self.last_name.as_deref()),
        )
    }
}

fn full_name(first: Option<&str>, last: Option<&str>) -> Option<String> {
    let name = [first, last]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!name.is_empty()).then_some(name)
}
