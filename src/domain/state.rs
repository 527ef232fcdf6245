//! # Conversation State
//!
//! Per-conversation record read and written by the router and commands during a turn.
//! Owned and persisted by the runtime; serialized to JSON by the state stores.

use crate::domain::message::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Namespaced scratch key. Commands declare these as constants (`<command>-<purpose>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScratchKey(&'static str);

impl ScratchKey {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ScratchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScratchValue {
    Number(i64),
    Text(String),
    List(Vec<String>),
}

impl ScratchValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ScratchValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            ScratchValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ScratchValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for ScratchValue {
    fn from(value: &str) -> Self {
        ScratchValue::Text(value.to_string())
    }
}

impl From<String> for ScratchValue {
    fn from(value: String) -> Self {
        ScratchValue::Text(value)
    }
}

impl From<i64> for ScratchValue {
    fn from(value: i64) -> Self {
        ScratchValue::Number(value)
    }
}

impl From<Vec<String>> for ScratchValue {
    fn from(value: Vec<String>) -> Self {
        ScratchValue::List(value)
    }
}

/// Short-lived cross-turn data owned by commands. Entries are added and removed by
/// the commands themselves; only a full reset clears everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scratch {
    entries: BTreeMap<String, ScratchValue>,
}

impl Scratch {
    pub fn get(&self, key: ScratchKey) -> Option<&ScratchValue> {
        self.entries.get(key.as_str())
    }

    pub fn set(&mut self, key: ScratchKey, value: impl Into<ScratchValue>) {
        self.entries.insert(key.as_str().to_string(), value.into());
    }

    pub fn remove(&mut self, key: ScratchKey) -> Option<ScratchValue> {
        self.entries.remove(key.as_str())
    }

    pub fn contains(&self, key: ScratchKey) -> bool {
        self.entries.contains_key(key.as_str())
    }

    pub fn text(&self, key: ScratchKey) -> Option<&str> {
        self.get(key).and_then(ScratchValue::as_text)
    }

    /// Removes the entry and returns it when it held text.
    pub fn take_text(&mut self, key: ScratchKey) -> Option<String> {
        match self.remove(key)? {
            ScratchValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// List stored under `key`, empty when missing or of another type.
    pub fn list(&self, key: ScratchKey) -> Vec<String> {
        self.get(key)
            .and_then(ScratchValue::as_list)
            .map(<[String]>::to_vec)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// State of a single conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    #[serde(default)]
    pub chat_id: String,
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub is_authenticated: bool,
    /// Id of the command waiting for a free-text reply. At most one; setting overwrites.
    #[serde(default)]
    pub pending_reply: Option<String>,
    #[serde(default)]
    pub scratch: Scratch,
    #[serde(default)]
    pub invocations: u64,
    #[serde(default)]
    pub last_turn_at: Option<DateTime<Utc>>,
}

impl ConversationState {
    pub fn new(chat_id: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            ..Self::default()
        }
    }

    /// Routes the next unmatched message to `command_id`.
    pub fn expect_reply(&mut self, command_id: &str) {
        self.pending_reply = Some(command_id.to_string());
    }

    pub fn clear_pending_reply(&mut self) {
        self.pending_reply = None;
    }

    pub fn pending_reply(&self) -> Option<&str> {
        self.pending_reply.as_deref()
    }

    /// True when the message comes from someone other than the stored identity.
    pub fn identity_changed(&self, message: &Message) -> bool {
        message.sender_alias.as_deref().unwrap_or("") != self.alias
    }

    /// Full reset: drops authentication, the pending reply and all scratch data, and
    /// re-seeds identity from `message`.
    pub fn reset(&mut self, message: &Message) {
        self.alias = message.sender_alias.clone().unwrap_or_default();
        self.display_name = message.sender_name.clone().unwrap_or_default();
        self.is_authenticated = false;
        self.pending_reply = None;
        self.scratch.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST: ScratchKey = ScratchKey::new("test-list");
    const ORIGIN: ScratchKey = ScratchKey::new("test-origin");

    fn message_from(alias: &str) -> Message {
        Message::new("1", "hi").with_sender(Some(alias.to_string()), Some("Ola Nordmann".into()))
    }

    #[test]
    fn test_reset_clears_scratch_and_pending() {
        let mut state = ConversationState::new("100");
        state.alias = "old".into();
        state.is_authenticated = true;
        state.expect_reply("EchoCommand");
        state.scratch.set(ORIGIN, "42");
        state.scratch.set(LIST, vec!["NHY".to_string()]);

        let msg = message_from("new");
        assert!(state.identity_changed(&msg));
        state.reset(&msg);

        assert_eq!(state.pending_reply(), None);
        assert!(!state.is_authenticated);
        assert!(state.scratch.get(ORIGIN).is_none());
        assert!(state.scratch.list(LIST).is_empty());
        assert_eq!(state.alias, "new");
        assert_eq!(state.display_name, "Ola Nordmann");
        assert_eq!(state.chat_id, "100");
    }

    #[test]
    fn test_pending_reply_overwrites() {
        let mut state = ConversationState::default();
        state.expect_reply("A");
        state.expect_reply("B");
        assert_eq!(state.pending_reply(), Some("B"));
        state.clear_pending_reply();
        assert_eq!(state.pending_reply(), None);
    }

    #[test]
    fn test_take_text_only_removes_present_key() {
        let mut scratch = Scratch::default();
        assert_eq!(scratch.take_text(ORIGIN), None);
        scratch.set(ORIGIN, "42");
        assert_eq!(scratch.text(ORIGIN), Some("42"));
        assert_eq!(scratch.take_text(ORIGIN), Some("42".to_string()));
        assert!(!scratch.contains(ORIGIN));
    }

    #[test]
    fn test_state_json_shape() {
        let mut state = ConversationState::new("100");
        state.scratch.set(ORIGIN, "42");
        state.scratch.set(LIST, vec!["NHY".to_string(), "MOWI".to_string()]);
        state.scratch.set(ScratchKey::new("test-count"), 3_i64);

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["scratch"]["test-origin"], "42");
        assert_eq!(json["scratch"]["test-list"][1], "MOWI");
        assert_eq!(json["scratch"]["test-count"], 3);

        let back: ConversationState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_missing_fields_default() {
        let state: ConversationState = serde_json::from_str(r#"{"alias":"bob"}"#).unwrap();
        assert_eq!(state.alias, "bob");
        assert!(state.scratch.is_empty());
        assert_eq!(state.pending_reply(), None);
    }
}
