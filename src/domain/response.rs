//! # Responses
//!
//! Declarative output of a command. A `Response` says *what* should appear in the chat;
//! the reconciler in `application::render` turns it into transport calls.

use serde::{Deserialize, Serialize};

/// A selectable follow-up: a label and the command text it submits when chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyOption {
    pub label: String,
    pub command: String,
}

impl ReplyOption {
    pub fn new(label: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            command: command.into(),
        }
    }
}

pub type OptionRow = Vec<ReplyOption>;

/// Ordered option rows. Flat options occupy one row each; grouped rows keep
/// several options side by side, left to right.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplyOptions {
    rows: Vec<OptionRow>,
}

impl ReplyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a single option on its own row.
    pub fn option(mut self, option: ReplyOption) -> Self {
        self.push(option);
        self
    }

    /// Appends a row of grouped options. Empty rows are skipped.
    pub fn row(mut self, row: OptionRow) -> Self {
        if !row.is_empty() {
            self.rows.push(row);
        }
        self
    }

    pub fn push(&mut self, option: ReplyOption) {
        self.rows.push(vec![option]);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[OptionRow] {
        &self.rows
    }

    /// All options in rendering order.
    pub fn iter(&self) -> impl Iterator<Item = &ReplyOption> {
        self.rows.iter().flatten()
    }
}

impl FromIterator<ReplyOption> for ReplyOptions {
    fn from_iter<I: IntoIterator<Item = ReplyOption>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().map(|option| vec![option]).collect(),
        }
    }
}

impl Extend<ReplyOption> for ReplyOptions {
    fn extend<I: IntoIterator<Item = ReplyOption>>(&mut self, iter: I) {
        self.rows.extend(iter.into_iter().map(|option| vec![option]));
    }
}

/// Output of a command for one turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub text: String,
    pub delete_target: Option<String>,
    pub update_target: Option<String>,
    #[serde(default)]
    pub options: ReplyOptions,
}

/// A single transport call derived from a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderAction<'a> {
    Delete {
        message_id: &'a str,
    },
    Update {
        message_id: &'a str,
        text: &'a str,
        options: &'a ReplyOptions,
    },
    Send {
        text: &'a str,
        options: &'a ReplyOptions,
    },
}

impl Response {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// A response that only removes a message.
    pub fn delete(message_id: impl Into<String>) -> Self {
        Self {
            delete_target: Some(message_id.into()),
            ..Self::default()
        }
    }

    pub fn updating(mut self, message_id: impl Into<String>) -> Self {
        self.update_target = Some(message_id.into());
        self
    }

    pub fn deleting(mut self, message_id: impl Into<String>) -> Self {
        self.delete_target = Some(message_id.into());
        self
    }

    pub fn with_options(mut self, options: ReplyOptions) -> Self {
        self.options = options;
        self
    }

    /// Transport calls for this response, in execution order.
    ///
    /// An update target wins outright: the message is edited in place and nothing else
    /// happens. Otherwise the delete target (if any) is removed first and a non-empty
    /// body is sent as a new message, which gives delete-and-replace.
    pub fn plan(&self) -> Vec<RenderAction<'_>> {
        if let Some(message_id) = self.update_target.as_deref() {
            return vec![RenderAction::Update {
                message_id,
                text: &self.text,
                options: &self.options,
            }];
        }

        let mut actions = Vec::with_capacity(2);
        if let Some(message_id) = self.delete_target.as_deref() {
            actions.push(RenderAction::Delete { message_id });
        }
        if !self.text.is_empty() {
            actions.push(RenderAction::Send {
                text: &self.text,
                options: &self.options,
            });
        }
        actions
    }
}
