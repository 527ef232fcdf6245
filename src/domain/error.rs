//! # Errors
//!
//! Error types at the seams between the engine and its collaborators.
//! Command handlers themselves use `anyhow`.

use thiserror::Error;

/// Failure of a send, update or delete call against the chat transport.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid chat id '{0}'")]
    InvalidChatId(String),

    #[error("invalid message id '{0}'")]
    InvalidMessageId(String),

    #[error("button payload exceeds 64 bytes: '{0}'")]
    CallbackDataTooLong(String),

    #[error("transport request failed: {0}")]
    Transport(String),

    #[error("{method} rejected: {description}")]
    Api { method: String, description: String },
}

impl From<reqwest::Error> for RenderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RenderError::Transport(format!("request timed out: {err}"))
        } else if err.is_connect() {
            RenderError::Transport(format!("connection failed: {err}"))
        } else {
            RenderError::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("state i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("state serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Inbound payload that cannot be turned into a turn.
#[derive(Debug, Error)]
pub enum InboundError {
    #[error("malformed update: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("update carries no chat id")]
    MissingChat,
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("mailbox for conversation {0} is full")]
    MailboxFull(String),

    #[error("conversation {0} is not accepting messages")]
    MailboxClosed(String),

    #[error("could not load conversation {chat_id}: {source}")]
    Load {
        chat_id: String,
        #[source]
        source: StoreError,
    },
}
