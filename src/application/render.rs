//! # Response Rendering
//!
//! Reconciles a `Response` with the chat transport: executes the planned delete / update /
//! send calls in order and reports what happened. Failures are logged with the ids involved
//! and never retried.

use crate::domain::response::{RenderAction, Response};
use crate::domain::traits::ChatProvider;

/// What a render pass achieved.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RenderReport {
    pub attempted: usize,
    pub failed: usize,
    /// Id of the message created by a send, if one succeeded.
    pub sent_message_id: Option<String>,
}

impl RenderReport {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Performs every action of `response` against `chat`. A failed action does not stop the
/// remaining ones.
pub async fn render_response<C>(chat: &C, chat_id: &str, response: &Response) -> RenderReport
where
    C: ChatProvider + ?Sized,
{
    let mut report = RenderReport::default();

    for action in response.plan() {
        report.attempted += 1;
        let result = match action {
            RenderAction::Delete { message_id } => chat
                .delete_message(chat_id, message_id)
                .await
                .inspect_err(|e| {
                    tracing::error!("Failed to delete message {} in chat {}: {}", message_id, chat_id, e)
                }),
            RenderAction::Update {
                message_id,
                text,
                options,
            } => chat
                .edit_message(chat_id, message_id, text, options)
                .await
                .inspect_err(|e| {
                    tracing::error!("Failed to update message {} in chat {}: {}", message_id, chat_id, e)
                }),
            RenderAction::Send { text, options } => match chat.send_message(chat_id, text, options).await {
                Ok(id) => {
                    report.sent_message_id = Some(id);
                    Ok(())
                }
                Err(e) => {
                    tracing::error!("Failed to send message to chat {}: {}", chat_id, e);
                    Err(e)
                }
            },
        };

        if result.is_err() {
            report.failed += 1;
        }
    }

    report
}
