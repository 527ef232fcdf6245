//! # Conversation Runtime
//!
//! One actor task per chat. Turns for a chat run strictly in order; chats run in parallel
//! and never share state. Each turn works on a copy of the state which is persisted before
//! any transport call and only then adopted, so a failed turn leaves nothing behind.

use chrono::Utc;
use futures::FutureExt;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, mpsc};

use crate::application::render::{RenderReport, render_response};
use crate::application::router::{CommandRouter, Outcome};
use crate::domain::error::RuntimeError;
use crate::domain::message::Message;
use crate::domain::state::ConversationState;
use crate::domain::traits::{ChatProvider, StateStore};

#[derive(Debug)]
pub enum TurnResult {
    Completed {
        outcome: Outcome,
        render: Option<RenderReport>,
    },
    /// Handler error, panic or persistence failure. State was left as it was.
    Failed,
}

/// Executes single turns: dispatch, persist, render.
pub struct TurnProcessor {
    router: Arc<CommandRouter>,
    chat: Arc<dyn ChatProvider>,
    store: Arc<dyn StateStore>,
}

impl TurnProcessor {
    pub fn new(
        router: Arc<CommandRouter>,
        chat: Arc<dyn ChatProvider>,
        store: Arc<dyn StateStore>,
    ) -> Self {
        Self {
            router,
            chat,
            store,
        }
    }

    pub async fn run_turn(
        &self,
        chat_id: &str,
        state: &mut ConversationState,
        message: Message,
    ) -> TurnResult {
        let mut working = state.clone();
        working.chat_id = chat_id.to_string();
        working.invocations += 1;
        working.last_turn_at = Some(Utc::now());

        let dispatched = AssertUnwindSafe(self.router.dispatch(&mut working, &message))
            .catch_unwind()
            .await;

        let outcome = match dispatched {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                tracing::error!("Turn failed in chat {} (message {}): {:#}", chat_id, message.id, e);
                return TurnResult::Failed;
            }
            Err(panic) => {
                tracing::error!(
                    "Command panicked in chat {} (message {}): {}",
                    chat_id,
                    message.id,
                    panic_message(panic.as_ref())
                );
                return TurnResult::Failed;
            }
        };

        if let Err(e) = self.store.save(chat_id, &working).await {
            tracing::error!("Failed to persist chat {}: {}", chat_id, e);
            return TurnResult::Failed;
        }
        *state = working;

        let render = match outcome.response() {
            Some(response) => Some(render_response(self.chat.as_ref(), chat_id, response).await),
            None => None,
        };

        TurnResult::Completed { outcome, render }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

type Mailboxes = Arc<RwLock<HashMap<String, mpsc::Sender<Message>>>>;

/// Manager for all conversation actors.
pub struct RuntimeManager {
    turns: Arc<TurnProcessor>,
    store: Arc<dyn StateStore>,
    actors: Mailboxes,
    mailbox_capacity: usize,
    idle_timeout: Duration,
}

impl RuntimeManager {
    pub fn new(
        router: Arc<CommandRouter>,
        chat: Arc<dyn ChatProvider>,
        store: Arc<dyn StateStore>,
    ) -> Self {
        Self {
            turns: Arc::new(TurnProcessor::new(router, chat, store.clone())),
            store,
            actors: Arc::new(RwLock::new(HashMap::new())),
            mailbox_capacity: 32,
            idle_timeout: Duration::from_secs(600),
        }
    }

    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = capacity.max(1);
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Queues a message for its conversation, starting the actor if needed.
    /// Returns once the message is enqueued, not when the turn has run.
    pub async fn signal(&self, chat_id: &str, message: Message) -> Result<(), RuntimeError> {
        {
            let actors = self.actors.read().await;
            if let Some(mailbox) = actors.get(chat_id) {
                return match mailbox.try_send(message) {
                    Ok(()) => Ok(()),
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        Err(RuntimeError::MailboxFull(chat_id.to_string()))
                    }
                    Err(mpsc::error::TrySendError::Closed(message)) => {
                        drop(actors);
                        tracing::warn!("Actor for chat {} stopped unexpectedly, restarting", chat_id);
                        self.actors.write().await.remove(chat_id);
                        self.start_and_send(chat_id, message).await
                    }
                };
            }
        }

        self.start_and_send(chat_id, message).await
    }

    async fn start_and_send(&self, chat_id: &str, message: Message) -> Result<(), RuntimeError> {
        // No actor is running for this chat, so the stored state is final.
        let loaded = self
            .store
            .load(chat_id)
            .await
            .map_err(|source| RuntimeError::Load {
                chat_id: chat_id.to_string(),
                source,
            })?;

        let mut actors = self.actors.write().await;
        let mailbox = match actors.get(chat_id) {
            Some(existing) => existing.clone(),
            None => {
                let (tx, rx) = mpsc::channel(self.mailbox_capacity);
                let actor = ConversationActor {
                    chat_id: chat_id.to_string(),
                    state: loaded.unwrap_or_else(|| ConversationState::new(chat_id)),
                    mailbox: rx,
                    turns: self.turns.clone(),
                    actors: self.actors.clone(),
                    idle_timeout: self.idle_timeout,
                };
                tokio::spawn(actor.run());
                tracing::debug!("Started actor for chat {}", chat_id);
                actors.insert(chat_id.to_string(), tx.clone());
                tx
            }
        };

        mailbox.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => RuntimeError::MailboxFull(chat_id.to_string()),
            mpsc::error::TrySendError::Closed(_) => RuntimeError::MailboxClosed(chat_id.to_string()),
        })
    }

    pub async fn active_conversations(&self) -> usize {
        self.actors.read().await.len()
    }
}

struct ConversationActor {
    chat_id: String,
    state: ConversationState,
    mailbox: mpsc::Receiver<Message>,
    turns: Arc<TurnProcessor>,
    actors: Mailboxes,
    idle_timeout: Duration,
}

impl ConversationActor {
    async fn run(mut self) {
        loop {
            match tokio::time::timeout(self.idle_timeout, self.mailbox.recv()).await {
                Ok(Some(message)) => {
                    self.turns
                        .run_turn(&self.chat_id, &mut self.state, message)
                        .await;
                }
                Ok(None) => break,
                Err(_) => {
                    // Senders are only used under the map lock, so an empty mailbox
                    // seen under the write lock stays empty once the entry is gone.
                    let mut actors = self.actors.write().await;
                    if !self.mailbox.is_empty() {
                        continue;
                    }
                    actors.remove(&self.chat_id);
                    break;
                }
            }
        }
        tracing::debug!("Actor for chat {} stopped", self.chat_id);
    }
}
