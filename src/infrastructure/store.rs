//! # State Stores
//!
//! `StateStore` implementations: one JSON file per conversation on disk, and an in-memory
//! map for tests and ephemeral runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::domain::error::StoreError;
use crate::domain::state::ConversationState;
use crate::domain::traits::StateStore;

/// Stores each conversation as `<dir>/<chat_id>.json`.
pub struct FileStateStore {
    dir: PathBuf,
}

impl FileStateStore {
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, chat_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(chat_id)))
    }
}

/// Chat ids are numeric on Telegram, but nothing else is allowed into a file name.
fn file_stem(chat_id: &str) -> String {
    chat_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self, chat_id: &str) -> Result<Option<ConversationState>, StoreError> {
        let path = self.path_for(chat_id);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, chat_id: &str, state: &ConversationState) -> Result<(), StoreError> {
        let path = self.path_for(chat_id);
        let tmp = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(state)?;
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStateStore {
    states: Mutex<HashMap<String, ConversationState>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self, chat_id: &str) -> Result<Option<ConversationState>, StoreError> {
        Ok(self.states.lock().await.get(chat_id).cloned())
    }

    async fn save(&self, chat_id: &str, state: &ConversationState) -> Result<(), StoreError> {
        self.states
            .lock()
            .await
            .insert(chat_id.to_string(), state.clone());
        Ok(())
    }
}
