use async_trait::async_trait;
use chrono::Utc;
use folio_types::{MessageRole, Thread};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{PersistError, Result};
use crate::models::{DBMessage, MessageList, ThreadList};
use crate::trait_client::PersistenceClient;

#[derive(Default)]
struct Store {
    threads: HashMap<String, Thread>,
    messages: HashMap<String, Vec<DBMessage>>,
}

/// Process-local store with the same semantics as the HTTP API
///
/// Useful offline and as the durable side in tests.
#[derive(Clone, Default)]
pub struct InMemoryPersistenceClient {
    store: Arc<RwLock<Store>>,
}

impl InMemoryPersistenceClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a thread under a known id (as the backend does on start-chat)
    pub async fn insert_thread_with_id(
        &self,
        thread_id: impl Into<String>,
        document_id: impl Into<String>,
        title: Option<String>,
    ) -> Thread {
        let thread = Thread::acknowledged(thread_id, document_id, title);
        let mut store = self.store.write().await;
        store.messages.entry(thread.id.clone()).or_default();
        store.threads.insert(thread.id.clone(), thread.clone());
        thread
    }

    /// Append a message to a thread's durable history
    pub async fn append_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: impl Into<String>,
        metadata: Option<serde_json::Value>,
    ) -> Result<DBMessage> {
        let mut store = self.store.write().await;
        let thread = store
            .threads
            .get_mut(thread_id)
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))?;
        thread.updated_at = Utc::now();

        let mut message = DBMessage::new(thread_id, role, content);
        message.metadata = metadata;
        store
            .messages
            .entry(thread_id.to_string())
            .or_default()
            .push(message.clone());
        Ok(message)
    }

    pub async fn thread_count(&self) -> usize {
        self.store.read().await.threads.len()
    }
}

#[async_trait]
impl PersistenceClient for InMemoryPersistenceClient {
    async fn create_thread(&self, document_id: &str, title: Option<String>) -> Result<Thread> {
        let id = uuid::Uuid::new_v4().to_string();
        let title = title.or_else(|| Some("New Chat".to_string()));
        Ok(self.insert_thread_with_id(id, document_id, title).await)
    }

    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        Ok(self.store.read().await.threads.get(thread_id).cloned())
    }

    async fn list_threads(
        &self,
        document_id: &str,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<ThreadList> {
        let store = self.store.read().await;
        let mut threads: Vec<Thread> = store
            .threads
            .values()
            .filter(|t| t.document_id == document_id)
            .cloned()
            .collect();
        threads.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));

        let total = threads.len() as u64;
        let threads = threads
            .into_iter()
            .skip(offset.unwrap_or(0) as usize)
            .take(limit.unwrap_or(50) as usize)
            .collect();

        Ok(ThreadList { threads, total })
    }

    async fn rename_thread(&self, thread_id: &str, title: &str) -> Result<Thread> {
        let mut store = self.store.write().await;
        let thread = store
            .threads
            .get_mut(thread_id)
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))?;
        thread.title = Some(title.to_string());
        thread.updated_at = Utc::now();
        Ok(thread.clone())
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        let mut store = self.store.write().await;
        store
            .threads
            .remove(thread_id)
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))?;
        store.messages.remove(thread_id);
        Ok(())
    }

    async fn get_messages(
        &self,
        thread_id: &str,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<MessageList> {
        let store = self.store.read().await;
        if !store.threads.contains_key(thread_id) {
            return Err(PersistError::ThreadNotFound(thread_id.to_string()));
        }

        let all = store.messages.get(thread_id).cloned().unwrap_or_default();
        let total = all.len() as u64;
        let messages = all
            .into_iter()
            .skip(offset.unwrap_or(0) as usize)
            .take(limit.unwrap_or(100) as usize)
            .collect();

        Ok(MessageList { messages, total })
    }
}
