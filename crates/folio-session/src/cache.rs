use folio_types::{Message, ThreadId};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache slot for thread {0} is already occupied")]
    SlotOccupied(ThreadId),

    #[error("No cache slot for thread {0}")]
    MissingSlot(ThreadId),
}

/// Per-thread message lists for every thread touched this session
///
/// Cloning yields another handle to the same map. Exactly one slot exists
/// per thread identity; `migrate` is the only operation that moves a slot.
#[derive(Clone, Default)]
pub struct MessageCache {
    entries: Arc<RwLock<HashMap<ThreadId, Vec<Message>>>>,
}

impl MessageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages cached for a thread (empty if never cached)
    pub async fn get(&self, thread_id: &ThreadId) -> Vec<Message> {
        self.entries
            .read()
            .await
            .get(thread_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Like `get`, but distinguishes "empty" from "never cached"
    pub async fn entry(&self, thread_id: &ThreadId) -> Option<Vec<Message>> {
        self.entries.read().await.get(thread_id).cloned()
    }

    pub async fn contains(&self, thread_id: &ThreadId) -> bool {
        self.entries.read().await.contains_key(thread_id)
    }

    /// Replace a thread's list wholesale
    pub async fn put(&self, thread_id: ThreadId, messages: Vec<Message>) {
        self.entries.write().await.insert(thread_id, messages);
    }

    /// Mutate a thread's list in place, creating an empty slot if needed
    pub async fn update<F, R>(&self, thread_id: &ThreadId, f: F) -> R
    where
        F: FnOnce(&mut Vec<Message>) -> R,
    {
        let mut entries = self.entries.write().await;
        f(entries.entry(thread_id.clone()).or_default())
    }

    /// Move a slot to a new identity, retagging every message in it
    ///
    /// Runs under one write lock: no reader ever observes both slots, or
    /// neither. Fails without touching the map if `to` already exists or
    /// `from` does not.
    pub async fn migrate(&self, from: &ThreadId, to: &ThreadId) -> Result<usize, CacheError> {
        let mut entries = self.entries.write().await;

        if entries.contains_key(to) {
            tracing::error!("Refusing to migrate {} into occupied slot {}", from, to);
            return Err(CacheError::SlotOccupied(to.clone()));
        }

        let mut messages = entries.remove(from).ok_or_else(|| {
            tracing::error!("Cannot migrate {}: no cache slot", from);
            CacheError::MissingSlot(from.clone())
        })?;

        for message in messages.iter_mut() {
            message.retag(to);
        }

        let moved = messages.len();
        entries.insert(to.clone(), messages);
        tracing::debug!("Migrated {} messages from {} to {}", moved, from, to);

        Ok(moved)
    }

    pub async fn evict(&self, thread_id: &ThreadId) -> Option<Vec<Message>> {
        self.entries.write().await.remove(thread_id)
    }

    /// Number of cached threads
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn thread_ids(&self) -> Vec<ThreadId> {
        self.entries.read().await.keys().cloned().collect()
    }
}
