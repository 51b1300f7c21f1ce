use async_trait::async_trait;
use folio_types::Thread;

use crate::error::Result;
use crate::models::{DBMessage, MessageList, ThreadList};

/// Trait for the durable thread/message store
///
/// The session's local cache sits on top of this; implementations talk to
/// the real API or keep everything in memory.
#[async_trait]
pub trait PersistenceClient: Send + Sync {
    /// Create a new thread for a document
    async fn create_thread(&self, document_id: &str, title: Option<String>) -> Result<Thread>;

    /// Get a thread by ID
    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>>;

    /// List threads for a document, most recently updated first
    async fn list_threads(
        &self,
        document_id: &str,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<ThreadList>;

    /// Change a thread's title
    async fn rename_thread(&self, thread_id: &str, title: &str) -> Result<Thread>;

    /// Delete a thread and its messages
    async fn delete_thread(&self, thread_id: &str) -> Result<()>;

    /// Get one page of a thread's messages in creation order
    async fn get_messages(
        &self,
        thread_id: &str,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<MessageList>;

    /// Get the full message history, page by page
    async fn fetch_history(&self, thread_id: &str, page_size: u32) -> Result<Vec<DBMessage>> {
        let page_size = page_size.max(1);
        let mut messages = Vec::new();

        loop {
            let offset = messages.len() as u32;
            let page = self.get_messages(thread_id, Some(page_size), Some(offset)).await?;
            let fetched = page.messages.len();
            messages.extend(page.messages);

            if fetched == 0 || messages.len() as u64 >= page.total {
                break;
            }
        }

        Ok(messages)
    }
}
