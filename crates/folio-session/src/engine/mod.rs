mod actor;
mod command;
mod stream;

use folio_persist::PersistenceClient;
use folio_stream::ChatBackend;
use folio_types::{ContextPin, SessionConfig, Thread, ThreadId};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::cache::MessageCache;
use crate::error::{Result, SessionError};
use crate::update::{SendReceipt, SessionSnapshot, SessionUpdate, SwitchOutcome};
use actor::SessionActor;
use command::Command;

/// Factory for document chat sessions sharing one backend and store
pub struct SessionEngine {
    backend: Arc<dyn ChatBackend>,
    persistence: Arc<dyn PersistenceClient>,
    config: SessionConfig,
}

impl SessionEngine {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        persistence: Arc<dyn PersistenceClient>,
        config: SessionConfig,
    ) -> Self {
        Self {
            backend,
            persistence,
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Spawn a session for one document
    ///
    /// Returns the handle used to drive it and the receiver of its updates.
    /// The session stops once every handle has been dropped and its
    /// background work has drained.
    pub fn spawn(
        &self,
        document_id: impl Into<String>,
    ) -> (SessionHandle, mpsc::UnboundedReceiver<SessionUpdate>) {
        let (command_tx, command_rx) = mpsc::channel(self.config.command_capacity);
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let document_id = document_id.into();
        let cache = MessageCache::new();

        let actor = SessionActor::new(
            document_id.clone(),
            self.config.clone(),
            Arc::clone(&self.backend),
            Arc::clone(&self.persistence),
            cache.clone(),
            command_tx.downgrade(),
            update_tx,
        );
        tokio::spawn(actor.run(command_rx));

        let handle = SessionHandle {
            commands: command_tx,
            cache,
            document_id,
        };
        (handle, update_rx)
    }
}

/// Cloneable front end of a running session
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
    cache: MessageCache,
    document_id: String,
}

impl SessionHandle {
    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Read access to the per-thread message cache
    pub fn cache(&self) -> &MessageCache {
        &self.cache
    }

    /// Enter the session on a pending thread and load the thread list
    pub async fn start_session(&self) -> Result<Vec<Thread>> {
        self.request(|reply| Command::StartSession { reply }).await?
    }

    /// Send a message on the active thread
    ///
    /// Resolves once the message is shown and its response stream has been
    /// started; the outcome arrives as `SendCompleted` or `SendFailed`.
    pub async fn send_message(&self, text: impl Into<String>) -> Result<SendReceipt> {
        let text = text.into();
        self.request(|reply| Command::SendMessage { text, reply })
            .await?
    }

    /// Resolves when the switch has happened, which may wait for a pending
    /// thread to receive its server id first
    pub async fn switch_thread(&self, target: ThreadId) -> Result<SwitchOutcome> {
        self.request(|reply| Command::SwitchThread { target, reply })
            .await?
    }

    pub async fn new_thread(&self) -> Result<ThreadId> {
        self.request(|reply| Command::NewThread { reply }).await?
    }

    /// Delete a thread, returning the thread active afterwards
    pub async fn delete_thread(&self, thread: ThreadId) -> Result<Option<ThreadId>> {
        self.request(|reply| Command::DeleteThread { thread, reply })
            .await?
    }

    pub async fn rename_thread(
        &self,
        thread_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Result<Thread> {
        let thread_id = thread_id.into();
        let title = title.into();
        self.request(|reply| Command::RenameThread {
            thread_id,
            title,
            reply,
        })
        .await?
    }

    pub async fn refresh_threads(&self) -> Result<Vec<Thread>> {
        self.request(|reply| Command::RefreshThreads { reply: Some(reply) })
            .await?
    }

    pub async fn add_pin(&self, text: impl Into<String>, page: u32) -> Result<ContextPin> {
        let text = text.into();
        self.request(|reply| Command::AddPin { text, page, reply })
            .await
    }

    pub async fn remove_pin(&self, id: Uuid) -> Result<bool> {
        self.request(|reply| Command::RemovePin { id, reply }).await
    }

    /// Page the reader is on, sent with subsequent queries
    pub async fn set_page_context(&self, page: Option<u32>) -> Result<()> {
        self.commands
            .send(Command::SetPageContext { page })
            .await
            .map_err(|_| SessionError::EngineStopped)
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(build(reply))
            .await
            .map_err(|_| SessionError::EngineStopped)?;
        response.await.map_err(|_| SessionError::EngineStopped)
    }
}
