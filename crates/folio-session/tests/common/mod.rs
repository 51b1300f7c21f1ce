#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use folio_persist::{
    InMemoryPersistenceClient, MessageList, PersistError, PersistenceClient, ThreadList,
};
use folio_session::{SessionConfig, SessionEngine, SessionHandle, SessionUpdate};
use folio_stream::{ChatBackend, EventStream};
use folio_types::{QueryRequest, StreamEvent, Thread};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio_stream::wrappers::ReceiverStream;

pub const DOC: &str = "doc-1";

enum Scripted {
    Stream(mpsc::Receiver<Result<StreamEvent>>),
    Fail(String),
}

/// Backend whose responses are driven event by event from the test
#[derive(Default)]
pub struct ChannelBackend {
    scripts: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<QueryRequest>>,
}

impl ChannelBackend {
    /// Queue a response stream for the next query; events are pushed through the sender
    pub async fn expect_stream(&self) -> mpsc::Sender<Result<StreamEvent>> {
        let (tx, rx) = mpsc::channel(64);
        self.scripts.lock().await.push_back(Scripted::Stream(rx));
        tx
    }

    /// Queue a connection failure for the next query
    pub async fn expect_failure(&self, message: &str) {
        self.scripts
            .lock()
            .await
            .push_back(Scripted::Fail(message.to_string()));
    }

    pub async fn requests(&self) -> Vec<QueryRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl ChatBackend for ChannelBackend {
    async fn stream_query(&self, request: QueryRequest) -> Result<EventStream> {
        self.requests.lock().await.push(request);
        match self.scripts.lock().await.pop_front() {
            Some(Scripted::Stream(rx)) => Ok(Box::pin(ReceiverStream::new(rx))),
            Some(Scripted::Fail(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("no scripted response")),
        }
    }
}

pub struct Harness {
    pub handle: SessionHandle,
    pub updates: mpsc::UnboundedReceiver<SessionUpdate>,
    pub backend: Arc<ChannelBackend>,
    pub store: InMemoryPersistenceClient,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_config(SessionConfig::default()).await
    }

    pub async fn with_config(config: SessionConfig) -> Self {
        Self::with_store(InMemoryPersistenceClient::new(), config).await
    }

    /// Start a session over a pre-seeded store
    pub async fn with_store(store: InMemoryPersistenceClient, config: SessionConfig) -> Self {
        Self::with_persistence(store.clone(), Arc::new(store), config).await
    }

    /// Start a session whose engine talks to `persistence`; `store` stays
    /// reachable for seeding
    pub async fn with_persistence(
        store: InMemoryPersistenceClient,
        persistence: Arc<dyn PersistenceClient>,
        config: SessionConfig,
    ) -> Self {
        let backend = Arc::new(ChannelBackend::default());
        let engine = SessionEngine::new(backend.clone(), persistence, config);
        let (handle, updates) = engine.spawn(DOC);
        handle.start_session().await.unwrap();

        Self {
            handle,
            updates,
            backend,
            store,
        }
    }

    /// Wait for the first update matching `pred`, skipping the rest
    pub async fn wait_for<F>(&mut self, pred: F) -> SessionUpdate
    where
        F: Fn(&SessionUpdate) -> bool,
    {
        let deadline = Duration::from_secs(5);
        loop {
            let update = tokio::time::timeout(deadline, self.updates.recv())
                .await
                .expect("timed out waiting for session update")
                .expect("session closed");
            if pred(&update) {
                return update;
            }
        }
    }

    pub async fn wait_completed(&mut self) -> SessionUpdate {
        self.wait_for(|u| matches!(u, SessionUpdate::SendCompleted { .. }))
            .await
    }

    pub async fn wait_failed(&mut self) -> SessionUpdate {
        self.wait_for(|u| matches!(u, SessionUpdate::SendFailed { .. }))
            .await
    }

    pub async fn wait_migrated(&mut self) -> SessionUpdate {
        self.wait_for(|u| matches!(u, SessionUpdate::ThreadMigrated { .. }))
            .await
    }

    /// Wait until the active thread's list has been (re)loaded
    pub async fn wait_loaded(&mut self) -> SessionUpdate {
        self.wait_for(|u| matches!(u, SessionUpdate::MessagesLoaded { .. }))
            .await
    }
}

/// Store whose first few message fetches fail
pub struct FlakyHistory {
    inner: InMemoryPersistenceClient,
    failures: AtomicUsize,
}

impl FlakyHistory {
    pub fn new(inner: InMemoryPersistenceClient, failures: usize) -> Self {
        Self {
            inner,
            failures: AtomicUsize::new(failures),
        }
    }

    pub fn failures_left(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PersistenceClient for FlakyHistory {
    async fn create_thread(
        &self,
        document_id: &str,
        title: Option<String>,
    ) -> folio_persist::Result<Thread> {
        self.inner.create_thread(document_id, title).await
    }

    async fn get_thread(&self, thread_id: &str) -> folio_persist::Result<Option<Thread>> {
        self.inner.get_thread(thread_id).await
    }

    async fn list_threads(
        &self,
        document_id: &str,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> folio_persist::Result<ThreadList> {
        self.inner.list_threads(document_id, limit, offset).await
    }

    async fn rename_thread(&self, thread_id: &str, title: &str) -> folio_persist::Result<Thread> {
        self.inner.rename_thread(thread_id, title).await
    }

    async fn delete_thread(&self, thread_id: &str) -> folio_persist::Result<()> {
        self.inner.delete_thread(thread_id).await
    }

    async fn get_messages(
        &self,
        thread_id: &str,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> folio_persist::Result<MessageList> {
        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(PersistError::Status {
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        self.inner.get_messages(thread_id, limit, offset).await
    }
}

pub fn start(thread_id: &str) -> Result<StreamEvent> {
    Ok(StreamEvent::Start {
        thread_id: Some(thread_id.to_string()),
        title: Some("New Chat".to_string()),
    })
}

pub fn token(content: &str) -> Result<StreamEvent> {
    Ok(StreamEvent::token(content))
}

pub fn done() -> Result<StreamEvent> {
    Ok(StreamEvent::Done {
        thread_id: None,
        metadata: Some(serde_json::json!({ "pages": [2] })),
    })
}
