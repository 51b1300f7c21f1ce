use folio_persist::{DBMessage, PersistenceClient, ThreadList};
use folio_stream::ChatBackend;
use folio_types::{Message, MessageId, QueryRequest, SessionConfig, StreamEvent, Thread, ThreadId};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::command::{Command, HistoryPurpose, Reply};
use super::stream::forward_stream;
use crate::accumulator::StreamAccumulator;
use crate::cache::MessageCache;
use crate::error::{Result, SessionError};
use crate::lifecycle::{LifecycleError, NewThreadPlan, ThreadLifecycle};
use crate::pins::ContextPinStore;
use crate::update::{
    FailureReason, LoadSource, SendReceipt, SessionSnapshot, SessionUpdate, SwitchOutcome,
};

/// One send whose response has not finished
struct InFlightSend {
    thread: ThreadId,
    optimistic_id: MessageId,
    accumulator: StreamAccumulator,
    /// Sends on a real thread are followed by a history reconciliation
    reconcile: bool,
    task: JoinHandle<()>,
}

/// Single owner of all session state
///
/// Commands from handles and completions from background tasks share one
/// queue, so every mutation is applied in a single total order.
pub(crate) struct SessionActor {
    document_id: String,
    config: SessionConfig,
    backend: Arc<dyn ChatBackend>,
    persistence: Arc<dyn PersistenceClient>,
    cache: MessageCache,
    lifecycle: ThreadLifecycle,
    pins: ContextPinStore,
    /// Live message list of the active thread
    view: Vec<Message>,
    threads: Vec<Thread>,
    page_context: Option<u32>,
    in_flight: HashMap<Uuid, InFlightSend>,
    /// Bumped on every local mutation of a thread's messages
    revisions: HashMap<ThreadId, u64>,
    /// Real threads whose history has not loaded yet (pending or failed)
    unloaded: HashSet<ThreadId>,
    deferred_switch: Option<Reply<SwitchOutcome>>,
    commands: mpsc::WeakSender<Command>,
    updates: mpsc::UnboundedSender<SessionUpdate>,
}

impl SessionActor {
    pub(crate) fn new(
        document_id: String,
        config: SessionConfig,
        backend: Arc<dyn ChatBackend>,
        persistence: Arc<dyn PersistenceClient>,
        cache: MessageCache,
        commands: mpsc::WeakSender<Command>,
        updates: mpsc::UnboundedSender<SessionUpdate>,
    ) -> Self {
        Self {
            document_id,
            config,
            backend,
            persistence,
            lifecycle: ThreadLifecycle::new(cache.clone()),
            cache,
            pins: ContextPinStore::new(),
            view: Vec::new(),
            threads: Vec::new(),
            page_context: None,
            in_flight: HashMap::new(),
            revisions: HashMap::new(),
            unloaded: HashSet::new(),
            deferred_switch: None,
            commands,
            updates,
        }
    }

    pub(crate) async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        tracing::info!(document_id = %self.document_id, "Session started");

        while let Some(command) = commands.recv().await {
            self.handle(command).await;
        }

        for send in self.in_flight.values() {
            send.task.abort();
        }
        tracing::info!(document_id = %self.document_id, "Session closed");
    }

    async fn handle(&mut self, command: Command) {
        match command {
            Command::StartSession { reply } => self.start_session(reply).await,
            Command::SendMessage { text, reply } => {
                let result = self.send_message(text).await;
                let _ = reply.send(result);
            }
            Command::SwitchThread { target, reply } => self.switch_thread(target, reply).await,
            Command::NewThread { reply } => {
                let result = self.new_thread().await;
                let _ = reply.send(result);
            }
            Command::DeleteThread { thread, reply } => self.delete_thread(thread, reply).await,
            Command::RenameThread {
                thread_id,
                title,
                reply,
            } => self.rename_thread(thread_id, title, reply),
            Command::RefreshThreads { reply } => self.refresh_threads(reply),
            Command::AddPin { text, page, reply } => {
                let pin = self.pins.add(text, page);
                self.publish_pins();
                let _ = reply.send(pin);
            }
            Command::RemovePin { id, reply } => {
                let removed = self.pins.remove(id).is_some();
                if removed {
                    self.publish_pins();
                }
                let _ = reply.send(removed);
            }
            Command::SetPageContext { page } => {
                tracing::debug!(?page, "Page context updated");
                self.page_context = page;
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
            Command::StreamEvent { send_id, event } => self.on_stream_event(send_id, event).await,
            Command::StreamFailed {
                send_id,
                reason,
                message,
            } => self.fail_send(send_id, reason, message).await,
            Command::HistoryLoaded {
                thread,
                revision,
                purpose,
                result,
            } => self.on_history_loaded(thread, revision, purpose, result).await,
            Command::ThreadsLoaded { result, reply } => self.on_threads_loaded(result, reply).await,
            Command::DeleteConfirmed {
                thread_id,
                result,
                reply,
            } => self.on_delete_confirmed(thread_id, result, reply).await,
            Command::Renamed { result, reply } => self.on_renamed(result, reply).await,
        }
    }

    // ---- session & threads ----

    async fn start_session(&mut self, reply: Reply<Vec<Thread>>) {
        let was_idle = self.lifecycle.active().is_none();
        let active = self.lifecycle.start_session();
        if was_idle {
            self.load_view(&active).await;
        }
        self.refresh_threads(Some(reply));
    }

    fn refresh_threads(&self, reply: Option<Reply<Vec<Thread>>>) {
        let persistence = Arc::clone(&self.persistence);
        let document_id = self.document_id.clone();
        let limit = self.config.thread_list_limit;

        self.spawn_followup(async move {
            let result = persistence.list_threads(&document_id, Some(limit), None).await;
            Command::ThreadsLoaded { result, reply }
        });
    }

    async fn on_threads_loaded(
        &mut self,
        result: folio_persist::Result<ThreadList>,
        reply: Option<Reply<Vec<Thread>>>,
    ) {
        let outcome = match result {
            Ok(list) => {
                let mut threads = list.threads;
                // The listing may predate a thread acknowledged during this session
                for local in &self.threads {
                    let known = threads.iter().any(|t| t.id == local.id);
                    if !known && self.cache.contains(&ThreadId::from(local)).await {
                        threads.push(local.clone());
                    }
                }
                threads.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
                self.threads = threads;
                self.publish_threads();
                Ok(self.threads.clone())
            }
            Err(e) => {
                tracing::warn!("Failed to list threads: {}", e);
                Err(SessionError::from(e))
            }
        };

        if let Some(reply) = reply {
            let _ = reply.send(outcome);
        }
    }

    fn rename_thread(&self, thread_id: String, title: String, reply: Reply<Thread>) {
        let persistence = Arc::clone(&self.persistence);
        self.spawn_followup(async move {
            let result = persistence.rename_thread(&thread_id, &title).await;
            Command::Renamed { result, reply }
        });
    }

    async fn on_renamed(&mut self, result: folio_persist::Result<Thread>, reply: Reply<Thread>) {
        match result {
            Ok(thread) => {
                if let Some(title) = thread.title.clone() {
                    self.apply_title(&thread.id, title).await;
                }
                let _ = reply.send(Ok(thread));
            }
            Err(e) => {
                let _ = reply.send(Err(e.into()));
            }
        }
    }

    async fn apply_title(&mut self, thread_id: &str, title: String) {
        let Some(thread) = self.threads.iter_mut().find(|t| t.id == thread_id) else {
            return;
        };
        if thread.title.as_deref() != Some(title.as_str()) {
            thread.title = Some(title);
            self.publish_threads();
        }
    }

    async fn new_thread(&mut self) -> Result<ThreadId> {
        let plan = match self.lifecycle.new_thread() {
            Ok(plan) => plan,
            Err(LifecycleError::SwitchInProgress) => return Err(SessionError::SwitchInProgress),
            Err(e) => return Err(e.into()),
        };

        match plan {
            NewThreadPlan::Reuse => Ok(ThreadId::Pending),
            NewThreadPlan::Create => {
                self.load_view(&ThreadId::Pending).await;
                Ok(ThreadId::Pending)
            }
            NewThreadPlan::SwitchFrom(_) => {
                let from = self.lifecycle.begin_switch(ThreadId::Pending);
                Ok(self.finish_switch(from).await?.thread)
            }
        }
    }

    // ---- switching ----

    async fn switch_thread(&mut self, target: ThreadId, reply: Reply<SwitchOutcome>) {
        let active = self.lifecycle.active();

        if self.lifecycle.is_switching() && active.as_ref() == Some(&target) {
            // Switching back to the thread still on screen cancels the deferred switch
            if let Some(earlier) = self.deferred_switch.take() {
                let _ = earlier.send(Err(SessionError::SwitchSuperseded));
            }
            let _ = self.lifecycle.cancel_switch();
            let _ = reply.send(Ok(SwitchOutcome {
                thread: target,
                source: LoadSource::AlreadyActive,
            }));
            return;
        }

        if active.as_ref() == Some(&target) {
            let _ = reply.send(Ok(SwitchOutcome {
                thread: target,
                source: LoadSource::AlreadyActive,
            }));
            return;
        }

        if self.awaiting_identity() {
            if let Some(earlier) = self.deferred_switch.take() {
                let _ = earlier.send(Err(SessionError::SwitchSuperseded));
            }
            tracing::info!("Deferring switch to {} until the new thread is saved", target);
            self.lifecycle.begin_switch(target);
            self.deferred_switch = Some(reply);
            return;
        }

        let from = self.lifecycle.begin_switch(target);
        let result = self.finish_switch(from).await;
        let _ = reply.send(result);
    }

    /// Flush the view into the thread being left, then load the target
    async fn finish_switch(&mut self, from: Option<ThreadId>) -> Result<SwitchOutcome> {
        if let Some(from) = from {
            let view = std::mem::take(&mut self.view);
            self.cache.put(from, view).await;
        }

        let target = self.lifecycle.complete_switch()?;
        let source = self.load_view(&target).await;
        tracing::info!("Switched to thread {} ({:?})", target, source);

        Ok(SwitchOutcome {
            thread: target,
            source,
        })
    }

    async fn resume_deferred_switch(&mut self) {
        if self.deferred_switch.is_none() || self.awaiting_identity() {
            return;
        }
        let Some(reply) = self.deferred_switch.take() else {
            return;
        };

        let from = self.lifecycle.active();
        let result = self.finish_switch(from).await;
        let _ = reply.send(result);
    }

    /// Make `thread` the view, from cache if present, else from history
    ///
    /// A cached slot whose history never loaded only holds local messages,
    /// so the history fetch is retried.
    async fn load_view(&mut self, thread: &ThreadId) -> LoadSource {
        let cached = self.cache.entry(thread).await;
        let source = match (cached, thread.as_real()) {
            (Some(messages), _) if !self.unloaded.contains(thread) => {
                self.view = messages;
                LoadSource::Cache
            }
            (cached, Some(_)) => {
                self.view = cached.unwrap_or_default();
                self.unloaded.insert(thread.clone());
                self.load_history(thread.clone(), HistoryPurpose::Cold);
                LoadSource::History
            }
            (cached, None) => {
                self.view = cached.unwrap_or_default();
                LoadSource::Empty
            }
        };

        self.publish(SessionUpdate::ActiveThreadChanged {
            thread: thread.clone(),
        });
        self.publish(SessionUpdate::MessagesLoaded {
            thread: thread.clone(),
            messages: self.view.clone(),
        });

        source
    }

    // ---- deletion ----

    async fn delete_thread(&mut self, thread: ThreadId, reply: Reply<Option<ThreadId>>) {
        if self.lifecycle.is_switching() {
            let _ = reply.send(Err(SessionError::SwitchInProgress));
            return;
        }

        match thread {
            ThreadId::Pending => {
                // Never reached the server: purely local
                let active = self.forget_thread(&ThreadId::Pending).await;
                let _ = reply.send(Ok(active));
            }
            ThreadId::Real(thread_id) => {
                let persistence = Arc::clone(&self.persistence);
                self.spawn_followup(async move {
                    let result = persistence.delete_thread(&thread_id).await;
                    Command::DeleteConfirmed {
                        thread_id,
                        result,
                        reply,
                    }
                });
            }
        }
    }

    async fn on_delete_confirmed(
        &mut self,
        thread_id: String,
        result: folio_persist::Result<()>,
        reply: Reply<Option<ThreadId>>,
    ) {
        if let Err(e) = result {
            tracing::warn!("Failed to delete thread {}: {}", thread_id, e);
            let _ = reply.send(Err(e.into()));
            return;
        }

        self.threads.retain(|t| t.id != thread_id);
        let active = self.forget_thread(&ThreadId::Real(thread_id)).await;
        self.publish_threads();
        let _ = reply.send(Ok(active));
    }

    /// Drop every local trace of a thread, rehoming if it was active
    async fn forget_thread(&mut self, thread: &ThreadId) -> Option<ThreadId> {
        let streaming: Vec<Uuid> = self
            .in_flight
            .iter()
            .filter(|(_, send)| &send.thread == thread)
            .map(|(id, _)| *id)
            .collect();
        for send_id in streaming {
            self.fail_send(send_id, FailureReason::Cancelled, "Thread was deleted".to_string())
                .await;
        }

        if self.lifecycle.switch_target() == Some(thread) {
            if let Some(deferred) = self.deferred_switch.take() {
                let _ = deferred.send(Err(SessionError::ThreadGone(thread.clone())));
            }
            let _ = self.lifecycle.cancel_switch();
        }

        self.cache.evict(thread).await;
        self.revisions.remove(thread);
        self.unloaded.remove(thread);

        if self.lifecycle.active().as_ref() == Some(thread) {
            self.view.clear();
            let next = self.lifecycle.rehome(&self.threads);
            self.load_view(&next).await;
        }

        tracing::info!("Deleted thread {}", thread);
        self.publish(SessionUpdate::ThreadDeleted {
            thread: thread.clone(),
        });

        self.lifecycle.active()
    }

    // ---- sending ----

    async fn send_message(&mut self, text: String) -> Result<SendReceipt> {
        let query = text.trim();
        if query.is_empty() {
            return Err(SessionError::EmptyMessage);
        }
        if self.lifecycle.is_switching() {
            return Err(SessionError::SwitchInProgress);
        }

        let thread = match self.lifecycle.active() {
            Some(thread) => thread,
            None => {
                let thread = self.lifecycle.start_session();
                self.load_view(&thread).await;
                thread
            }
        };
        if self.in_flight.values().any(|s| s.thread == thread) {
            return Err(SessionError::SendInFlight(thread));
        }

        let contexts = self.pins.highlight_contexts();
        let request = QueryRequest::new(self.document_id.as_str(), query)
            .with_page_context(self.page_context)
            .with_highlight_contexts(contexts.clone())
            .with_thread_id(thread.as_real().map(str::to_string));
        let optimistic = Message::optimistic_user(thread.clone(), query, &contexts);

        let send_id = Uuid::new_v4();
        let task = self.spawn_stream(send_id, request)?;

        self.with_messages(&thread, |messages| messages.push(optimistic.clone()))
            .await;
        self.in_flight.insert(
            send_id,
            InFlightSend {
                thread: thread.clone(),
                optimistic_id: optimistic.id.clone(),
                accumulator: StreamAccumulator::new(thread.clone()),
                reconcile: !thread.is_pending(),
                task,
            },
        );

        tracing::info!(
            %send_id,
            thread = %thread,
            pins = contexts.len(),
            "Sending message"
        );
        self.publish(SessionUpdate::MessageAppended {
            thread: thread.clone(),
            message: optimistic.clone(),
        });

        Ok(SendReceipt {
            send_id,
            thread,
            message_id: optimistic.id,
        })
    }

    fn spawn_stream(&self, send_id: Uuid, request: QueryRequest) -> Result<JoinHandle<()>> {
        let commands = self.commands.upgrade().ok_or(SessionError::EngineStopped)?;
        let backend = Arc::clone(&self.backend);
        let idle_timeout = self.config.idle_timeout;

        Ok(tokio::spawn(async move {
            if let Err(failure) =
                forward_stream(backend, request, idle_timeout, send_id, &commands).await
            {
                let _ = commands
                    .send(Command::StreamFailed {
                        send_id,
                        reason: failure.reason,
                        message: failure.message,
                    })
                    .await;
            }
        }))
    }

    async fn on_stream_event(&mut self, send_id: Uuid, event: StreamEvent) {
        let Some(send) = self.in_flight.get_mut(&send_id) else {
            tracing::debug!(%send_id, "Ignoring event for a finished send");
            return;
        };

        match event {
            StreamEvent::Start { thread_id, title } => match (send.thread.clone(), thread_id) {
                (ThreadId::Pending, Some(real_id)) => {
                    self.acknowledge_thread(send_id, &real_id, title).await;
                }
                (ThreadId::Pending, None) => {
                    tracing::debug!(%send_id, "Stream started without a thread id");
                }
                (ThreadId::Real(thread_id), _) => {
                    if let Some(title) = title {
                        self.apply_title(&thread_id, title).await;
                    }
                }
            },
            StreamEvent::Token { content } => {
                let thread = send.thread.clone();
                let length = send.accumulator.push(&content).len();
                self.publish(SessionUpdate::StreamingContent {
                    thread,
                    delta: content,
                    length,
                });
            }
            StreamEvent::Done {
                thread_id,
                metadata,
            } => self.complete_send(send_id, thread_id, metadata).await,
            StreamEvent::Error { content } => {
                self.fail_send(send_id, FailureReason::Server, content).await
            }
        }
    }

    /// Migrate the pending thread to the id the server assigned
    ///
    /// Returns false (and fails the send) if local state cannot adopt it.
    async fn acknowledge_thread(
        &mut self,
        send_id: Uuid,
        real_id: &str,
        title: Option<String>,
    ) -> bool {
        let real = match self.lifecycle.migrate(real_id, &mut self.view).await {
            Ok(real) => real,
            Err(e) => {
                tracing::error!("Cannot adopt server thread {}: {}", real_id, e);
                self.fail_send(send_id, FailureReason::Internal, e.to_string())
                    .await;
                return false;
            }
        };

        if let Some(revision) = self.revisions.remove(&ThreadId::Pending) {
            self.revisions.insert(real.clone(), revision);
        }
        for send in self.in_flight.values_mut().filter(|s| s.thread.is_pending()) {
            send.thread = real.clone();
            send.accumulator.retag(&real);
        }

        if !self.threads.iter().any(|t| t.id == real_id) {
            self.threads.insert(
                0,
                Thread::acknowledged(real_id, self.document_id.as_str(), title.clone()),
            );
        }

        self.publish(SessionUpdate::ThreadMigrated {
            thread_id: real_id.to_string(),
            title,
        });
        self.publish_threads();
        self.resume_deferred_switch().await;
        true
    }

    async fn complete_send(
        &mut self,
        send_id: Uuid,
        thread_id: Option<String>,
        metadata: Option<serde_json::Value>,
    ) {
        let Some(pending) = self.in_flight.get(&send_id).map(|s| s.thread.is_pending()) else {
            return;
        };
        // Servers that omit the id on start may still report it on completion
        if let (true, Some(real_id)) = (pending, thread_id) {
            if !self.acknowledge_thread(send_id, &real_id, None).await {
                return;
            }
        }

        let Some(send) = self.in_flight.remove(&send_id) else {
            return;
        };
        let InFlightSend {
            thread,
            accumulator,
            reconcile,
            ..
        } = send;

        let message = accumulator.finalize(metadata);
        self.with_messages(&thread, |messages| messages.push(message.clone()))
            .await;

        let pins_cleared = self.pins.clear();
        tracing::info!(%send_id, thread = %thread, pins_cleared, "Response completed");

        self.publish(SessionUpdate::MessageAppended {
            thread: thread.clone(),
            message: message.clone(),
        });
        self.publish(SessionUpdate::SendCompleted {
            thread: thread.clone(),
            message,
        });
        if pins_cleared > 0 {
            self.publish_pins();
        }

        if reconcile {
            self.load_history(thread, HistoryPurpose::Reconcile);
        }
        self.resume_deferred_switch().await;
    }

    /// Roll back a send: its optimistic message is removed and pins are kept
    async fn fail_send(&mut self, send_id: Uuid, reason: FailureReason, message: String) {
        let Some(send) = self.in_flight.remove(&send_id) else {
            return;
        };
        send.task.abort();
        let InFlightSend {
            thread,
            optimistic_id,
            ..
        } = send;

        self.with_messages(&thread, |messages| {
            messages.retain(|m| m.id != optimistic_id)
        })
        .await;

        tracing::warn!(%send_id, thread = %thread, %reason, "Send failed: {}", message);
        self.publish(SessionUpdate::MessageRemoved {
            thread: thread.clone(),
            message_id: optimistic_id,
        });
        self.publish(SessionUpdate::SendFailed {
            thread,
            reason,
            message,
        });

        self.resume_deferred_switch().await;
    }

    // ---- history ----

    fn load_history(&self, thread: ThreadId, purpose: HistoryPurpose) {
        let Some(thread_id) = thread.as_real().map(str::to_string) else {
            return;
        };
        let revision = self.revision(&thread);
        let persistence = Arc::clone(&self.persistence);
        let page_size = self.config.history_page_size;

        self.spawn_followup(async move {
            let result = persistence.fetch_history(&thread_id, page_size).await;
            Command::HistoryLoaded {
                thread,
                revision,
                purpose,
                result,
            }
        });
    }

    async fn on_history_loaded(
        &mut self,
        thread: ThreadId,
        revision: u64,
        purpose: HistoryPurpose,
        result: folio_persist::Result<Vec<DBMessage>>,
    ) {
        let history: Vec<Message> = match result {
            Ok(messages) => messages.into_iter().map(Message::from).collect(),
            Err(e) => {
                tracing::warn!("Failed to load history for {}: {}", thread, e);
                return;
            }
        };

        let is_active = self.lifecycle.active().as_ref() == Some(&thread);
        if !is_active && !self.cache.contains(&thread).await {
            tracing::debug!("Dropping history for untracked thread {}", thread);
            return;
        }
        if purpose == HistoryPurpose::Cold {
            self.unloaded.remove(&thread);
        }

        let unchanged = self.revision(&thread) == revision;
        let messages = match purpose {
            HistoryPurpose::Reconcile => {
                let streaming = self.in_flight.values().any(|s| s.thread == thread);
                if !unchanged || streaming {
                    tracing::debug!("Discarding stale reconciliation for {}", thread);
                    return;
                }
                history
            }
            HistoryPurpose::Cold if unchanged => history,
            HistoryPurpose::Cold => {
                let local = if is_active {
                    self.view.clone()
                } else {
                    self.cache.get(&thread).await
                };
                merge_history(history, local)
            }
        };

        tracing::debug!(
            thread = %thread,
            ?purpose,
            count = messages.len(),
            "History applied"
        );
        self.with_messages(&thread, |current| *current = messages.clone())
            .await;
        if is_active {
            self.publish(SessionUpdate::MessagesLoaded { thread, messages });
        }
    }

    // ---- plumbing ----

    /// Apply `f` to a thread's live list: the view if active, else its cache slot
    async fn with_messages<F, R>(&mut self, thread: &ThreadId, f: F) -> R
    where
        F: FnOnce(&mut Vec<Message>) -> R,
    {
        *self.revisions.entry(thread.clone()).or_insert(0) += 1;

        if self.lifecycle.active().as_ref() == Some(thread) {
            f(&mut self.view)
        } else {
            self.cache.update(thread, f).await
        }
    }

    fn revision(&self, thread: &ThreadId) -> u64 {
        self.revisions.get(thread).copied().unwrap_or(0)
    }

    /// A send on the pending thread has not yet learned its server id
    fn awaiting_identity(&self) -> bool {
        self.in_flight.values().any(|s| s.thread.is_pending())
    }

    fn spawn_followup<F>(&self, task: F)
    where
        F: Future<Output = Command> + Send + 'static,
    {
        let Some(commands) = self.commands.upgrade() else {
            tracing::debug!("Session closing; background task not started");
            return;
        };
        tokio::spawn(async move {
            let command = task.await;
            let _ = commands.send(command).await;
        });
    }

    fn snapshot(&self) -> SessionSnapshot {
        let active = self.lifecycle.active();
        let streaming = active.as_ref().and_then(|thread| {
            self.in_flight
                .values()
                .find(|s| &s.thread == thread)
                .map(|s| s.accumulator.content().to_string())
        });

        SessionSnapshot {
            document_id: self.document_id.clone(),
            state: self.lifecycle.state().clone(),
            active,
            messages: self.view.clone(),
            streaming,
            pins: self.pins.list().to_vec(),
            threads: self.threads.clone(),
            page_context: self.page_context,
        }
    }

    /// The updates channel is unbounded; the actor never waits on its consumer
    fn publish(&self, update: SessionUpdate) {
        if self.updates.send(update).is_err() {
            tracing::trace!("No subscriber for session updates");
        }
    }

    fn publish_threads(&self) {
        self.publish(SessionUpdate::ThreadsChanged {
            threads: self.threads.clone(),
        });
    }

    fn publish_pins(&self) {
        self.publish(SessionUpdate::PinsChanged {
            pins: self.pins.list().to_vec(),
        });
    }
}

/// Combine a cold-loaded history with messages added locally meanwhile
///
/// Only history older than the earliest local message is kept, so nothing
/// appended locally is dropped or duplicated.
fn merge_history(history: Vec<Message>, local: Vec<Message>) -> Vec<Message> {
    let Some(earliest) = local.iter().map(|m| m.created_at).min() else {
        return history;
    };

    let mut merged: Vec<Message> = history
        .into_iter()
        .filter(|m| m.created_at < earliest && !local.iter().any(|l| l.id == m.id))
        .collect();
    merged.extend(local);
    merged
}
