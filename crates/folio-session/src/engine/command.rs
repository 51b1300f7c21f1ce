use folio_persist::{DBMessage, ThreadList};
use folio_types::{ContextPin, StreamEvent, Thread, ThreadId};
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::error::Result;
use crate::update::{FailureReason, SendReceipt, SessionSnapshot, SwitchOutcome};

pub(crate) type Reply<T> = oneshot::Sender<Result<T>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HistoryPurpose {
    /// First load of a thread not in the cache
    Cold,
    /// Replace local copies with the server's after a send on a real thread
    Reconcile,
}

/// Everything the session actor reacts to, from callers and from its own tasks
pub(crate) enum Command {
    StartSession {
        reply: Reply<Vec<Thread>>,
    },
    SendMessage {
        text: String,
        reply: Reply<SendReceipt>,
    },
    SwitchThread {
        target: ThreadId,
        reply: Reply<SwitchOutcome>,
    },
    NewThread {
        reply: Reply<ThreadId>,
    },
    DeleteThread {
        thread: ThreadId,
        reply: Reply<Option<ThreadId>>,
    },
    RenameThread {
        thread_id: String,
        title: String,
        reply: Reply<Thread>,
    },
    RefreshThreads {
        reply: Option<Reply<Vec<Thread>>>,
    },
    AddPin {
        text: String,
        page: u32,
        reply: oneshot::Sender<ContextPin>,
    },
    RemovePin {
        id: Uuid,
        reply: oneshot::Sender<bool>,
    },
    SetPageContext {
        page: Option<u32>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },

    // Completions of background work
    StreamEvent {
        send_id: Uuid,
        event: StreamEvent,
    },
    StreamFailed {
        send_id: Uuid,
        reason: FailureReason,
        message: String,
    },
    HistoryLoaded {
        thread: ThreadId,
        revision: u64,
        purpose: HistoryPurpose,
        result: folio_persist::Result<Vec<DBMessage>>,
    },
    ThreadsLoaded {
        result: folio_persist::Result<ThreadList>,
        reply: Option<Reply<Vec<Thread>>>,
    },
    DeleteConfirmed {
        thread_id: String,
        result: folio_persist::Result<()>,
        reply: Reply<Option<ThreadId>>,
    },
    Renamed {
        result: folio_persist::Result<Thread>,
        reply: Reply<Thread>,
    },
}
