use folio_types::{ContextPin, Message, MessageId, Thread, ThreadId};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use crate::lifecycle::LifecycleState;

/// Why a send did not produce an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Connection failed or the stream broke off
    Transport,
    /// Backend reported an error event
    Server,
    /// No event arrived within the idle window
    Timeout,
    /// Thread was deleted while the response streamed
    Cancelled,
    /// Local state could not be reconciled with the server identity
    Internal,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureReason::Transport => "connection error",
            FailureReason::Server => "server error",
            FailureReason::Timeout => "timed out",
            FailureReason::Cancelled => "cancelled",
            FailureReason::Internal => "internal error",
        };
        f.write_str(label)
    }
}

/// Notifications pushed to the presentation layer, in the order they happen
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    ActiveThreadChanged { thread: ThreadId },
    /// Full list for a thread (after a switch, cold load or reconciliation)
    MessagesLoaded { thread: ThreadId, messages: Vec<Message> },
    MessageAppended { thread: ThreadId, message: Message },
    MessageRemoved { thread: ThreadId, message_id: MessageId },
    /// Next fragment of an in-flight response; `length` is the byte length
    /// of everything streamed so far, including `delta`
    StreamingContent {
        thread: ThreadId,
        delta: String,
        length: usize,
    },
    ThreadMigrated { thread_id: String, title: Option<String> },
    SendCompleted { thread: ThreadId, message: Message },
    SendFailed { thread: ThreadId, reason: FailureReason, message: String },
    ThreadDeleted { thread: ThreadId },
    ThreadsChanged { threads: Vec<Thread> },
    PinsChanged { pins: Vec<ContextPin> },
}

/// Returned once a send has been accepted and its stream opened
#[derive(Debug, Clone, PartialEq)]
pub struct SendReceipt {
    pub send_id: Uuid,
    pub thread: ThreadId,
    pub message_id: MessageId,
}

/// Where a switched-to thread's messages came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    AlreadyActive,
    Cache,
    /// Shown empty; history is being fetched
    History,
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchOutcome {
    pub thread: ThreadId,
    pub source: LoadSource,
}

/// Point-in-time view of the session for rendering
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub document_id: String,
    pub state: LifecycleState,
    pub active: Option<ThreadId>,
    pub messages: Vec<Message>,
    /// Partial answer of the active thread's in-flight response
    pub streaming: Option<String>,
    pub pins: Vec<ContextPin>,
    pub threads: Vec<Thread>,
    pub page_context: Option<u32>,
}

impl SessionSnapshot {
    pub fn is_streaming(&self) -> bool {
        self.streaming.is_some()
    }

    pub fn active_thread(&self) -> Option<&Thread> {
        let id = self.active.as_ref()?.as_real()?;
        self.threads.iter().find(|t| t.id == id)
    }
}
