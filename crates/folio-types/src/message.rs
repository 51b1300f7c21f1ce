use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pin::HighlightContext;
use crate::thread::ThreadId;

/// Message identity: temporary until the server's copy supersedes it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum MessageId {
    Temp(Uuid),
    Durable(String),
}

impl MessageId {
    pub fn temp() -> Self {
        Self::Temp(Uuid::new_v4())
    }

    pub fn is_temp(&self) -> bool {
        matches!(self, MessageId::Temp(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A single entry in a thread's conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub thread_id: ThreadId,
    pub role: MessageRole,
    pub content: String,
    /// Opaque backend metadata (referenced pages) or pinned-context echoes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Locally-synthesized user message shown before the server confirms it
    pub fn optimistic_user(
        thread_id: ThreadId,
        content: impl Into<String>,
        pinned: &[HighlightContext],
    ) -> Self {
        let metadata = if pinned.is_empty() {
            None
        } else {
            Some(serde_json::json!({ "highlight_contexts": pinned }))
        };

        Self {
            id: MessageId::temp(),
            thread_id,
            role: MessageRole::User,
            content: content.into(),
            metadata,
            created_at: Utc::now(),
        }
    }

    /// Assistant message finalized from a completed stream
    pub fn assistant(
        thread_id: ThreadId,
        content: impl Into<String>,
        metadata: Option<serde_json::Value>,
    ) -> Self {
        Self {
            id: MessageId::temp(),
            thread_id,
            role: MessageRole::Assistant,
            content: content.into(),
            metadata,
            created_at: Utc::now(),
        }
    }

    /// Point this message at a new thread identity
    pub fn retag(&mut self, thread_id: &ThreadId) {
        self.thread_id = thread_id.clone();
    }

    /// Page numbers the backend reported as sources for this answer
    pub fn referenced_pages(&self) -> Vec<u32> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("pages"))
            .and_then(|p| p.as_array())
            .map(|pages| {
                pages
                    .iter()
                    .filter_map(|p| p.as_u64())
                    .filter_map(|p| u32::try_from(p).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Excerpts that were attached to this message when it was sent
    pub fn pinned_contexts(&self) -> Vec<HighlightContext> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("highlight_contexts"))
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }
}
