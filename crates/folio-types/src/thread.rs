use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a conversation thread as seen by the session.
///
/// A thread starts out `Pending` (no server record yet) and becomes `Real`
/// exactly once, when the backend hands out its id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ThreadId {
    Pending,
    Real(String),
}

impl ThreadId {
    pub fn real(id: impl Into<String>) -> Self {
        Self::Real(id.into())
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ThreadId::Pending)
    }

    /// Server id, if the thread has one
    pub fn as_real(&self) -> Option<&str> {
        match self {
            ThreadId::Real(id) => Some(id.as_str()),
            ThreadId::Pending => None,
        }
    }

    /// Parse user input: `pending` selects the virtual thread, anything else is a server id
    pub fn parse(input: &str) -> Self {
        match input.trim() {
            "pending" => ThreadId::Pending,
            id => ThreadId::Real(id.to_string()),
        }
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreadId::Pending => write!(f, "pending"),
            ThreadId::Real(id) => write!(f, "{}", id),
        }
    }
}

impl From<&Thread> for ThreadId {
    fn from(thread: &Thread) -> Self {
        ThreadId::Real(thread.id.clone())
    }
}

/// Durable thread record as returned by the persistence API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub document_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(deserialize_with = "crate::timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "crate::timestamp::deserialize")]
    pub updated_at: DateTime<Utc>,
}

impl Thread {
    /// Local record for a thread the backend just created during a send
    pub fn acknowledged(
        id: impl Into<String>,
        document_id: impl Into<String>,
        title: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            document_id: document_id.into(),
            title,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("New Chat")
    }
}
