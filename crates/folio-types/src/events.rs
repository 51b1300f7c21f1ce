use serde::{Deserialize, Serialize};

/// One decoded record from the backend's response stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Response started; carries the server id when a thread was just created
    Start {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thread_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },

    /// Next fragment of the assistant answer
    Token {
        content: String,
    },

    /// Response completed
    Done {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thread_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<serde_json::Value>,
    },

    /// Server-side failure
    Error {
        content: String,
    },
}

impl StreamEvent {
    /// Whether no further events follow this one
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done { .. } | StreamEvent::Error { .. })
    }

    pub fn token(content: impl Into<String>) -> Self {
        Self::Token { content: content.into() }
    }
}
