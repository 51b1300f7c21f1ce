use chrono::{DateTime, Utc};
use folio_types::{Message, MessageId, MessageRole, ThreadId};
use serde::{Deserialize, Serialize};

/// Durable message record as stored by the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DBMessage {
    pub id: String,
    pub thread_id: String,
    pub role: MessageRole,
    pub content: String,
    #[serde(default)]
    pub tokens_prompt: Option<u32>,
    #[serde(default)]
    pub tokens_completion: Option<u32>,
    #[serde(default, alias = "message_metadata")]
    pub metadata: Option<serde_json::Value>,
    #[serde(deserialize_with = "folio_types::timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

impl DBMessage {
    pub fn new(thread_id: impl Into<String>, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            thread_id: thread_id.into(),
            role,
            content: content.into(),
            tokens_prompt: None,
            tokens_completion: None,
            metadata: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

// Conversion: DBMessage → session Message (durable id)
impl From<DBMessage> for Message {
    fn from(msg: DBMessage) -> Self {
        Message {
            id: MessageId::Durable(msg.id),
            thread_id: ThreadId::Real(msg.thread_id),
            role: msg.role,
            content: msg.content,
            metadata: msg.metadata,
            created_at: msg.created_at,
        }
    }
}
