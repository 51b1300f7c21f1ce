use serde::{Deserialize, Serialize};

use crate::pin::HighlightContext;

/// Payload accepted by the retrieval/LLM backend for one send
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub document_id: String,
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_context: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_contexts: Option<Vec<HighlightContext>>,
    /// Absent for a thread the server has not created yet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

impl QueryRequest {
    pub fn new(document_id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            query: query.into(),
            page_context: None,
            highlight_contexts: None,
            thread_id: None,
        }
    }

    pub fn with_page_context(mut self, page: Option<u32>) -> Self {
        self.page_context = page;
        self
    }

    /// Attach pinned excerpts; an empty list is left off the wire
    pub fn with_highlight_contexts(mut self, contexts: Vec<HighlightContext>) -> Self {
        self.highlight_contexts = if contexts.is_empty() { None } else { Some(contexts) };
        self
    }

    pub fn with_thread_id(mut self, thread_id: Option<String>) -> Self {
        self.thread_id = thread_id;
        self
    }
}
