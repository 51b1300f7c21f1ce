use folio_types::{Message, ThreadId};
use std::time::Instant;

/// Buffers token events of one in-flight response
///
/// Tokens are appended in arrival order; `finalize` turns the buffer into
/// the assistant message once the stream reports completion.
pub struct StreamAccumulator {
    thread_id: ThreadId,
    buffer: String,
    tokens: usize,
    started_at: Instant,
    first_token_at: Option<Instant>,
}

impl StreamAccumulator {
    pub fn new(thread_id: ThreadId) -> Self {
        Self {
            thread_id,
            buffer: String::new(),
            tokens: 0,
            started_at: Instant::now(),
            first_token_at: None,
        }
    }

    /// Append a fragment and return the content accumulated so far
    pub fn push(&mut self, fragment: &str) -> &str {
        if self.first_token_at.is_none() {
            self.first_token_at = Some(Instant::now());
        }
        self.tokens += 1;
        self.buffer.push_str(fragment);
        &self.buffer
    }

    pub fn content(&self) -> &str {
        &self.buffer
    }

    pub fn token_count(&self) -> usize {
        self.tokens
    }

    pub fn thread_id(&self) -> &ThreadId {
        &self.thread_id
    }

    /// Follow the thread to its server identity
    pub fn retag(&mut self, thread_id: &ThreadId) {
        self.thread_id = thread_id.clone();
    }

    /// Milliseconds between the send and the first token, if one arrived
    pub fn first_token_ms(&self) -> Option<u64> {
        self.first_token_at
            .map(|t| t.duration_since(self.started_at).as_millis() as u64)
    }

    /// Called once the stream is done
    pub fn finalize(self, metadata: Option<serde_json::Value>) -> Message {
        tracing::debug!(
            thread = %self.thread_id,
            tokens = self.tokens,
            first_token_ms = ?self.first_token_ms(),
            duration_ms = self.started_at.elapsed().as_millis() as u64,
            "Finalizing assistant response"
        );
        Message::assistant(self.thread_id, self.buffer, metadata)
    }
}
