use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for a document chat session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Stream is treated as failed if no event arrives within this window
    pub idle_timeout: Duration,
    pub command_capacity: usize,
    /// Page size used for message history fetches
    pub history_page_size: u32,
    pub thread_list_limit: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(60),
            command_capacity: 1000,
            history_page_size: 100,
            thread_list_limit: 50,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn with_command_capacity(mut self, capacity: usize) -> Self {
        self.command_capacity = capacity;
        self
    }

    pub fn with_history_page_size(mut self, size: u32) -> Self {
        self.history_page_size = size;
        self
    }

    pub fn with_thread_list_limit(mut self, limit: u32) -> Self {
        self.thread_list_limit = limit;
        self
    }
}
