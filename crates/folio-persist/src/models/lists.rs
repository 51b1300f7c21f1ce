use folio_types::Thread;
use serde::{Deserialize, Serialize};

use super::DBMessage;

/// One page of a document's threads, newest activity first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreadList {
    pub threads: Vec<Thread>,
    pub total: u64,
}

/// One page of a thread's messages in creation order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageList {
    pub messages: Vec<DBMessage>,
    pub total: u64,
}
