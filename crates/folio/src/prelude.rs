//! Prelude module for convenient imports
//!
//! ```rust
//! use folio::prelude::*;
//! ```

pub use crate::{
    ChatBackend, ContextPin, HttpChatBackend, HttpPersistenceClientBuilder,
    InMemoryPersistenceClient, Message, MessageRole, PersistenceClient, SessionConfig,
    SessionEngine, SessionHandle, SessionUpdate, StreamEvent, Thread, ThreadId,
};
