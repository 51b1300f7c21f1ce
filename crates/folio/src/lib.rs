//! # Folio
//!
//! Streaming chat over a document: ask questions, pin excerpts, and keep
//! every conversation as a durable thread.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use folio::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = Arc::new(HttpChatBackend::new("http://localhost:8000/v1")?);
//!     let persistence = Arc::new(
//!         HttpPersistenceClientBuilder::new()
//!             .base_url("http://localhost:8000/v1")
//!             .build()?,
//!     );
//!
//!     let engine = SessionEngine::new(backend, persistence, SessionConfig::default());
//!     let (session, mut updates) = engine.spawn("paper-42");
//!     session.start_session().await?;
//!
//!     session.add_pin("We observe a 3x speedup", 7).await?;
//!     session.send_message("Where does the speedup come from?").await?;
//!
//!     while let Some(update) = updates.recv().await {
//!         match update {
//!             SessionUpdate::StreamingContent { delta, .. } => print!("{}", delta),
//!             SessionUpdate::SendCompleted { .. } | SessionUpdate::SendFailed { .. } => break,
//!             _ => {}
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`folio-types`**: threads, messages, pins and wire events
//! - **`folio-stream`**: chunked event-stream decoding and the chat backend client
//! - **`folio-persist`**: thread and message storage (HTTP API or in-memory)
//! - **`folio-session`**: the session engine tying them together
//!
//! ## License
//!
//! MIT

pub mod prelude;

pub use folio_types::{
    ContextPin, HighlightContext, Message, MessageId, MessageRole, QueryRequest, SessionConfig,
    StreamEvent, Thread, ThreadId,
};

pub use folio_stream::{
    decode_stream, ChatBackend, EventStream, HttpChatBackend, StreamDecoder,
};

pub use folio_persist::{
    DBMessage, HttpPersistenceClient, HttpPersistenceClientBuilder, InMemoryPersistenceClient,
    MessageList, PersistError, PersistenceClient, ThreadList,
};

pub use folio_session::{
    FailureReason, LifecycleState, LoadSource, MessageCache, SendReceipt, SessionEngine,
    SessionError, SessionHandle, SessionSnapshot, SessionUpdate, SwitchOutcome,
};
