use anyhow::Result;
use async_trait::async_trait;
use folio_types::{QueryRequest, StreamEvent};
use futures::Stream;
use std::pin::Pin;

/// Decoded events of one streamed response, in arrival order
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// Retrieval/LLM backend answering one query with a streamed response
///
/// An `Err` from `stream_query` means no event was ever produced (network
/// failure or non-success status). `Err` items inside the stream are
/// transport failures after the response started.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn stream_query(&self, request: QueryRequest) -> Result<EventStream>;
}
