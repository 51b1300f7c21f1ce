// HTTP client for the document chat backend

use crate::decoder::decode_stream;
use crate::traits::{ChatBackend, EventStream};
use anyhow::{Context, Result};
use async_trait::async_trait;
use folio_types::QueryRequest;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Method;
use std::time::Duration;

const DEFAULT_API_BASE: &str = "http://localhost:8000/v1";

/// Streams answers from the backend over HTTP
pub struct HttpChatBackend {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpChatBackend {
    /// Create new client against the given API base (e.g. `http://host/v1`)
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));

        // No overall request timeout: a response may stream for minutes.
        // Idle detection belongs to the session.
        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self::with_client(http_client, base_url))
    }

    /// Use a preconfigured reqwest client
    pub fn with_client(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// First message of a new thread is a `POST` to `start-chat`, which
    /// creates the thread and reports its id in the `start` event. Later
    /// messages `GET` the thread's stream.
    fn endpoint(&self, request: &QueryRequest) -> (Method, String) {
        match &request.thread_id {
            Some(thread_id) => (
                Method::GET,
                format!("{}/threads/{}/stream", self.base_url, thread_id),
            ),
            None => (
                Method::POST,
                format!("{}/threads/start-chat", self.base_url),
            ),
        }
    }
}

/// The backend takes the query as URL parameters
///
/// Pinned excerpts travel as one JSON-encoded `highlight_contexts` parameter.
fn query_params(request: &QueryRequest) -> Result<Vec<(&'static str, String)>> {
    let mut params = Vec::with_capacity(4);
    if request.thread_id.is_none() {
        params.push(("document_id", request.document_id.clone()));
    }
    params.push(("query", request.query.clone()));
    if let Some(page) = request.page_context {
        params.push(("page_context", page.to_string()));
    }
    if let Some(contexts) = &request.highlight_contexts {
        let encoded =
            serde_json::to_string(contexts).context("Failed to encode highlight contexts")?;
        params.push(("highlight_contexts", encoded));
    }
    Ok(params)
}

impl Default for HttpChatBackend {
    fn default() -> Self {
        Self::with_client(reqwest::Client::new(), DEFAULT_API_BASE)
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn stream_query(&self, request: QueryRequest) -> Result<EventStream> {
        let (method, url) = self.endpoint(&request);
        let params = query_params(&request)?;
        tracing::debug!(
            %method,
            url = %url,
            pins = request.highlight_contexts.as_ref().map_or(0, |c| c.len()),
            "Opening response stream"
        );

        let response = self
            .http_client
            .request(method, &url)
            .query(&params)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Backend error ({}): {}", status, error_text);
        }

        Ok(decode_stream(response.bytes_stream()))
    }
}
