use async_trait::async_trait;
use folio_types::Thread;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::{PersistError, Result};
use crate::models::{MessageList, ThreadList};
use crate::trait_client::PersistenceClient;

/// REST client for the thread/message API
#[derive(Clone)]
pub struct HttpPersistenceClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpPersistenceClient {
    pub fn new(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn thread_url(&self, thread_id: &str) -> String {
        format!("{}/threads/{}", self.base_url, thread_id)
    }

    /// Map a non-success response to an error, 404 meaning the thread is gone
    async fn check(response: Response, thread_id: Option<&str>) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::NOT_FOUND {
            if let Some(id) = thread_id {
                return Err(PersistError::ThreadNotFound(id.to_string()));
            }
        }

        let body = response.text().await.unwrap_or_default();
        Err(PersistError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl PersistenceClient for HttpPersistenceClient {
    async fn create_thread(&self, document_id: &str, title: Option<String>) -> Result<Thread> {
        let response = self
            .http_client
            .post(format!("{}/threads", self.base_url))
            .json(&json!({ "document_id": document_id, "title": title }))
            .send()
            .await?;

        let thread: Thread = Self::parse(Self::check(response, None).await?).await?;
        tracing::info!(thread_id = %thread.id, document_id, "Created thread");
        Ok(thread)
    }

    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        let response = self.http_client.get(self.thread_url(thread_id)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let thread = Self::parse(Self::check(response, Some(thread_id)).await?).await?;
        Ok(Some(thread))
    }

    async fn list_threads(
        &self,
        document_id: &str,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<ThreadList> {
        let mut query = vec![("document_id", document_id.to_string())];
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(offset) = offset {
            query.push(("offset", offset.to_string()));
        }

        let response = self
            .http_client
            .get(format!("{}/threads", self.base_url))
            .query(&query)
            .send()
            .await?;

        Self::parse(Self::check(response, None).await?).await
    }

    async fn rename_thread(&self, thread_id: &str, title: &str) -> Result<Thread> {
        let response = self
            .http_client
            .patch(self.thread_url(thread_id))
            .query(&[("title", title)])
            .send()
            .await?;

        let thread = Self::parse(Self::check(response, Some(thread_id)).await?).await?;
        tracing::info!(thread_id, title, "Renamed thread");
        Ok(thread)
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        let response = self
            .http_client
            .delete(self.thread_url(thread_id))
            .send()
            .await?;

        Self::check(response, Some(thread_id)).await?;
        tracing::info!(thread_id, "Deleted thread");
        Ok(())
    }

    async fn get_messages(
        &self,
        thread_id: &str,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> Result<MessageList> {
        let mut query = Vec::new();
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(offset) = offset {
            query.push(("offset", offset.to_string()));
        }

        let response = self
            .http_client
            .get(format!("{}/messages", self.thread_url(thread_id)))
            .query(&query)
            .send()
            .await?;

        Self::parse(Self::check(response, Some(thread_id)).await?).await
    }
}
