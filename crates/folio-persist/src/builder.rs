use std::time::Duration;

use crate::error::{PersistError, Result};
use crate::HttpPersistenceClient;

pub struct HttpPersistenceClientBuilder {
    base_url: Option<String>,
    timeout: Duration,
    connect_timeout: Duration,
}

impl HttpPersistenceClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<HttpPersistenceClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| PersistError::Internal("base_url is required".to_string()))?;

        let http_client = reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .build()?;

        Ok(HttpPersistenceClient::new(http_client, base_url))
    }
}

impl Default for HttpPersistenceClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
