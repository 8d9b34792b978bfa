//! HTTP client for the CSV source
//!
//! A single GET per run. Failures are returned as-is: there is no retry,
//! backoff or rate limiting, and no timeout unless one is configured.

use crate::error::{Error, Result};
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout (none by default)
    pub timeout: Option<Duration>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            user_agent: format!("video-etl/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// HTTP client used to fetch the source file
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, config })
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Make a GET request, failing on any non-success status
    pub async fn get(&self, url: &str) -> Result<Response> {
        let url = Url::parse(url)?;

        let response = self.client.get(url.as_str()).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), body));
        }

        debug!("Request succeeded: GET {}", url);
        Ok(response)
    }

    /// Fetch the body of `url` as text
    ///
    /// The whole body is buffered in memory.
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.get(url).await?;
        let body = response.text().await?;
        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
