//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - The `HttpBackend` capability the fetch pipeline depends on
//! - Building the reqwest client with the crawler's user agent
//! - Redirect handling (followed transparently, bounded hop count)
//! - Error classification

use crate::config::Config;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client, Response};
use std::time::Duration;
use thiserror::Error;

/// A response observed for a HEAD or GET request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,

    /// Content-Type header value (empty if absent)
    pub content_type: String,

    /// Final URL after redirects
    pub effective_url: String,

    /// Body text; only populated for GET
    pub body: Option<String>,
}

/// A request that produced no usable response
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Request timeout")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Redirect error: {0}")]
    Redirect(String),

    #[error("Request failed: {0}")]
    Other(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_connect() {
            FetchError::Connect(e.to_string())
        } else if e.is_redirect() {
            FetchError::Redirect(e.to_string())
        } else {
            FetchError::Other(e.to_string())
        }
    }
}

/// Capability interface the fetch pipeline issues requests through
///
/// Implementations follow redirects themselves and report the final URL in
/// [`HttpResponse::effective_url`]. An HTTP error status is a response, not an
/// error.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// Issues a HEAD request
    async fn head(&self, url: &str) -> Result<HttpResponse, FetchError>;

    /// Issues a GET request and reads the body
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The crawl configuration (user agent, timeout, redirect limit)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use site_sweep::config::Config;
/// use site_sweep::crawler::build_http_client;
///
/// let config = Config::with_start_url("https://example.com/");
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(Duration::from_secs(config.crawler.request_timeout))
        .connect_timeout(Duration::from_secs(config.crawler.request_timeout.min(10)))
        .redirect(Policy::limited(config.crawler.max_redirects as usize))
        .gzip(true)
        .brotli(true)
        .build()
}

/// `HttpBackend` over a shared reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    client: Client,
}

impl ReqwestBackend {
    /// Creates a backend with a client built from the configuration
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    fn describe(response: &Response) -> HttpResponse {
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        HttpResponse {
            status: response.status().as_u16(),
            content_type,
            effective_url: response.url().to_string(),
            body: None,
        }
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn head(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let response = self.client.head(url).send().await?;
        Ok(Self::describe(&response))
    }

    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let response = self.client.get(url).send().await?;
        let mut described = Self::describe(&response);
        described.body = Some(response.text().await?);
        Ok(described)
    }
}
