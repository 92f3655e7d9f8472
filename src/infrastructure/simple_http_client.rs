//! HTTP client for fetching listing pages with retry and error handling
//!
//! Every page is fetched completely before it is parsed. Retrying and backoff
//! live here only; the extraction core never retries.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::domain::PageSource;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Unsupported URL scheme '{scheme}' in {url}")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("HTTP request failed for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error {status}: {url}")]
    Status { url: String, status: u16 },

    #[error("Empty response from {url}")]
    EmptyBody { url: String },

    #[error("Failed to create HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Upper bound on the pause between two attempts
const MAX_BACKOFF_SECONDS: u64 = 60;

/// Exponential backoff before retry number `attempt` (1-based): 1s, 2s, 4s, ...
/// capped at [`MAX_BACKOFF_SECONDS`]
fn backoff_delay(attempt: u32) -> Duration {
    let seconds = 2_u64.saturating_pow(attempt.saturating_sub(1));
    Duration::from_secs(seconds.min(MAX_BACKOFF_SECONDS))
}

impl FetchError {
    /// Transport failures and throttling or gateway statuses are worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Status { status, .. } => StatusCode::from_u16(*status).is_ok_and(|status| {
                matches!(
                    status,
                    StatusCode::REQUEST_TIMEOUT
                        | StatusCode::TOO_MANY_REQUESTS
                        | StatusCode::INTERNAL_SERVER_ERROR
                        | StatusCode::BAD_GATEWAY
                        | StatusCode::SERVICE_UNAVAILABLE
                        | StatusCode::GATEWAY_TIMEOUT
                )
            }),
            _ => false,
        }
    }
}

/// Configuration for HTTP client behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// Attempts per page, including the first
    pub max_retries: u32,
    /// Pause before every request
    pub request_delay_ms: u64,
    pub follow_redirects: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("listing-scraper/{}", env!("CARGO_PKG_VERSION")),
            timeout_seconds: 30,
            max_retries: 3,
            request_delay_ms: 0,
            follow_redirects: true,
        }
    }
}

/// HTTP client returning page bodies as strings
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_config(HttpClientConfig::default())
    }

    pub fn with_config(config: HttpClientConfig) -> Result<Self, FetchError> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Parse and check the URL before any request is made
    pub fn validate_url(url: &str) -> Result<Url, FetchError> {
        let parsed = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            scheme => Err(FetchError::UnsupportedScheme {
                url: url.to_string(),
                scheme: scheme.to_string(),
            }),
        }
    }

    /// Fetch a page body, retrying retryable failures with exponential backoff
    pub async fn fetch_html_string(&self, url: &str) -> Result<String, FetchError> {
        let parsed = Self::validate_url(url)?;
        let attempts = self.config.max_retries.max(1);
        info!("Fetching {}", url);

        let mut attempt = 1;
        loop {
            match self.fetch_once(&parsed).await {
                Ok(body) => {
                    debug!("Fetched {} ({} bytes) on attempt {}", url, body.len(), attempt);
                    return Ok(body);
                }
                Err(e) if e.is_retryable() && attempt < attempts => {
                    let delay = backoff_delay(attempt);
                    warn!(
                        "Attempt {}/{} failed for {}: {} (retrying in {}s)",
                        attempt,
                        attempts,
                        url,
                        e,
                        delay.as_secs()
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!("Giving up on {} after {} attempt(s): {}", url, attempt, e);
                    return Err(e);
                }
            }
        }
    }

    async fn fetch_once(&self, url: &Url) -> Result<String, FetchError> {
        if self.config.request_delay_ms > 0 {
            sleep(Duration::from_millis(self.config.request_delay_ms)).await;
        }

        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url.clone()).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(transport)?;
        if body.is_empty() {
            return Err(FetchError::EmptyBody {
                url: url.to_string(),
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl PageSource for HttpClient {
    async fn fetch_page(&self, url: &str) -> anyhow::Result<String> {
        Ok(self.fetch_html_string(url).await?)
    }
}
