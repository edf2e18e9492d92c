//! HTTP client for the Grafana Tempo query API.
//!
//! Every call is a single GET with the configured timeout. There are no
//! retries: a failed attempt is reported straight back to the tool, which
//! turns it into an error envelope.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::core::config::TempoConfig;

/// Errors raised while talking to the tracing backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend answered with a non-success status.
    #[error("Tempo returned HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The backend did not answer within the configured timeout.
    #[error("Request to Tempo timed out after {0:?}")]
    Timeout(Duration),

    /// The request could not be sent or the response could not be read.
    #[error("Request to Tempo failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The response body was not valid JSON.
    #[error("Tempo returned invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The query could not be encoded into a URL.
    #[error("Failed to encode query: {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),
}

/// Tempo API client shared by all trace tools.
#[derive(Debug, Clone)]
pub struct TempoClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl TempoClient {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(BackendError::Request)?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn from_config(config: &TempoConfig) -> Result<Self, BackendError> {
        Self::new(config.base_url.clone(), config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL for a window query: `/api/traces?service=..&start=..&end=..`.
    pub fn traces_url(&self, query: &[(&str, &str)]) -> Result<String, BackendError> {
        self.url_with_query("/api/traces", query)
    }

    /// URL for a single trace: `/api/traces/{trace_id}`.
    pub fn trace_url(&self, trace_id: &str) -> String {
        format!("{}/api/traces/{}", self.base_url, trace_id)
    }

    /// URL for a TraceQL search: `/api/search?q=..&start=..&end=..`.
    pub fn search_url(&self, query: &[(&str, &str)]) -> Result<String, BackendError> {
        self.url_with_query("/api/search", query)
    }

    /// URL for a TraceQL metrics range query: `/api/metrics/query_range?q=..`.
    pub fn metrics_url(&self, query: &[(&str, &str)]) -> Result<String, BackendError> {
        self.url_with_query("/api/metrics/query_range", query)
    }

    fn url_with_query(&self, path: &str, query: &[(&str, &str)]) -> Result<String, BackendError> {
        let encoded = serde_urlencoded::to_string(query)?;
        if encoded.is_empty() {
            Ok(format!("{}{}", self.base_url, path))
        } else {
            Ok(format!("{}{}?{}", self.base_url, path, encoded))
        }
    }

    /// GET `url` and parse the body as JSON.
    #[instrument(skip(self))]
    pub async fn get_json(&self, url: &str) -> Result<Value, BackendError> {
        debug!("Querying Tempo");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            warn!("Tempo returned {}", status);
            return Err(BackendError::Status { status, body });
        }

        serde_json::from_str(&body).map_err(BackendError::InvalidJson)
    }

    fn classify(&self, error: reqwest::Error) -> BackendError {
        if error.is_timeout() {
            BackendError::Timeout(self.timeout)
        } else {
            BackendError::Request(error)
        }
    }
}
