//! HTTP transport adapter.
//!
//! Performs exactly one GET per call and hands back either the parsed
//! document or a [`TransportError`]. It knows nothing about completion codes,
//! sessions, or steps; the session client interprets what comes back.

use crate::config::ClientConfig;
use async_trait::async_trait;
use derive_more::{Display, Error};
use reqwest::Url;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// Broad classification of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum TransportErrorKind {
    /// Connection, DNS or TLS failure.
    #[display("network")]
    Network,
    /// The request exceeded its deadline.
    #[display("timeout")]
    Timeout,
    /// The server answered with a non-success HTTP status.
    #[display("http status")]
    Status,
    /// The body could not be read or parsed as a document.
    #[display("decode")]
    Decode,
    /// The request target could not be built.
    #[display("invalid target")]
    InvalidTarget,
    /// The transport was configured with unusable values.
    #[display("config")]
    Config,
}

/// Transport error with location tracking.
#[derive(Debug, Clone, PartialEq, Display, Error)]
#[display("Transport error ({}): {} at {}:{}", kind, message, file, line)]
pub struct TransportError {
    /// What went wrong.
    pub kind: TransportErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl TransportError {
    /// Creates a new transport error with caller location tracking.
    #[track_caller]
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Returns the failure classification.
    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }
}

impl From<reqwest::Error> for TransportError {
    #[track_caller]
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportErrorKind::Timeout
        } else if err.is_decode() || err.is_body() {
            TransportErrorKind::Decode
        } else if err.is_status() {
            TransportErrorKind::Status
        } else {
            TransportErrorKind::Network
        };
        Self::new(kind, format!("HTTP request failed: {}", err))
    }
}

/// A single-shot GET transport.
///
/// Implementations must not retry and must not interpret protocol fields.
/// Timeouts and cancellations surface as [`TransportError`]s.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Fetches `target` and parses the body as a JSON document.
    async fn get_document(&self, target: &Url) -> Result<serde_json::Value, TransportError>;

    /// Fetches `target` and returns the raw body text.
    async fn get_page(&self, target: &Url) -> Result<String, TransportError>;
}

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Builds a transport using the timeout and user agent from `config`.
    #[instrument(skip(config), fields(timeout_secs = *config.timeout_secs()))]
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        config
            .validate()
            .map_err(|e| TransportError::new(TransportErrorKind::Config, e.message))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(*config.timeout_secs()))
            .user_agent(config.user_agent().as_str())
            .build()?;
        debug!("Built HTTP transport");
        Ok(Self { client })
    }

    /// Wraps an existing client (custom TLS, proxies, connection pools).
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn send(&self, target: &Url) -> Result<reqwest::Response, TransportError> {
        debug!(host = ?target.host_str(), path = target.path(), "Sending GET");

        let response = self.client.get(target.clone()).send().await.map_err(|e| {
            error!(error = ?e, path = target.path(), "GET failed");
            TransportError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, path = target.path(), "Non-success HTTP status");
            return Err(TransportError::new(
                TransportErrorKind::Status,
                format!("HTTP {} from {}", status, target.path()),
            ));
        }
        Ok(response)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, target), fields(path = target.path()))]
    async fn get_document(&self, target: &Url) -> Result<serde_json::Value, TransportError> {
        let response = self.send(target).await?;
        response.json().await.map_err(|e| {
            error!(error = %e, "Response body is not a JSON document");
            TransportError::from(e)
        })
    }

    #[instrument(skip(self, target), fields(path = target.path()))]
    async fn get_page(&self, target: &Url) -> Result<String, TransportError> {
        let body = self.send(target).await?.text().await?;
        debug!(body_length = body.len(), "Received page");
        Ok(body)
    }
}
