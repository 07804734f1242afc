//! HTTP transport port

use async_trait::async_trait;
use thiserror::Error;
use turnpike_domain::{RequestSpec, ResponseSpec};

/// Errors raised by the transport before a response exists.
///
/// These are network-level failures: the client never attempts token
/// refresh or replay for them, they surface to the caller immediately.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request exceeded its timeout.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// The timeout that was exceeded, in milliseconds.
        timeout_ms: u64,
    },

    /// DNS resolution failed.
    #[error("DNS resolution failed for {host}: {message}")]
    DnsError {
        /// The host that could not be resolved.
        host: String,
        /// The underlying error text.
        message: String,
    },

    /// The remote host refused the connection.
    #[error("connection refused by {host}")]
    ConnectionRefused {
        /// The host that refused.
        host: String,
    },

    /// The connection failed for another reason.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The request URL is invalid.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request body could not be encoded.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// Any other transport failure.
    #[error("transport error: {0}")]
    Other(String),
}

/// Port for executing HTTP requests.
///
/// This trait abstracts the HTTP stack, keeping the application layer
/// independent of the concrete client library.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Executes an HTTP request and returns the raw response.
    ///
    /// Any HTTP status, including errors, is a successful execution; the
    /// `Err` branch is reserved for failures without a response.
    ///
    /// # Errors
    ///
    /// Returns a `TransportError` when no response was received.
    async fn execute(&self, request: &RequestSpec) -> Result<ResponseSpec, TransportError>;
}
