//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or decoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The provided URL is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// A response body could not be decoded as the expected shape.
    #[error("invalid response body: {0}")]
    InvalidBody(String),

    /// A paged response is missing required metadata.
    #[error("invalid page metadata: {0}")]
    InvalidPageMeta(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
