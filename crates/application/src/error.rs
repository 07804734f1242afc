//! Application error types

use thiserror::Error;
use turnpike_domain::DomainError;

use crate::ports::{StorageError, TransportError};

/// Application-level errors.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A domain validation or decoding error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// The transport failed before a response was received.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The server answered with an error status.
    #[error("HTTP {status}: {message}")]
    Http {
        /// The response status code.
        status: u16,
        /// The server-provided message, or the reason phrase.
        message: String,
    },

    /// Durable session storage failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ApplicationError {
    /// Builds an `Http` error from a response, preferring the body message.
    #[must_use]
    pub fn from_response(response: &turnpike_domain::ResponseSpec) -> Self {
        Self::Http {
            status: response.status,
            message: response
                .error_message()
                .unwrap_or_else(|| format!("request failed with status {}", response.status)),
        }
    }
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
