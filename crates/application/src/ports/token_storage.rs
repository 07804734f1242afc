//! Durable token storage port.
//!
//! The equivalent of the browser cookie jar: tokens and the logged
//! marker survive restarts and are readable on first load.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use turnpike_domain::TokenPair;

/// Errors raised by durable session storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred while reading or writing the backing store.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored payload could not be encoded or decoded.
    #[error("storage serialization error: {0}")]
    Serialization(String),
}

/// The session state persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    /// The persisted token pair.
    #[serde(flatten)]
    pub tokens: TokenPair,
    /// Cached logged marker, set at login and cleared at reset.
    #[serde(default)]
    pub logged: bool,
}

impl StoredSession {
    /// Creates a stored session from a token pair, marking it logged.
    #[must_use]
    pub const fn logged_in(tokens: TokenPair) -> Self {
        Self {
            tokens,
            logged: true,
        }
    }
}

/// Port for durable session persistence.
#[async_trait]
pub trait TokenStorage: Send + Sync {
    /// Loads the persisted session, or a default when none exists.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` when the backing store is unreadable.
    async fn load(&self) -> Result<StoredSession, StorageError>;

    /// Persists the session.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` when the backing store is unwritable.
    async fn save(&self, session: &StoredSession) -> Result<(), StorageError>;

    /// Removes any persisted session.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` when the backing store is unwritable.
    async fn clear(&self) -> Result<(), StorageError>;
}

/// In-memory storage, for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTokenStorage {
    session: Arc<RwLock<StoredSession>>,
}

impl InMemoryTokenStorage {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with a session.
    #[must_use]
    pub fn with_session(session: StoredSession) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
        }
    }
}

#[async_trait]
impl TokenStorage for InMemoryTokenStorage {
    async fn load(&self) -> Result<StoredSession, StorageError> {
        Ok(self.session.read().await.clone())
    }

    async fn save(&self, session: &StoredSession) -> Result<(), StorageError> {
        *self.session.write().await = session.clone();
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        *self.session.write().await = StoredSession::default();
        Ok(())
    }
}
