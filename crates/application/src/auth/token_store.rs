//! Shared token store with write-through persistence.
//!
//! The store is the single shared mutable resource of the client: every
//! outgoing request reads it, and only login and refresh-success write
//! it. A generation counter bumps on every mutation so the refresh
//! coordinator can tell whether the tokens it observed are still current.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;
use turnpike_domain::TokenPair;

use crate::error::ApplicationResult;
use crate::ports::{StoredSession, TokenStorage};

/// Thread-safe token store backed by durable storage.
#[derive(Clone)]
pub struct TokenStore {
    state: Arc<RwLock<StoredSession>>,
    generation: Arc<AtomicU64>,
    storage: Arc<dyn TokenStorage>,
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl TokenStore {
    /// Creates an empty store over the given storage backend.
    #[must_use]
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        Self {
            state: Arc::new(RwLock::new(StoredSession::default())),
            generation: Arc::new(AtomicU64::new(0)),
            storage,
        }
    }

    /// Hydrates the store from durable storage.
    ///
    /// Called once at startup so tokens written in a previous run are
    /// visible on first request.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the backing store is unreadable.
    pub async fn load(&self) -> ApplicationResult<()> {
        let session = self.storage.load().await?;
        *self.state.write().await = session;
        self.generation.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Returns the current token pair.
    pub async fn get(&self) -> TokenPair {
        self.state.read().await.tokens.clone()
    }

    /// Returns the current access token, if any.
    pub async fn access_token(&self) -> Option<String> {
        self.state.read().await.tokens.access_token.clone()
    }

    /// Returns the current refresh token, if any.
    pub async fn refresh_token(&self) -> Option<String> {
        self.state.read().await.tokens.refresh_token.clone()
    }

    /// Returns the persisted logged marker.
    pub async fn logged_marker(&self) -> bool {
        self.state.read().await.logged
    }

    /// Replaces the stored tokens and marks the session logged.
    ///
    /// # Errors
    ///
    /// Returns a storage error when persistence fails; the in-memory
    /// state is updated regardless.
    pub async fn set(&self, tokens: TokenPair) -> ApplicationResult<()> {
        let session = StoredSession::logged_in(tokens);
        {
            let mut state = self.state.write().await;
            *state = session.clone();
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.storage.save(&session).await?;
        Ok(())
    }

    /// Clears tokens and the logged marker.
    ///
    /// # Errors
    ///
    /// Returns a storage error when persistence fails; the in-memory
    /// state is cleared regardless.
    pub async fn clear(&self) -> ApplicationResult<()> {
        {
            let mut state = self.state.write().await;
            *state = StoredSession::default();
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.storage.clear().await?;
        Ok(())
    }

    /// Overrides the logged marker without touching the tokens.
    ///
    /// # Errors
    ///
    /// Returns a storage error when persistence fails; the in-memory
    /// state is updated regardless.
    pub async fn mark_logged(&self, logged: bool) -> ApplicationResult<()> {
        let session = {
            let mut state = self.state.write().await;
            state.logged = logged;
            state.clone()
        };
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.storage.save(&session).await?;
        Ok(())
    }

    /// Returns the mutation generation.
    ///
    /// Monotonically increasing; two equal readings mean no mutation
    /// happened in between.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}
