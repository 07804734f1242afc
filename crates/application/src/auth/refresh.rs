//! Token refresh coordination.
//!
//! Any number of requests can fail with 401 at the same time; exactly one
//! refresh call may hit the network for that failure window. The
//! coordinator serializes refreshes behind a mutex and uses the token
//! store's generation counter to let late arrivals observe a refresh that
//! already happened instead of issuing their own.

use std::sync::Arc;

use tokio::sync::Mutex;
use turnpike_domain::{ApiConfig, RefreshResponse, RequestSpec};

use crate::auth::token_store::TokenStore;
use crate::ports::HttpTransport;

/// Coordinates at-most-one in-flight token refresh.
pub struct RefreshCoordinator {
    transport: Arc<dyn HttpTransport>,
    store: TokenStore,
    config: Arc<ApiConfig>,
    gate: Mutex<()>,
}

impl RefreshCoordinator {
    /// Creates a coordinator over the shared store and transport.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, store: TokenStore, config: Arc<ApiConfig>) -> Self {
        Self {
            transport,
            store,
            config,
            gate: Mutex::new(()),
        }
    }

    /// Ensures the store holds post-refresh tokens.
    ///
    /// Returns true when usable tokens are in the store: either this call
    /// refreshed them, or another caller did while we waited. Returns
    /// false when refresh failed; the store is cleared and the caller
    /// must abandon its replay and proceed to logout.
    pub async fn ensure_refreshed(&self) -> bool {
        let observed = self.store.generation();
        let _guard = self.gate.lock().await;

        // A refresh (or logout) settled while we waited for the gate.
        if self.store.generation() != observed {
            return self.store.access_token().await.is_some();
        }

        let Some(refresh_token) = self.store.refresh_token().await else {
            tracing::debug!("no refresh token available, clearing session");
            let _ = self.store.clear().await;
            return false;
        };

        let request = RequestSpec::post(self.config.endpoint(&self.config.refresh_path))
            .with_header("Authorization", format!("Bearer {refresh_token}"))
            .with_timeout_ms(self.config.timeout_ms);

        tracing::debug!("refreshing access token");
        match self.transport.execute(&request).await {
            Ok(response) if response.is_success() => match response.json::<RefreshResponse>() {
                Ok(tokens) => {
                    if let Err(e) = self.store.set(tokens.into_token_pair()).await {
                        tracing::warn!(error = %e, "failed to persist refreshed tokens");
                        return false;
                    }
                    true
                }
                Err(e) => {
                    tracing::warn!(error = %e, "refresh response body is malformed");
                    let _ = self.store.clear().await;
                    false
                }
            },
            Ok(response) => {
                tracing::warn!(status = response.status, "token refresh rejected");
                let _ = self.store.clear().await;
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "token refresh transport failure");
                let _ = self.store.clear().await;
                false
            }
        }
    }
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
