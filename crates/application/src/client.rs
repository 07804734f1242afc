//! Authenticated HTTP client.
//!
//! Every request goes through here: the bearer token is attached from the
//! shared store, a 401 triggers one coordinated refresh followed by one
//! replay, and every other status passes through untouched.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use turnpike_domain::{ApiConfig, RequestSpec, ResponseSpec};

use crate::auth::{RefreshCoordinator, TokenStore};
use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::{HttpTransport, TransportError};

/// HTTP client that injects bearer auth and recovers from expired tokens.
pub struct AuthenticatedClient {
    transport: Arc<dyn HttpTransport>,
    store: TokenStore,
    coordinator: Arc<RefreshCoordinator>,
    config: Arc<ApiConfig>,
}

impl AuthenticatedClient {
    /// Creates a client over the shared transport, store and coordinator.
    #[must_use]
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        store: TokenStore,
        coordinator: Arc<RefreshCoordinator>,
        config: Arc<ApiConfig>,
    ) -> Self {
        Self {
            transport,
            store,
            coordinator,
            config,
        }
    }

    /// The client configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// The shared token store.
    #[must_use]
    pub const fn token_store(&self) -> &TokenStore {
        &self.store
    }

    /// Executes a request with bearer auth and one-shot 401 recovery.
    ///
    /// Network failures surface immediately and never trigger a refresh.
    /// A 401 response triggers a coordinated refresh and exactly one
    /// replay; a second 401, or a failed refresh, surfaces the 401 to the
    /// caller. All other statuses pass through unchanged.
    ///
    /// # Errors
    ///
    /// Returns a `TransportError` only when no response was received.
    pub async fn request(&self, spec: RequestSpec) -> Result<ResponseSpec, TransportError> {
        let mut replayed = false;
        loop {
            let prepared = self.prepare(&spec).await;
            let response = self.transport.execute(&prepared).await?;

            if !response.is_unauthorized() || replayed {
                if response.is_unauthorized() {
                    tracing::debug!(url = %spec.url, "request still unauthorized after replay");
                } else if response.is_client_error() || response.is_server_error() {
                    // Error bodies with a message are reported, never retried.
                    if let Some(message) = response.error_message() {
                        tracing::warn!(
                            status = response.status,
                            url = %spec.url,
                            message = %message,
                            "api error response"
                        );
                    }
                }
                return Ok(response);
            }

            if !self.coordinator.ensure_refreshed().await {
                return Ok(response);
            }
            tracing::debug!(url = %spec.url, "replaying request after token refresh");
            replayed = true;
        }
    }

    /// Executes a request and decodes a 2xx JSON body.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Transport` for network failures,
    /// `ApplicationError::Http` for non-2xx responses and
    /// `ApplicationError::Domain` when the body does not decode.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        spec: RequestSpec,
    ) -> ApplicationResult<T> {
        let response = self.request(spec).await?;
        if !response.is_success() {
            return Err(ApplicationError::from_response(&response));
        }
        Ok(response.json::<T>()?)
    }

    /// Resolves the URL and attaches the bearer header.
    ///
    /// A caller-supplied Authorization header always wins; the stored
    /// access token is attached only when the caller set none.
    async fn prepare(&self, spec: &RequestSpec) -> RequestSpec {
        let mut prepared = spec.clone();

        if !prepared.is_absolute() {
            prepared.url = self.config.endpoint(&prepared.url);
        }
        if prepared.timeout_ms.is_none() {
            prepared.timeout_ms = Some(self.config.timeout_ms);
        }
        if !prepared.has_header("Authorization") {
            if let Some(access_token) = self.store.access_token().await {
                prepared = prepared.with_header("Authorization", format!("Bearer {access_token}"));
            }
        }
        prepared
    }
}

impl std::fmt::Debug for AuthenticatedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedClient")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
