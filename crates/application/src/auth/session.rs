//! Session facade: login, logout and the current-user lifecycle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;
use turnpike_domain::{ApiConfig, LoginResponse, RequestSpec, TokenPair, UserRecord};

use crate::auth::token_store::TokenStore;
use crate::client::AuthenticatedClient;
use crate::error::{ApplicationError, ApplicationResult};

/// Options for [`SessionFacade::login`].
#[derive(Debug, Clone, Copy)]
pub struct LoginOptions {
    /// Whether to fetch the user record right after storing tokens.
    pub fetch_user: bool,
}

impl Default for LoginOptions {
    fn default() -> Self {
        Self { fetch_user: true }
    }
}

/// Single owner of session state: tokens, user record and logged flag.
///
/// Created once at application start and shared by reference; there is no
/// hidden global. Token and user mutations happen only through `login`,
/// `logout`, `fetch_user` and `reset`.
pub struct SessionFacade {
    client: Arc<AuthenticatedClient>,
    store: TokenStore,
    config: Arc<ApiConfig>,
    user: RwLock<Option<UserRecord>>,
    loading: AtomicBool,
}

impl SessionFacade {
    /// Creates a facade over the shared client and store.
    #[must_use]
    pub fn new(client: Arc<AuthenticatedClient>, store: TokenStore, config: Arc<ApiConfig>) -> Self {
        Self {
            client,
            store,
            config,
            user: RwLock::new(None),
            loading: AtomicBool::new(false),
        }
    }

    /// Stores the given tokens and, unless suppressed, loads the user.
    ///
    /// # Errors
    ///
    /// Returns an error when persistence or the user fetch fails; stored
    /// tokens are kept either way.
    pub async fn login(&self, tokens: TokenPair, options: LoginOptions) -> ApplicationResult<()> {
        self.store.set(tokens).await?;
        if options.fetch_user {
            self.fetch_user().await?;
        }
        Ok(())
    }

    /// Exchanges credentials at the login endpoint, then logs in.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Http` when the server rejects the
    /// credentials, or any error `login` can produce.
    pub async fn login_with_credentials(
        &self,
        identifier: &str,
        password: &str,
    ) -> ApplicationResult<()> {
        let request = RequestSpec::post(self.config.login_path.clone()).with_json_body(
            serde_json::json!({ "email": identifier, "password": password }),
        );
        let response: LoginResponse = self.client.request_json(request).await?;
        self.login(response.into_token_pair(), LoginOptions::default())
            .await
    }

    /// Fetches the current user from the whoami endpoint and stores it.
    ///
    /// Tokens are never mutated here: on failure the caller decides
    /// whether to retry or log out.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Http` for error statuses (including a
    /// terminal 401) and `ApplicationError::Domain` for a bad body.
    pub async fn fetch_user(&self) -> ApplicationResult<UserRecord> {
        self.loading.store(true, Ordering::SeqCst);
        let result = self
            .client
            .request_json::<UserRecord>(RequestSpec::get(self.config.whoami_path.clone()))
            .await;
        self.loading.store(false, Ordering::SeqCst);

        let user = result?;
        *self.user.write().await = Some(user.clone());
        Ok(user)
    }

    /// Logs out: best-effort server notification, then local reset.
    ///
    /// Idempotent; a failing logout endpoint never blocks the reset.
    ///
    /// # Errors
    ///
    /// Returns a storage error when clearing persisted tokens fails.
    pub async fn logout(&self) -> ApplicationResult<()> {
        if self.store.access_token().await.is_some() {
            let request = RequestSpec::post(self.config.logout_path.clone());
            if let Err(e) = self.client.request(request).await {
                tracing::debug!(error = %e, "logout endpoint unreachable, resetting anyway");
            }
        }
        self.reset().await
    }

    /// Clears tokens, logged marker and user record unconditionally.
    ///
    /// # Errors
    ///
    /// Returns a storage error when clearing persisted tokens fails.
    pub async fn reset(&self) -> ApplicationResult<()> {
        self.store.clear().await?;
        *self.user.write().await = None;
        Ok(())
    }

    /// The loaded user record, if any.
    pub async fn user(&self) -> Option<UserRecord> {
        self.user.read().await.clone()
    }

    /// True while a `fetch_user` call is in flight.
    #[must_use]
    pub fn loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Derived authentication predicate.
    ///
    /// True iff an access token is present AND a non-empty user record is
    /// loaded. Recomputed on every call. A user record without an access
    /// token is an inconsistent state and is reconciled here by dropping
    /// the user.
    pub async fn logged(&self) -> bool {
        let has_token = self.store.access_token().await.is_some();
        let mut user = self.user.write().await;
        let has_user = user.as_ref().is_some_and(|u| !u.is_empty());

        if has_user && !has_token {
            *user = None;
            return false;
        }
        has_token && has_user
    }

    /// The shared token store.
    #[must_use]
    pub const fn token_store(&self) -> &TokenStore {
        &self.store
    }
}

impl std::fmt::Debug for SessionFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionFacade")
            .field("store", &self.store)
            .field("loading", &self.loading())
            .finish_non_exhaustive()
    }
}
