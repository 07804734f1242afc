//! Composition root for the full client stack.
//!
//! Builds and wires the transport, token storage, token store, refresh
//! coordinator, client, session facade and route guard. Everything is
//! created once and shared by `Arc`; there are no globals.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use turnpike_application::ports::{HttpTransport, TokenStorage};
use turnpike_application::{
    ApplicationResult, AuthenticatedClient, CursorPager, PagerOptions, RefreshCoordinator,
    RouteGuard, SessionFacade, TokenStore,
};
use turnpike_domain::ApiConfig;

use crate::storage::FileTokenStorage;
use crate::transport::ReqwestTransport;

/// The fully wired client stack.
pub struct ApiStack {
    config: Arc<ApiConfig>,
    store: TokenStore,
    client: Arc<AuthenticatedClient>,
    session: Arc<SessionFacade>,
    guard: Arc<RouteGuard>,
}

impl ApiStack {
    /// Wires a stack over the given transport and storage.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration is invalid.
    pub fn new(
        config: ApiConfig,
        transport: Arc<dyn HttpTransport>,
        storage: Arc<dyn TokenStorage>,
    ) -> ApplicationResult<Self> {
        config.validate()?;
        let config = Arc::new(config);

        let store = TokenStore::new(storage);
        let coordinator = Arc::new(RefreshCoordinator::new(
            Arc::clone(&transport),
            store.clone(),
            Arc::clone(&config),
        ));
        let client = Arc::new(AuthenticatedClient::new(
            transport,
            store.clone(),
            coordinator,
            Arc::clone(&config),
        ));
        let session = Arc::new(SessionFacade::new(
            Arc::clone(&client),
            store.clone(),
            Arc::clone(&config),
        ));
        let guard = Arc::new(RouteGuard::new(Arc::clone(&session), Arc::clone(&config)));

        Ok(Self {
            config,
            store,
            client,
            session,
            guard,
        })
    }

    /// Wires a stack with the default reqwest transport and file storage,
    /// then hydrates tokens persisted by a previous run.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration is invalid, the HTTP
    /// client cannot be created or persisted tokens cannot be read.
    pub async fn connect(config: ApiConfig) -> ApplicationResult<Self> {
        let transport = Arc::new(ReqwestTransport::new()?);
        let storage = Arc::new(FileTokenStorage::in_data_dir());
        let stack = Self::new(config, transport, storage)?;
        stack.store.load().await?;
        Ok(stack)
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

    /// The authenticated HTTP client.
    #[must_use]
    pub fn client(&self) -> Arc<AuthenticatedClient> {
        Arc::clone(&self.client)
    }

    /// The session facade.
    #[must_use]
    pub fn session(&self) -> Arc<SessionFacade> {
        Arc::clone(&self.session)
    }

    /// The navigation guard.
    #[must_use]
    pub fn guard(&self) -> Arc<RouteGuard> {
        Arc::clone(&self.guard)
    }

    /// Creates a lazy pager for a list endpoint.
    #[must_use]
    pub fn pager<T>(&self, url: impl Into<String>, options: PagerOptions) -> CursorPager<T>
    where
        T: DeserializeOwned + Clone + Send + Sync,
    {
        CursorPager::new(Arc::clone(&self.client), url, options)
    }
}

impl std::fmt::Debug for ApiStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiStack")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}
