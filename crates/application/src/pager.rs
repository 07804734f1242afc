//! Cursor-based incremental pagination.
//!
//! The pager accumulates pages from a list endpoint behind an opaque
//! cursor. At most one fetch is in flight per pager; overlapping triggers
//! are dropped, not queued. A parameter change resets the accumulation
//! immediately, and a fetch that started before the reset discards its
//! result on completion instead of corrupting the fresh state.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, RwLock};
use turnpike_domain::{CursorPage, PageMetaKeys, PageParams, RequestSpec};

use crate::client::AuthenticatedClient;
use crate::error::{ApplicationError, ApplicationResult};

/// Construction options for a [`CursorPager`].
#[derive(Debug, Clone, Default)]
pub struct PagerOptions {
    /// Meta key names of the target endpoint.
    pub meta_keys: PageMetaKeys,
    /// Initial query parameters.
    pub params: PageParams,
    /// When true, no fetch happens until `refresh` or `load_more`.
    pub lazy: bool,
}

struct PagerState<T> {
    data: Vec<T>,
    params: PageParams,
    next_cursor: Option<String>,
    has_more: bool,
    error: Option<Arc<ApplicationError>>,
    loading: bool,
    /// Bumped on every reset; stale completions compare against it.
    epoch: u64,
}

impl<T> PagerState<T> {
    fn reset(&mut self) {
        self.data.clear();
        self.next_cursor = None;
        self.has_more = true;
        self.error = None;
        self.epoch += 1;
    }
}

/// Incremental fetcher for one cursor-paginated resource.
pub struct CursorPager<T> {
    client: Arc<AuthenticatedClient>,
    url: String,
    meta_keys: PageMetaKeys,
    state: RwLock<PagerState<T>>,
    fetch_slot: Mutex<()>,
}

impl<T> CursorPager<T>
where
    T: DeserializeOwned + Clone + Send + Sync,
{
    /// Creates a pager without fetching anything.
    #[must_use]
    pub fn new(client: Arc<AuthenticatedClient>, url: impl Into<String>, options: PagerOptions) -> Self {
        Self {
            client,
            url: url.into(),
            meta_keys: options.meta_keys,
            state: RwLock::new(PagerState {
                data: Vec::new(),
                params: options.params,
                next_cursor: None,
                has_more: true,
                error: None,
                loading: false,
                epoch: 0,
            }),
            fetch_slot: Mutex::new(()),
        }
    }

    /// Creates a pager and, unless `options.lazy`, fetches the first page.
    pub async fn open(
        client: Arc<AuthenticatedClient>,
        url: impl Into<String>,
        options: PagerOptions,
    ) -> Self {
        let lazy = options.lazy;
        let pager = Self::new(client, url, options);
        if !lazy {
            pager.refresh().await;
        }
        pager
    }

    /// Accumulated items across all fetched pages, in fetch order.
    pub async fn data(&self) -> Vec<T> {
        self.state.read().await.data.clone()
    }

    /// True while a page fetch is in flight.
    pub async fn loading(&self) -> bool {
        self.state.read().await.loading
    }

    /// The error of the most recent failed fetch, if any.
    pub async fn error(&self) -> Option<Arc<ApplicationError>> {
        self.state.read().await.error.clone()
    }

    /// Whether the server reported more pages.
    pub async fn has_next_page(&self) -> bool {
        self.state.read().await.has_more
    }

    /// Fetches the next page and appends it to the accumulation.
    ///
    /// No-op when no next page exists or a fetch is already in flight;
    /// a dropped call must be re-issued by the caller if still wanted.
    pub async fn load_more(&self) {
        let (cursor, epoch) = {
            let state = self.state.read().await;
            if !state.has_more {
                return;
            }
            (state.next_cursor.clone(), state.epoch)
        };
        self.fetch_page(cursor, epoch).await;
    }

    /// Clears the accumulation and fetches the first page again.
    pub async fn refresh(&self) {
        let epoch = {
            let mut state = self.state.write().await;
            state.reset();
            state.epoch
        };
        self.fetch_page(None, epoch).await;
    }

    /// Replaces the parameter snapshot, resetting and refetching on change.
    ///
    /// Structural equality against the previous snapshot decides whether
    /// anything happens; setting identical parameters is a no-op.
    pub async fn set_params(&self, params: PageParams) {
        let epoch = {
            let mut state = self.state.write().await;
            if state.params == params {
                return;
            }
            state.params = params;
            state.reset();
            state.epoch
        };
        self.fetch_page(None, epoch).await;
    }

    async fn fetch_page(&self, cursor: Option<String>, epoch: u64) {
        // Drop overlapping triggers instead of queueing them.
        let Ok(_slot) = self.fetch_slot.try_lock() else {
            tracing::debug!(url = %self.url, "page fetch already in flight, dropping trigger");
            return;
        };

        let params = {
            let mut state = self.state.write().await;
            if state.epoch != epoch {
                return;
            }
            state.loading = true;
            state.error = None;
            state.params.clone()
        };

        let mut request = RequestSpec::get(self.url.clone());
        for (key, value) in &params {
            request = request.with_query(key.clone(), value.clone());
        }
        if let Some(cursor) = cursor {
            request = request.with_query("cursor", cursor);
        }

        let outcome = self.fetch_and_decode(request).await;

        let mut state = self.state.write().await;
        if state.epoch != epoch {
            // A reset superseded this fetch; its result is stale.
            tracing::debug!(url = %self.url, "discarding stale page fetch result");
            state.loading = false;
            return;
        }
        match outcome {
            Ok(page) => {
                state.data.extend(page.items);
                state.next_cursor = page.next_cursor;
                state.has_more = page.has_more;
            }
            Err(e) => {
                state.error = Some(Arc::new(e));
            }
        }
        state.loading = false;
    }

    async fn fetch_and_decode(&self, request: RequestSpec) -> ApplicationResult<CursorPage<T>> {
        let response = self.client.request(request).await?;
        if !response.is_success() {
            return Err(ApplicationError::from_response(&response));
        }
        let body = response
            .json::<serde_json::Value>()
            .map_err(ApplicationError::Domain)?;
        Ok(CursorPage::from_json(&body, &self.meta_keys)?)
    }
}

impl<T> std::fmt::Debug for CursorPager<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorPager")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}
