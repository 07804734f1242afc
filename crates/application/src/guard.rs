//! Navigation-time authorization check.
//!
//! Invoked before each navigation; the only possible outcomes are
//! allowing the navigation or redirecting to the sign-in boundary. All
//! failures along the way, including errors from the session facade,
//! collapse into a redirect; nothing escapes to the navigation layer.

use std::sync::Arc;

use turnpike_domain::ApiConfig;

use crate::auth::SessionFacade;

/// Terminal outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Navigation proceeds.
    Allow,
    /// Navigation is redirected to the given route.
    Redirect(String),
}

/// Pre-navigation authorization guard.
pub struct RouteGuard {
    session: Arc<SessionFacade>,
    config: Arc<ApiConfig>,
}

impl RouteGuard {
    /// Creates a guard over the shared session.
    #[must_use]
    pub fn new(session: Arc<SessionFacade>, config: Arc<ApiConfig>) -> Self {
        Self { session, config }
    }

    /// Decides whether navigation to `route` may proceed.
    ///
    /// Public routes bypass the check (an authenticated visitor is sent
    /// home instead of back to the sign-in boundary). Otherwise an
    /// already-logged session passes, and a session with stored tokens
    /// but no user gets one user fetch; an expired access token recovers
    /// inside that fetch through the client's single refresh-and-replay,
    /// so at most one refresh call happens per check. Anything else is a
    /// redirect.
    pub async fn check(&self, route: &str) -> GuardDecision {
        let logged = self.session.logged().await;

        if self.config.is_public_route(route) {
            if logged {
                return GuardDecision::Redirect(self.config.home_route.clone());
            }
            return GuardDecision::Allow;
        }

        if logged {
            return GuardDecision::Allow;
        }

        // Stored tokens without a loaded user: one silent recovery
        // attempt. The fetch refreshes an expired access token on its
        // own, so no explicit refresh call is needed here.
        if !self.session.token_store().get().await.is_empty()
            && self.session.fetch_user().await.is_ok()
            && self.session.logged().await
        {
            return GuardDecision::Allow;
        }

        tracing::debug!(route, "navigation denied, redirecting to sign-in");
        let _ = self.session.reset().await;
        GuardDecision::Redirect(self.config.sign_in_route.clone())
    }
}

impl std::fmt::Debug for RouteGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteGuard").finish_non_exhaustive()
    }
}
