//! API client configuration.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Default request timeout in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Configuration for the API client and its auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the API, e.g. `https://api.example.com`.
    pub base_url: String,
    /// Login endpoint path.
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// Token refresh endpoint path.
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    /// Whoami endpoint path.
    #[serde(default = "default_whoami_path")]
    pub whoami_path: String,
    /// Logout endpoint path.
    #[serde(default = "default_logout_path")]
    pub logout_path: String,
    /// Route names that never require authentication.
    #[serde(default = "default_public_routes")]
    pub public_routes: Vec<String>,
    /// Route the guard redirects to when authentication fails.
    #[serde(default = "default_sign_in_route")]
    pub sign_in_route: String,
    /// Route an already-authenticated user lands on from a public route.
    #[serde(default = "default_home_route")]
    pub home_route: String,
    /// Default request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_login_path() -> String {
    "/v1/auth/login".to_string()
}

fn default_refresh_path() -> String {
    "/v1/auth/refresh".to_string()
}

fn default_whoami_path() -> String {
    "/v1/auth/me".to_string()
}

fn default_logout_path() -> String {
    "/v1/auth/logout".to_string()
}

fn default_public_routes() -> Vec<String> {
    vec![
        "sign-in".to_string(),
        "register".to_string(),
        "forgot-password".to_string(),
    ]
}

fn default_sign_in_route() -> String {
    "/sign-in".to_string()
}

fn default_home_route() -> String {
    "/".to_string()
}

const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl ApiConfig {
    /// Creates a configuration with default endpoint paths.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            login_path: default_login_path(),
            refresh_path: default_refresh_path(),
            whoami_path: default_whoami_path(),
            logout_path: default_logout_path(),
            public_routes: default_public_routes(),
            sign_in_route: default_sign_in_route(),
            home_route: default_home_route(),
            timeout_ms: default_timeout_ms(),
        }
    }

    /// Resolves an API-relative path against the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    /// Returns true when the route is reachable without authentication.
    #[must_use]
    pub fn is_public_route(&self, route: &str) -> bool {
        let name = route.trim_start_matches('/');
        self.public_routes.iter().any(|r| r == name) || route == self.sign_in_route
    }

    /// Validates the base URL.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidUrl` if the base URL does not parse.
    pub fn validate(&self) -> DomainResult<()> {
        url::Url::parse(&self.base_url)
            .map(|_| ())
            .map_err(|e| DomainError::InvalidUrl(format!("{e}: {}", self.base_url)))
    }
}
