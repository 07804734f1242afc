//! Authentication and session types.
//!
//! Tokens are opaque strings: no expiry is decoded locally, a token is
//! discovered to be stale only when the server rejects it with 401.

use serde::{Deserialize, Serialize};

/// A pair of bearer credentials.
///
/// The access token authorizes API requests; the refresh token is used
/// solely to obtain a new access token. A session is authenticated only
/// when both are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived credential attached to every API request.
    pub access_token: Option<String>,
    /// Longer-lived credential used only against the refresh endpoint.
    pub refresh_token: Option<String>,
}

impl TokenPair {
    /// Creates a pair with both credentials present.
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
        }
    }

    /// Creates an empty (unauthenticated) pair.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            access_token: None,
            refresh_token: None,
        }
    }

    /// Returns true when both credentials are present.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.access_token.is_some() && self.refresh_token.is_some()
    }

    /// Returns true when no credential is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

/// Response body of the login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Token type, usually "Bearer".
    #[serde(default)]
    pub token_type: Option<String>,
    /// Server-issued lifetime in seconds; informational only.
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// The issued access token.
    pub access_token: String,
    /// The issued refresh token.
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl LoginResponse {
    /// Converts the response into a token pair.
    #[must_use]
    pub fn into_token_pair(self) -> TokenPair {
        TokenPair {
            access_token: Some(self.access_token),
            refresh_token: self.refresh_token,
        }
    }
}

/// Response body of the refresh endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// The replacement access token.
    pub access_token: String,
    /// The replacement refresh token.
    pub refresh_token: String,
}

impl RefreshResponse {
    /// Converts the response into a token pair.
    #[must_use]
    pub fn into_token_pair(self) -> TokenPair {
        TokenPair::new(self.access_token, self.refresh_token)
    }
}

/// The authenticated user as returned by the whoami endpoint.
///
/// The record is kept opaque: the core never interprets its fields, it
/// only distinguishes "present and non-empty" from "absent".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserRecord(pub serde_json::Map<String, serde_json::Value>);

impl UserRecord {
    /// Returns true when the record carries no fields.
    ///
    /// An empty object does not count as a loaded user.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }
}
