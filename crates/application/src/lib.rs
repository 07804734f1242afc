//! Turnpike Application - Session and request orchestration
//!
//! This crate owns the authenticated request pipeline: the token store,
//! the refresh coordinator, the client with 401 recovery, the session
//! facade, the route guard and the cursor pager. Transport and token
//! persistence are ports implemented by the infrastructure crate.

pub mod auth;
pub mod client;
pub mod error;
pub mod guard;
pub mod pager;
pub mod ports;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::{LoginOptions, RefreshCoordinator, SessionFacade, TokenStore};
pub use client::AuthenticatedClient;
pub use error::{ApplicationError, ApplicationResult};
pub use guard::{GuardDecision, RouteGuard};
pub use pager::{CursorPager, PagerOptions};
pub use ports::{
    HttpTransport, InMemoryTokenStorage, StorageError, StoredSession, TokenStorage, TransportError,
};
