//! Turnpike Domain - Core types for the authenticated API client.
//!
//! This crate defines the domain model: tokens, request/response
//! specifications, cursor pages and client configuration. All types here
//! are pure Rust with no I/O dependencies.

pub mod auth;
pub mod config;
pub mod error;
pub mod page;
pub mod request;
pub mod response;

pub use auth::{LoginResponse, RefreshResponse, TokenPair, UserRecord};
pub use config::ApiConfig;
pub use error::{DomainError, DomainResult};
pub use page::{CursorPage, PageMetaKeys, PageParams};
pub use request::{HttpMethod, RequestSpec};
pub use response::ResponseSpec;
