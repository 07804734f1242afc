//! Authentication for the Turnpike client.
//!
//! This module provides:
//! - The shared token store with write-through persistence
//! - The refresh coordinator (at-most-one in-flight refresh)
//! - The session facade (login, logout, current user)

mod refresh;
mod session;
mod token_store;

pub use refresh::RefreshCoordinator;
pub use session::{LoginOptions, SessionFacade};
pub use token_store::TokenStore;
