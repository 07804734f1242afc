//! Turnpike Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus the composition root
//! that wires the full client stack.

pub mod stack;
pub mod storage;
pub mod transport;

pub use stack::ApiStack;
pub use storage::FileTokenStorage;
pub use transport::ReqwestTransport;
