//! Ports (interfaces) consumed by the application layer.

mod token_storage;
mod transport;

pub use token_storage::{InMemoryTokenStorage, StorageError, StoredSession, TokenStorage};
pub use transport::{HttpTransport, TransportError};
