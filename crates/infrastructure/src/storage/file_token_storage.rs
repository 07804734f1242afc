//! File-based token storage implementation.
//!
//! The session is stored as JSON in a single file, the desktop
//! equivalent of the browser cookie jar. The file holds bearer tokens
//! and should not be world-readable or committed anywhere.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use turnpike_application::ports::{StorageError, StoredSession, TokenStorage};

/// File-based session storage.
///
/// Stores the session at the given path:
/// ```json
/// {
///   "access_token": "...",
///   "refresh_token": "...",
///   "logged": true
/// }
/// ```
///
/// A missing file reads as an empty session; `clear` removes the file.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    /// Creates a storage backed by the given file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a storage at the platform data directory.
    ///
    /// Resolves to `<data_dir>/turnpike/session.json`, falling back to
    /// the current directory when no data directory exists.
    #[must_use]
    pub fn in_data_dir() -> Self {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join("turnpike").join("session.json"))
    }

    /// The backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenStorage for FileTokenStorage {
    async fn load(&self) -> Result<StoredSession, StorageError> {
        match fs::read(&self.path).await {
            Ok(content) => serde_json::from_slice(&content)
                .map_err(|e| StorageError::Serialization(e.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoredSession::default()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn save(&self, session: &StoredSession) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_vec_pretty(session)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        fs::write(&self.path, content).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}
