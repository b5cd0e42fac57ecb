//! Credential store implementations.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::{CredentialStore, CredentialStoreError};
use super::types::Credential;

/// Process-lifetime credential store with no durable backend.
#[derive(Clone, Debug, Default)]
pub struct InMemoryCredentialStore {
    current: Arc<RwLock<Option<Credential>>>,
}

impl InMemoryCredentialStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with an initial credential.
    #[must_use]
    pub fn with_credential(credential: Credential) -> Self {
        Self { current: Arc::new(RwLock::new(Some(credential))) }
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn read(&self) -> Option<Credential> {
        self.current.read().clone()
    }

    async fn write(&self, credential: Credential) -> Result<(), CredentialStoreError> {
        *self.current.write() = Some(credential);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CredentialStoreError> {
        *self.current.write() = None;
        Ok(())
    }
}

/// On-disk record format for [`FileCredentialStore`].
#[derive(Debug, Serialize, Deserialize)]
struct StoredCredential {
    access_token: String,
}

/// Durable credential store backed by a JSON file.
///
/// The current value is cached in memory and reads never touch the
/// filesystem. Writes go through to disk before the cache is updated, so
/// a credential acknowledged as stored survives a restart.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    cached: RwLock<Option<Credential>>,
}

impl FileCredentialStore {
    /// Open a store over `path`, loading any previously written credential.
    ///
    /// A missing file is not an error; the store simply starts empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or decoded.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CredentialStoreError> {
        let path = path.as_ref().to_path_buf();
        let cached = match std::fs::read(&path) {
            Ok(bytes) => {
                let record: StoredCredential = serde_json::from_slice(&bytes)
                    .map_err(|err| CredentialStoreError::Serialization(err.to_string()))?;
                Some(Credential::new(record.access_token))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => return Err(CredentialStoreError::Storage(err.to_string())),
        };

        Ok(Self { path, cached: RwLock::new(cached) })
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn read(&self) -> Option<Credential> {
        self.cached.read().clone()
    }

    async fn write(&self, credential: Credential) -> Result<(), CredentialStoreError> {
        let record = StoredCredential { access_token: credential.expose().to_string() };
        let bytes = serde_json::to_vec(&record)
            .map_err(|err| CredentialStoreError::Serialization(err.to_string()))?;

        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|err| CredentialStoreError::Storage(err.to_string()))?;

        *self.cached.write() = Some(credential);
        debug!(path = %self.path.display(), "credential persisted");

        Ok(())
    }

    async fn clear(&self) -> Result<(), CredentialStoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(CredentialStoreError::Storage(err.to_string())),
        }

        *self.cached.write() = None;

        Ok(())
    }
}
