//! In-memory credential store mock with observation hooks.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::credential::store::InMemoryCredentialStore;
use crate::credential::traits::{CredentialStore, CredentialStoreError};
use crate::credential::types::Credential;

/// Credential store that records writes and can be told to fail them.
///
/// Reads and successful writes behave exactly like
/// [`InMemoryCredentialStore`]; the extra state only exists for tests to
/// observe.
#[derive(Debug, Default)]
pub struct RecordingCredentialStore {
    inner: InMemoryCredentialStore,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl RecordingCredentialStore {
    /// Create an empty recording store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a recording store seeded with an initial credential.
    #[must_use]
    pub fn with_credential(credential: Credential) -> Self {
        Self {
            inner: InMemoryCredentialStore::with_credential(credential),
            writes: AtomicUsize::new(0),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Number of successful writes so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Make every subsequent write fail with a storage error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CredentialStore for RecordingCredentialStore {
    async fn read(&self) -> Option<Credential> {
        self.inner.read().await
    }

    async fn write(&self, credential: Credential) -> Result<(), CredentialStoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CredentialStoreError::Storage("injected write failure".to_string()));
        }
        self.inner.write(credential).await?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CredentialStoreError> {
        self.inner.clear().await
    }
}
