//! Store abstraction for the current credential.
//!
//! The trait enables dependency injection and testing with mock stores;
//! the request layer only ever sees `Arc<dyn CredentialStore>`.

use async_trait::async_trait;
use thiserror::Error;

use super::types::Credential;

/// Error type for credential store operations.
#[derive(Debug, Error)]
pub enum CredentialStoreError {
    /// Underlying durable storage failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Stored record could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Trait for persisting and retrieving the current credential.
///
/// `read` sits on the hot path of every outbound request, so
/// implementations keep the current value in memory and treat the durable
/// backend as write-through. `write` is an atomic publish: a concurrent
/// reader observes either the previous credential or the new one, never a
/// torn value.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Current credential, if one has been stored.
    async fn read(&self) -> Option<Credential>;

    /// Replace the current credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the durable backend rejects the write; the
    /// in-memory value is left unchanged in that case.
    async fn write(&self, credential: Credential) -> Result<(), CredentialStoreError>;

    /// Remove the current credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the durable backend fails; removing an absent
    /// credential is not an error.
    async fn clear(&self) -> Result<(), CredentialStoreError>;
}
