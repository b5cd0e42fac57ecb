//! Credential model and persistence shared across Tollgate crates.
//!
//! This crate holds the leaf pieces of the request layer: the opaque
//! [`Credential`] token, the [`CredentialStore`] abstraction consulted on
//! every outbound request, and the in-memory and file-backed store
//! implementations. No refresh or queueing logic lives here; that belongs
//! to `tollgate-client`.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod credential;
pub mod testing;

// Re-export commonly used types for convenience
pub use credential::store::{FileCredentialStore, InMemoryCredentialStore};
pub use credential::traits::{CredentialStore, CredentialStoreError};
pub use credential::types::Credential;
