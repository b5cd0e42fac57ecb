//! Credential model and storage.
//!
//! The credential is an opaque token the remote API uses to authenticate
//! requests. It is absent at process start unless a durable store already
//! holds one, injected into the credential header of every outbound call,
//! and replaced wholesale when the request layer refreshes it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │  CredentialStore    │  trait: read / write / clear
//! └─────────┬───────────┘
//!           │
//!           ├──► InMemoryCredentialStore   (process lifetime only)
//!           └──► FileCredentialStore       (JSON file, write-through cache)
//! ```
//!
//! `read` sits on the hot path of every request, so both implementations
//! serve it from memory.

pub mod store;
pub mod traits;
pub mod types;

pub use store::{FileCredentialStore, InMemoryCredentialStore};
pub use traits::{CredentialStore, CredentialStoreError};
pub use types::Credential;
