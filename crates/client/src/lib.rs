//! # Tollgate client
//!
//! HTTP request layer that issues calls against a remote API and
//! transparently recovers from expired credentials. The first request to
//! hit an unauthorized response triggers exactly one credential refresh;
//! requests arriving while the refresh is inflight are queued instead of
//! racing the stale credential to the server, and every blocked request
//! is replayed in arrival order once the replacement credential has been
//! published.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │    ApiClient    │  Public facade (builder-constructed)
//! └────────┬────────┘
//!          │
//!          ├──► RequestExecutor     (one call: headers + classification)
//!          │         │
//!          │         └──► HttpClient        (reqwest + bounded retry)
//!          │
//!          └──► RefreshCoordinator  (single-flight refresh + FIFO replay)
//!                    │
//!                    └──► CredentialStore   (tollgate-common)
//! ```
//!
//! The coordinator owns the only shared mutable state in the layer; the
//! executor is stateless and the facade merely routes outcomes.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod api;
pub mod errors;
pub mod http;

// Re-export commonly used items
pub use api::coordinator::{RefreshConfig, RefreshCoordinator};
pub use api::descriptor::RequestDescriptor;
pub use api::executor::{Outcome, RequestExecutor, CREDENTIAL_HEADER};
pub use api::facade::{ApiClient, ApiClientBuilder, ApiClientConfig};
pub use errors::{ApiError, ApiErrorCategory};
pub use http::{HttpClient, HttpClientBuilder};
