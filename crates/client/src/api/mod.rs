//! Request execution, refresh coordination, and the public facade.
//!
//! Control flow: [`facade::ApiClient`] → [`executor::RequestExecutor`] →
//! (on an unauthorized response) [`coordinator::RefreshCoordinator`] →
//! credential update → replay of queued calls → the executor again.
//!
//! The coordinator is the only component with shared mutable state; the
//! executor performs exactly one network call per invocation and the
//! facade maps classified outcomes onto each caller's `Result`.

pub mod coordinator;
pub mod descriptor;
pub mod executor;
pub mod facade;

pub use coordinator::{RefreshConfig, RefreshCoordinator};
pub use descriptor::RequestDescriptor;
pub use executor::{Outcome, RequestExecutor};
pub use facade::{ApiClient, ApiClientBuilder, ApiClientConfig};
