//! HTTP transport layer.
//!
//! A thin reqwest wrapper with request timeouts and bounded
//! exponential-backoff retries for transport failures and 5xx responses.
//! Response *classification* (401 handling in particular) is deliberately
//! not done here; that belongs to the executor.

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
