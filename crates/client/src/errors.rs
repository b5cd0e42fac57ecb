//! Request-layer error types
//!
//! Provides error classification for the request layer. The taxonomy keeps
//! credential problems (`Unauthorized`, `RefreshFailed`) distinct from
//! per-request failures (`Network`, `MalformedResponse`, status errors)
//! because only the former ever interact with the refresh state machine.

use std::time::Duration;

use thiserror::Error;

/// Categories of request-layer errors for logging and retry classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// Credential problems (rejected credential, failed refresh)
    Authentication,
    /// Transport-level failures - retryable
    Network,
    /// Server errors (5xx) - retryable
    Server,
    /// Client errors (4xx except auth) and undecodable payloads - non-retryable
    Client,
    /// Local misuse (bad URL, missing configuration) - non-retryable
    Config,
}

/// Request-layer errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request URL failed to parse; surfaced before any network I/O
    /// and never enters the retry queue.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The server rejected the credential even after a refresh.
    #[error("credential rejected by server")]
    Unauthorized,

    /// The refresh call itself failed; delivered to every request that was
    /// queued behind the refresh.
    #[error("credential refresh failed: {0}")]
    RefreshFailed(String),

    /// A 2xx response whose body was not the expected JSON shape.
    #[error("malformed response body: {0}")]
    MalformedResponse(String),

    #[error("server error: {0}")]
    Server(String),

    #[error("client error: {0}")]
    Client(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Get the error category for this error
    #[must_use]
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Unauthorized | Self::RefreshFailed(_) => ApiErrorCategory::Authentication,
            Self::Network(_) | Self::Timeout(_) => ApiErrorCategory::Network,
            Self::Server(_) => ApiErrorCategory::Server,
            Self::Client(_) | Self::MalformedResponse(_) => ApiErrorCategory::Client,
            Self::InvalidUrl(_) | Self::Config(_) => ApiErrorCategory::Config,
        }
    }

    /// Whether a fresh attempt of the same request could plausibly succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self.category(), ApiErrorCategory::Network | ApiErrorCategory::Server)
    }
}
