//! Single-flight credential refresh and pending-request replay.
//!
//! The coordinator owns the only shared mutable state in the request
//! layer: the refresh flag, the queue of requests blocked on the stale
//! credential, and the credential generation counter. All three live
//! behind one lock, and the lock is never held across an await point.
//!
//! The invariant everything else hangs off: at most one refresh call is
//! inflight at any moment. Every request that observes the refresh in
//! progress joins the queue instead, and the whole queue is replayed in
//! arrival order once the replacement credential has been published.

use std::mem;
use std::sync::Arc;

use parking_lot::Mutex;
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use url::Url;

use tollgate_common::{Credential, CredentialStore};

use super::descriptor::RequestDescriptor;
use super::executor::{Outcome, RequestExecutor};
use crate::errors::ApiError;

/// Where and how to ask for a replacement credential.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Endpoint that issues replacement credentials.
    pub refresh_url: Url,
    /// Method used for the refresh call.
    pub method: Method,
}

impl RefreshConfig {
    /// Refresh via POST against `refresh_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if the URL does not parse.
    pub fn new(refresh_url: &str) -> Result<Self, ApiError> {
        let refresh_url = Url::parse(refresh_url)
            .map_err(|err| ApiError::InvalidUrl(format!("{refresh_url}: {err}")))?;
        Ok(Self { refresh_url, method: Method::POST })
    }
}

/// Body of a successful refresh response.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
}

type Reply = oneshot::Sender<Result<Value, ApiError>>;
type ReplyReceiver = oneshot::Receiver<Result<Value, ApiError>>;

/// A request parked while a refresh is inflight.
///
/// Owned exclusively by the coordinator's queue from enqueue until the
/// replay loop takes it back out. The oneshot sender is consumed on send,
/// which makes "exactly one terminal result per request" a structural
/// property rather than a convention.
struct PendingRequest {
    descriptor: RequestDescriptor,
    reply: Reply,
}

#[derive(Default)]
struct CoordinatorState {
    refreshing: bool,
    generation: u64,
    pending: Vec<PendingRequest>,
}

/// How an unauthorized response should be handled.
pub(crate) enum Recovery {
    /// The request joined the pending queue; await the receiver for its
    /// terminal result.
    Queued(ReplyReceiver),
    /// The credential was already replaced after this request last read
    /// it. Re-execute directly instead of refreshing again.
    Superseded,
}

/// Single-flight refresh state machine with a FIFO retry queue.
///
/// Cheap to clone; clones share the same state. The refresh cycle runs on
/// its own spawned task so its lifetime is independent of whichever
/// caller happened to trigger it.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    executor: Arc<RequestExecutor>,
    store: Arc<dyn CredentialStore>,
    config: RefreshConfig,
    state: Mutex<CoordinatorState>,
}

impl RefreshCoordinator {
    pub fn new(
        executor: Arc<RequestExecutor>,
        store: Arc<dyn CredentialStore>,
        config: RefreshConfig,
    ) -> Self {
        Self {
            inner: Arc::new(CoordinatorInner {
                executor,
                store,
                config,
                state: Mutex::new(CoordinatorState::default()),
            }),
        }
    }

    /// Generation of the currently published credential.
    ///
    /// Callers record this before executing and pass it back to
    /// [`RefreshCoordinator::recover`] so the rejection of an already
    /// superseded credential cannot start a redundant refresh.
    pub(crate) fn generation(&self) -> u64 {
        self.inner.state.lock().generation
    }

    /// Park `descriptor` if a refresh is inflight.
    ///
    /// Returns the receiver to await when the request was queued, `None`
    /// when the caller should execute normally. Checking the flag and
    /// enqueueing happen under one lock, so a request cannot slip between
    /// "refresh started" and "queue swapped out for replay".
    pub(crate) fn park_if_refreshing(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Option<ReplyReceiver> {
        let mut state = self.inner.state.lock();
        if !state.refreshing {
            return None;
        }

        let (tx, rx) = oneshot::channel();
        state.pending.push(PendingRequest { descriptor: descriptor.clone(), reply: tx });
        Some(rx)
    }

    /// Route an unauthorized response into the refresh cycle.
    ///
    /// `observed_generation` is the generation the request executed
    /// under. If the credential has moved on since then, the rejection is
    /// stale and the request is told to retry with the current credential
    /// instead of queueing.
    pub(crate) fn recover(
        &self,
        descriptor: RequestDescriptor,
        observed_generation: u64,
    ) -> Recovery {
        let (tx, rx) = oneshot::channel();

        let start_cycle = {
            let mut state = self.inner.state.lock();
            if state.generation != observed_generation {
                return Recovery::Superseded;
            }

            state.pending.push(PendingRequest { descriptor, reply: tx });
            if state.refreshing {
                false
            } else {
                state.refreshing = true;
                true
            }
        };

        if start_cycle {
            // Run the cycle on its own task; a caller dropping its future
            // cannot strand the queue.
            let coordinator = self.clone();
            tokio::spawn(async move { coordinator.run_cycle().await });
        }

        Recovery::Queued(rx)
    }

    /// One full refresh cycle: fetch and publish the replacement
    /// credential, then drain and replay the queue.
    async fn run_cycle(self) {
        let refresh_result = self.refresh_credential().await;

        // Swap the queue out and return to idle in one critical section.
        // Requests arriving from here on belong to the next cycle, so the
        // replay loop below never touches a queue that is still growing.
        let parked = {
            let mut state = self.inner.state.lock();
            state.refreshing = false;
            if refresh_result.is_ok() {
                state.generation += 1;
            }
            mem::take(&mut state.pending)
        };

        match refresh_result {
            Ok(()) => {
                info!(replayed = parked.len(), "credential refreshed, replaying blocked requests");
                for request in parked {
                    let result = match self.inner.executor.execute(&request.descriptor).await {
                        Outcome::Success(payload) => Ok(payload),
                        Outcome::Failed(err) => Err(err),
                        // Rejected again under the fresh credential: surface
                        // the failure instead of refreshing a second time, so
                        // a server that rejects every credential cannot drive
                        // an endless refresh loop.
                        Outcome::Unauthorized => Err(ApiError::Unauthorized),
                    };
                    let _ = request.reply.send(result);
                }
            }
            Err(cause) => {
                warn!(
                    error = %cause,
                    dropped = parked.len(),
                    "credential refresh failed, failing queued requests"
                );
                for request in parked {
                    let _ = request.reply.send(Err(ApiError::RefreshFailed(cause.clone())));
                }
            }
        }
    }

    /// Call the refresh endpoint and publish the replacement credential.
    ///
    /// The refresh call goes through the same executor as ordinary
    /// requests, so it carries the usual headers and inherits the bounded
    /// transport-level retries for transient failures.
    async fn refresh_credential(&self) -> Result<(), String> {
        let config = &self.inner.config;
        debug!(url = %config.refresh_url, "requesting replacement credential");

        let descriptor =
            RequestDescriptor::from_parts(config.method.clone(), config.refresh_url.clone());

        let payload = match self.inner.executor.execute(&descriptor).await {
            Outcome::Success(payload) => payload,
            Outcome::Unauthorized => {
                return Err("refresh endpoint rejected the current credential".to_string());
            }
            Outcome::Failed(err) => return Err(err.to_string()),
        };

        let response: RefreshResponse = serde_json::from_value(payload)
            .map_err(|err| format!("unexpected refresh payload: {err}"))?;

        self.inner
            .store
            .write(Credential::new(response.access_token))
            .await
            .map_err(|err| err.to_string())?;

        Ok(())
    }
}
