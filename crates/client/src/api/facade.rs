//! Public entry point for issuing requests.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use tollgate_common::CredentialStore;

use super::coordinator::{Recovery, RefreshConfig, RefreshCoordinator};
use super::descriptor::RequestDescriptor;
use super::executor::{Outcome, RequestExecutor};
use crate::errors::ApiError;
use crate::http::HttpClient;

/// Configuration for the API client.
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL joined with the path helpers (e.g. "https://api.example.com/v1").
    pub base_url: String,
    /// Timeout for a single request attempt.
    pub timeout: Duration,
    /// Total transport attempts per HTTP call (initial try + retries).
    pub max_attempts: usize,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.example.com/v1".to_string(),
            timeout: Duration::from_secs(30),
            max_attempts: 3,
        }
    }
}

/// Request facade with transparent credential recovery.
///
/// One instance per remote API, constructed at the application's
/// composition root and shared by reference; there is deliberately no
/// process-wide singleton.
pub struct ApiClient {
    executor: Arc<RequestExecutor>,
    coordinator: RefreshCoordinator,
    config: ApiClientConfig,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(
        config: ApiClientConfig,
        refresh: RefreshConfig,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self, ApiError> {
        let http = HttpClient::builder()
            .timeout(config.timeout)
            .max_attempts(config.max_attempts)
            .build()?;

        let executor = Arc::new(RequestExecutor::new(http, Arc::clone(&store)));
        let coordinator = RefreshCoordinator::new(Arc::clone(&executor), store, refresh);

        Ok(Self { executor, coordinator, config })
    }

    /// Create a builder for fluent configuration.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Issue a request against an absolute URL.
    ///
    /// Exactly one terminal result is produced per call, including
    /// requests that ride through a refresh-and-replay cycle. An
    /// unparseable URL fails here, synchronously, before any network I/O.
    ///
    /// # Errors
    ///
    /// See [`ApiError`]; `Unauthorized` surfaces only when the server
    /// rejects a freshly refreshed credential.
    #[instrument(skip(self), fields(method = %method, url = %url))]
    pub async fn request(&self, method: Method, url: &str) -> Result<Value, ApiError> {
        let descriptor = RequestDescriptor::new(method, url)?;
        self.dispatch(descriptor).await
    }

    /// Issue a request carrying a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    #[instrument(skip(self, body), fields(method = %method, url = %url))]
    pub async fn request_with_body(
        &self,
        method: Method,
        url: &str,
        body: Value,
    ) -> Result<Value, ApiError> {
        let descriptor = RequestDescriptor::new(method, url)?.with_body(body);
        self.dispatch(descriptor).await
    }

    /// GET `path` under the configured base URL.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.request(Method::GET, &self.endpoint(path)).await
    }

    /// GET `path` and decode the payload into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MalformedResponse`] if the payload does not
    /// decode into `T`.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let payload = self.get(path).await?;
        serde_json::from_value(payload).map_err(|err| ApiError::MalformedResponse(err.to_string()))
    }

    /// POST `body` to `path` under the configured base URL.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Value, ApiError> {
        let body = serde_json::to_value(body)
            .map_err(|err| ApiError::Client(format!("failed to serialize body: {err}")))?;
        self.request_with_body(Method::POST, &self.endpoint(path), body).await
    }

    /// PUT `body` to `path` under the configured base URL.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn put<T: Serialize>(&self, path: &str, body: &T) -> Result<Value, ApiError> {
        let body = serde_json::to_value(body)
            .map_err(|err| ApiError::Client(format!("failed to serialize body: {err}")))?;
        self.request_with_body(Method::PUT, &self.endpoint(path), body).await
    }

    /// DELETE `path` under the configured base URL.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.request(Method::DELETE, &self.endpoint(path)).await
    }

    async fn dispatch(&self, descriptor: RequestDescriptor) -> Result<Value, ApiError> {
        // A refresh already inflight means the current credential is known
        // stale; join the queue instead of racing it to the server.
        if let Some(receiver) = self.coordinator.park_if_refreshing(&descriptor) {
            debug!(url = %descriptor.url(), "refresh inflight, request queued");
            return Self::await_reply(receiver).await;
        }

        let mut retried_after_supersede = false;
        loop {
            let generation = self.coordinator.generation();
            match self.executor.execute(&descriptor).await {
                Outcome::Success(payload) => return Ok(payload),
                Outcome::Failed(err) => return Err(err),
                Outcome::Unauthorized => {
                    match self.coordinator.recover(descriptor.clone(), generation) {
                        Recovery::Queued(receiver) => return Self::await_reply(receiver).await,
                        Recovery::Superseded if !retried_after_supersede => {
                            debug!(url = %descriptor.url(), "credential already replaced, retrying");
                            retried_after_supersede = true;
                        }
                        Recovery::Superseded => return Err(ApiError::Unauthorized),
                    }
                }
            }
        }
    }

    async fn await_reply(
        receiver: tokio::sync::oneshot::Receiver<Result<Value, ApiError>>,
    ) -> Result<Value, ApiError> {
        match receiver.await {
            Ok(result) => result,
            Err(_) => {
                Err(ApiError::RefreshFailed("refresh cycle dropped the queued request".into()))
            }
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }
}

/// Builder for [`ApiClient`].
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<ApiClientConfig>,
    refresh_url: Option<String>,
    store: Option<Arc<dyn CredentialStore>>,
}

impl ApiClientBuilder {
    /// Set the client configuration.
    pub fn config(mut self, config: ApiClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the endpoint that issues replacement credentials.
    pub fn refresh_url(mut self, url: impl Into<String>) -> Self {
        self.refresh_url = Some(url.into());
        self
    }

    /// Set the credential store.
    pub fn store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the API client.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing or client creation
    /// fails.
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let config = self.config.unwrap_or_default();
        let store =
            self.store.ok_or_else(|| ApiError::Config("credential store not set".to_string()))?;
        let refresh_url = self
            .refresh_url
            .ok_or_else(|| ApiError::Config("refresh URL not set".to_string()))?;
        let refresh = RefreshConfig::new(&refresh_url)?;

        ApiClient::new(config, refresh, store)
    }
}
