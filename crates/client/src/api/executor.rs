//! Single-request execution and response classification.

use std::sync::Arc;

use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use tollgate_common::CredentialStore;

use super::descriptor::RequestDescriptor;
use crate::errors::ApiError;
use crate::http::HttpClient;

/// Name of the request header carrying the credential token.
pub const CREDENTIAL_HEADER: &str = "Access-Token";

/// Classified result of executing one request.
#[derive(Debug)]
pub enum Outcome {
    /// 2xx with a JSON body.
    Success(Value),
    /// 401: the credential was rejected.
    Unauthorized,
    /// Any other failure. Never touches refresh state.
    Failed(ApiError),
}

/// Executes one HTTP call and classifies the raw response.
///
/// The executor injects headers and interprets status codes; it knows
/// nothing about the refresh state machine or the retry queue, and its
/// only side effect is the network call itself.
pub struct RequestExecutor {
    http: HttpClient,
    store: Arc<dyn CredentialStore>,
}

impl RequestExecutor {
    pub fn new(http: HttpClient, store: Arc<dyn CredentialStore>) -> Self {
        Self { http, store }
    }

    /// Execute `descriptor` once and classify the response.
    pub async fn execute(&self, descriptor: &RequestDescriptor) -> Outcome {
        let mut request = self
            .http
            .request(descriptor.method().clone(), descriptor.url().clone())
            .header(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(credential) = self.store.read().await {
            request = request.header(CREDENTIAL_HEADER, credential.expose());
        }

        if let Some(body) = descriptor.body() {
            request = request.json(body);
        }

        debug!(method = %descriptor.method(), url = %descriptor.url(), "executing request");

        let response = match self.http.send(request).await {
            Ok(response) => response,
            Err(err) => return Outcome::Failed(err),
        };

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            debug!(url = %descriptor.url(), "credential rejected");
            return Outcome::Unauthorized;
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Outcome::Failed(classify_status(status, descriptor.url().as_str(), &body));
        }

        match response.json::<Value>().await {
            Ok(payload) => Outcome::Success(payload),
            Err(err) => Outcome::Failed(ApiError::MalformedResponse(err.to_string())),
        }
    }
}

fn classify_status(status: StatusCode, url: &str, body: &str) -> ApiError {
    let message = if body.is_empty() {
        format!("{url} returned status {status}")
    } else {
        format!("{url} returned status {status}: {body}")
    };

    if status.is_server_error() {
        ApiError::Server(message)
    } else {
        ApiError::Client(message)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqwest::Method;
    use serde_json::json;
    use tollgate_common::{Credential, InMemoryCredentialStore};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn executor(store: Arc<InMemoryCredentialStore>) -> RequestExecutor {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(5))
            .max_attempts(1)
            .build()
            .expect("http client");
        RequestExecutor::new(http, store)
    }

    fn descriptor(server: &MockServer, path: &str) -> RequestDescriptor {
        RequestDescriptor::new(Method::GET, &format!("{}{}", server.uri(), path))
            .expect("descriptor")
    }

    #[tokio::test]
    async fn sends_credential_header_when_present() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .and(header(CREDENTIAL_HEADER, "tok-1"))
            .and(header("Accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(InMemoryCredentialStore::with_credential(Credential::new("tok-1")));
        let outcome = executor(store).execute(&descriptor(&server, "/data")).await;

        assert!(matches!(outcome, Outcome::Success(payload) if payload == json!({"ok": true})));
    }

    #[tokio::test]
    async fn omits_credential_header_when_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let store = Arc::new(InMemoryCredentialStore::new());
        let outcome = executor(store).execute(&descriptor(&server, "/data")).await;
        assert!(matches!(outcome, Outcome::Success(_)));

        let requests = server.received_requests().await.expect("recorded requests");
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get(CREDENTIAL_HEADER).is_none());
    }

    #[tokio::test]
    async fn classifies_unauthorized_responses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let store = Arc::new(InMemoryCredentialStore::with_credential(Credential::new("stale")));
        let outcome = executor(store).execute(&descriptor(&server, "/data")).await;

        assert!(matches!(outcome, Outcome::Unauthorized));
    }

    #[tokio::test]
    async fn classifies_unparseable_success_bodies() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(200).set_body_string("definitely not json"))
            .mount(&server)
            .await;

        let store = Arc::new(InMemoryCredentialStore::new());
        let outcome = executor(store).execute(&descriptor(&server, "/data")).await;

        assert!(matches!(outcome, Outcome::Failed(ApiError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn classifies_status_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let store = Arc::new(InMemoryCredentialStore::new());
        let executor = executor(store);

        let outcome = executor.execute(&descriptor(&server, "/missing")).await;
        assert!(matches!(outcome, Outcome::Failed(ApiError::Client(_))));

        let outcome = executor.execute(&descriptor(&server, "/broken")).await;
        assert!(matches!(outcome, Outcome::Failed(ApiError::Server(_))));
    }

    #[tokio::test]
    async fn reports_transport_failures() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let executor = executor(store);

        // Nothing is listening on this port.
        let descriptor =
            RequestDescriptor::new(Method::GET, "http://127.0.0.1:9/unreachable").expect("url");
        let outcome = executor.execute(&descriptor).await;

        assert!(matches!(outcome, Outcome::Failed(ApiError::Network(_))));
    }
}
