//! Request descriptors.

use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::errors::ApiError;

/// Immutable description of a single API request.
///
/// Descriptors are what the retry queue holds: method, resolved URL, and
/// an optional JSON body. They are cloned into the queue rather than
/// aliased, so a replay can never observe later mutation by the caller.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    url: Url,
    body: Option<Value>,
}

impl RequestDescriptor {
    /// Build a descriptor, validating the URL up front.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if `url` does not parse as an
    /// absolute URL. This is the fail-fast path: an unparseable URL never
    /// reaches the network or the retry queue.
    pub fn new(method: Method, url: &str) -> Result<Self, ApiError> {
        let url = Url::parse(url).map_err(|err| ApiError::InvalidUrl(format!("{url}: {err}")))?;
        Ok(Self { method, url, body: None })
    }

    pub(crate) fn from_parts(method: Method, url: Url) -> Self {
        Self { method, url, body: None }
    }

    /// Attach a JSON body, carried verbatim through any replay.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}
