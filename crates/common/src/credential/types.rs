//! Credential value type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque credential token proving caller identity to the remote API.
///
/// The token text is hidden from `Debug` and `Display` output so request
/// logging can never leak it; use [`Credential::expose`] at the single
/// point where the token is written into a request header.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Borrow the raw token text for header injection.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl From<String> for Credential {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for Credential {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exposes_the_raw_token() {
        let credential = Credential::new("tok-123");
        assert_eq!(credential.expose(), "tok-123");
    }

    #[test]
    fn debug_and_display_are_redacted() {
        let credential = Credential::new("super-secret");
        assert_eq!(format!("{credential:?}"), "Credential(<redacted>)");
        assert_eq!(format!("{credential}"), "<redacted>");
        assert!(!format!("{credential:?}").contains("super-secret"));
    }

    #[test]
    fn equality_compares_token_text() {
        assert_eq!(Credential::new("a"), Credential::from("a"));
        assert_ne!(Credential::new("a"), Credential::new("b"));
    }

    #[test]
    fn serializes_as_a_bare_string() {
        let credential = Credential::new("tok-123");
        let json = serde_json::to_string(&credential).unwrap();
        assert_eq!(json, "\"tok-123\"");

        let parsed: Credential = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, credential);
    }
}
