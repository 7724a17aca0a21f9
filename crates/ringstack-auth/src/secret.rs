//! Shared auth token wrapper.

use std::fmt;

/// The secret shared between the webhook provider and this service.
///
/// Used as the HMAC key. The value is never printed: [`fmt::Debug`] output is
/// redacted so the token cannot leak through `tracing` fields or panics.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(Vec<u8>);

impl AuthToken {
    /// Wrap raw secret bytes.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self(secret.into())
    }

    /// The raw secret bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

impl From<String> for AuthToken {
    fn from(value: String) -> Self {
        Self(value.into_bytes())
    }
}

impl From<&str> for AuthToken {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for AuthToken {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}
