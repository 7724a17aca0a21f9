//! Error types for callback authentication.
//!
//! A signature that is present but wrong is *not* an error: it is reported as
//! `Ok(false)` by the verifier. [`AuthError`] only covers the cases where no
//! comparison could take place.

/// Errors that prevent a callback signature from being compared.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The request declared a form-encoded body that could not be parsed.
    #[error("Malformed form body: {0}")]
    MalformedBody(String),

    /// The `X-Twilio-Signature` header is absent or empty.
    #[error("Request is missing X-Twilio-Signature header")]
    MissingSignature,
}

impl AuthError {
    /// Shorthand for a [`AuthError::MalformedBody`] with the given reason.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedBody(reason.into())
    }

    /// Whether the caller never attempted to authenticate.
    #[must_use]
    pub fn is_missing_signature(&self) -> bool {
        matches!(self, Self::MissingSignature)
    }

    /// Whether the request body could not be decoded.
    #[must_use]
    pub fn is_malformed_body(&self) -> bool {
        matches!(self, Self::MalformedBody(_))
    }
}
