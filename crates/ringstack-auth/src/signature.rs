//! Callback signature computation and verification.
//!
//! ```text
//! Signature = Base64(HMAC-SHA1(AuthToken, SigningBasis))
//! ```
//!
//! The signature is carried in the [`SIGNATURE_HEADER`] header. Verification
//! has three outcomes:
//!
//! - `Ok(true)`: the header matches the locally computed signature.
//! - `Ok(false)`: the header is present but does not match.
//! - `Err(_)`: the header is missing, or the form body could not be parsed.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, KeyInit, Mac};
use sha1::Sha1;
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::canonical::{build_signing_basis, is_post};
use crate::error::AuthError;
use crate::form::FormParams;
use crate::request::WebhookRequest;
use crate::secret::AuthToken;

type HmacSha1 = Hmac<Sha1>;

/// Header carrying the provider's signature.
pub const SIGNATURE_HEADER: &str = "X-Twilio-Signature";

/// Compute `Base64(HMAC-SHA1(secret, basis))` with the standard padded alphabet.
///
/// # Examples
///
/// ```
/// use ringstack_auth::compute_signature;
///
/// let sig = compute_signature(b"12345", b"https://example.com/hook");
/// assert_eq!(sig.len(), 28);
/// assert!(sig.ends_with('='));
/// ```
#[must_use]
pub fn compute_signature(secret: &[u8], basis: &[u8]) -> String {
    let mut mac =
        <HmacSha1 as KeyInit>::new_from_slice(secret).expect("HMAC can accept any key length");
    mac.update(basis);
    let result = mac.finalize().into_bytes();
    BASE64.encode(result)
}

/// Produce the signature a provider would attach to a callback.
///
/// `form` is only folded into the signature for `POST` requests.
#[must_use]
pub fn sign_request(method: &str, url: &str, form: Option<&FormParams>, secret: &[u8]) -> String {
    compute_signature(secret, &build_signing_basis(method, url, form))
}

/// Verify that `req` was signed by a holder of `secret` for `url`.
///
/// `url` must be the URL the provider called, as the provider saw it. Behind
/// a proxy that rewrites scheme or host this differs from the URL the server
/// observes, and the caller has to supply the external one.
///
/// # Errors
///
/// Returns [`AuthError::MalformedBody`] if the request is a POST whose form
/// body cannot be parsed (no signature is computed in that case), or
/// [`AuthError::MissingSignature`] if the signature header is absent or empty.
pub fn verify_signature<R>(req: &R, url: &str, secret: &[u8]) -> Result<bool, AuthError>
where
    R: WebhookRequest + ?Sized,
{
    let method = req.method();

    let form = if is_post(method) {
        Some(req.form()?)
    } else {
        None
    };

    let basis = build_signing_basis(method, url, form.as_ref());
    let expected = compute_signature(secret, &basis);

    let provided = match req.header(SIGNATURE_HEADER) {
        Some(value) if !value.is_empty() => value,
        _ => return Err(AuthError::MissingSignature),
    };

    if provided.ct_eq(expected.as_bytes()).into() {
        debug!(%method, %url, "callback signature verified");
        Ok(true)
    } else {
        debug!(
            %method,
            %url,
            provided = %String::from_utf8_lossy(provided),
            "callback signature mismatch"
        );
        Ok(false)
    }
}

/// Verifies callbacks against a single shared auth token.
///
/// Cheap to clone and safe to share across connections; it holds no state
/// beyond the token.
#[derive(Debug, Clone)]
pub struct WebhookValidator {
    token: AuthToken,
}

impl WebhookValidator {
    /// Create a validator for the given auth token.
    pub fn new(token: impl Into<AuthToken>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Verify `req` against `url`. See [`verify_signature`].
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if the body is malformed or the signature
    /// header is missing.
    pub fn verify<R>(&self, req: &R, url: &str) -> Result<bool, AuthError>
    where
        R: WebhookRequest + ?Sized,
    {
        verify_signature(req, url, self.token.as_bytes())
    }

    /// Sign a callback with this validator's token.
    #[must_use]
    pub fn sign(&self, method: &str, url: &str, form: Option<&FormParams>) -> String {
        sign_request(method, url, form, self.token.as_bytes())
    }
}
