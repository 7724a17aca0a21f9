//! Webhook callback authentication for RingStack.
//!
//! Telephony and messaging providers sign every status callback they deliver.
//! The signature travels in the `X-Twilio-Signature` header and is computed as
//!
//! ```text
//! Base64(HMAC-SHA1(AuthToken, CallbackURL + CanonicalForm))
//! ```
//!
//! where `CanonicalForm` is every POST parameter, sorted by name, written as
//! `name value value ...` with no separators. Non-POST requests sign the URL
//! alone.
//!
//! This crate implements the receiving side: given a request, the URL the
//! provider was configured to call, and the shared auth token, it decides
//! whether the request is authentic.
//!
//! # Usage
//!
//! ```rust
//! use ringstack_auth::{FormParams, SIGNATURE_HEADER, WebhookValidator, sign_request};
//!
//! let url = "https://example.com/hook";
//! let form: FormParams = [("CallSid", "CA123"), ("CallStatus", "completed")]
//!     .into_iter()
//!     .collect();
//! let signature = sign_request("POST", url, Some(&form), b"12345");
//!
//! let req = http::Request::builder()
//!     .method("POST")
//!     .uri("/hook")
//!     .header("content-type", "application/x-www-form-urlencoded")
//!     .header(SIGNATURE_HEADER, signature)
//!     .body(b"CallStatus=completed&CallSid=CA123".to_vec())
//!     .unwrap();
//!
//! let validator = WebhookValidator::new("12345");
//! assert!(validator.verify(&req, url).unwrap());
//! ```
//!
//! # Modules
//!
//! - [`canonical`] - Canonical form and signing basis construction
//! - [`error`] - Authentication error types
//! - [`form`] - Multi-valued form parameters and strict body parsing
//! - [`request`] - The request capability trait the verifier consumes
//! - [`secret`] - Shared auth token wrapper
//! - [`signature`] - Signature computation and verification

pub mod canonical;
pub mod error;
pub mod form;
pub mod request;
pub mod secret;
pub mod signature;

pub use canonical::{build_canonical_form, build_signing_basis};
pub use error::AuthError;
pub use form::FormParams;
pub use request::{CallbackRequest, WebhookRequest};
pub use secret::AuthToken;
pub use signature::{
    SIGNATURE_HEADER, WebhookValidator, compute_signature, sign_request, verify_signature,
};
