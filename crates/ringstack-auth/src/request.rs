//! The request capability the verifier consumes.
//!
//! [`verify_signature`](crate::verify_signature) does not depend on any HTTP
//! server type. It needs three things from a request: the method, a
//! case-insensitive header lookup, and the parsed form body (or the reason it
//! could not be parsed). [`WebhookRequest`] captures exactly that.

use crate::error::AuthError;
use crate::form::FormParams;

/// Minimal view of an incoming callback request.
pub trait WebhookRequest {
    /// The HTTP method, e.g. `"POST"`.
    fn method(&self) -> &str;

    /// Raw value of the header `name`, looked up case-insensitively.
    fn header(&self, name: &str) -> Option<&[u8]>;

    /// The parsed form body.
    ///
    /// Only consulted for POST requests. A body that is not form-encoded
    /// yields an empty form.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MalformedBody`] if a declared form body cannot be
    /// decoded.
    fn form(&self) -> Result<FormParams, AuthError>;
}

impl<B: AsRef<[u8]>> WebhookRequest for http::Request<B> {
    fn method(&self) -> &str {
        http::Request::method(self).as_str()
    }

    fn header(&self, name: &str) -> Option<&[u8]> {
        self.headers().get(name).map(http::HeaderValue::as_bytes)
    }

    fn form(&self) -> Result<FormParams, AuthError> {
        parse_form_body(self.headers(), self.body().as_ref())
    }
}

/// Parse `body` as a form when `headers` declare
/// `application/x-www-form-urlencoded`.
///
/// A missing `Content-Type` or any other media type produces an empty form.
///
/// # Errors
///
/// Returns [`AuthError::MalformedBody`] if the `Content-Type` header cannot be
/// parsed or the form body itself is malformed.
pub fn parse_form_body(headers: &http::HeaderMap, body: &[u8]) -> Result<FormParams, AuthError> {
    let Some(content_type) = headers.get(http::header::CONTENT_TYPE) else {
        return Ok(FormParams::new());
    };

    let content_type = content_type
        .to_str()
        .map_err(|_| AuthError::malformed("Content-Type header is not visible ASCII"))?;
    let media: mime::Mime = content_type
        .parse()
        .map_err(|e| AuthError::malformed(format!("invalid Content-Type {content_type:?}: {e}")))?;

    if media.type_() == mime::APPLICATION && media.subtype() == mime::WWW_FORM_URLENCODED {
        FormParams::parse(body)
    } else {
        Ok(FormParams::new())
    }
}

/// An owned, framework-independent [`WebhookRequest`].
///
/// # Examples
///
/// ```
/// use ringstack_auth::{CallbackRequest, FormParams, WebhookRequest};
///
/// let req = CallbackRequest::new("POST")
///     .with_header("X-Twilio-Signature", "abc=")
///     .with_form([("CallSid", "CA1")].into_iter().collect::<FormParams>());
///
/// assert_eq!(req.header("x-twilio-signature"), Some(&b"abc="[..]));
/// assert_eq!(req.form().unwrap().first("CallSid"), Some("CA1"));
/// ```
#[derive(Debug, Clone)]
pub struct CallbackRequest {
    method: String,
    headers: Vec<(String, Vec<u8>)>,
    form: Result<FormParams, AuthError>,
}

impl CallbackRequest {
    /// Create a request with the given method, no headers and an empty form.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            headers: Vec::new(),
            form: Ok(FormParams::new()),
        }
    }

    /// Add a header. Earlier headers with the same name take precedence on lookup.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the parsed form body.
    #[must_use]
    pub fn with_form(mut self, form: FormParams) -> Self {
        self.form = Ok(form);
        self
    }

    /// Record that the form body could not be parsed.
    #[must_use]
    pub fn with_form_error(mut self, reason: impl Into<String>) -> Self {
        self.form = Err(AuthError::malformed(reason));
        self
    }
}

impl WebhookRequest for CallbackRequest {
    fn method(&self) -> &str {
        &self.method
    }

    fn header(&self, name: &str) -> Option<&[u8]> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_slice())
    }

    fn form(&self) -> Result<FormParams, AuthError> {
        self.form.clone()
    }
}
