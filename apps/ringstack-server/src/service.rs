//! Hyper service that authenticates provider callbacks.
//!
//! Each request goes through the same pipeline:
//!
//! 1. Health probes (`GET /health`, `GET /_health`) are answered directly.
//! 2. The body is collected, up to the configured limit.
//! 3. The URL the provider called is reconstructed from `PUBLIC_URL` (or the
//!    `Host` header) plus the request path and query.
//! 4. The signature is verified and the callback is answered with TwiML, or
//!    rejected with a status code that tells the failure modes apart.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Incoming;
use ringstack_auth::{AuthError, FormParams, WebhookRequest, WebhookValidator};
use ringstack_twiml::Response as TwimlResponse;
use tracing::{debug, info, warn};

use crate::response::{
    CallbackBody, add_common_headers, error_response, health_response, twiml_response,
};

/// Server version reported in health check responses.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configuration for the callback service.
#[derive(Debug, Clone)]
pub struct CallbackServiceConfig {
    /// Externally visible base URL, without a trailing slash.
    pub public_url: Option<String>,
    /// Largest request body that will be read.
    pub max_body_bytes: usize,
    /// Validator for incoming signatures; `None` accepts every callback.
    pub validator: Option<WebhookValidator>,
}

/// Hyper `Service` implementation for provider callbacks.
#[derive(Debug, Clone)]
pub struct CallbackService {
    config: Arc<CallbackServiceConfig>,
}

impl CallbackService {
    /// Create a new `CallbackService`.
    pub fn new(config: CallbackServiceConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl hyper::service::Service<http::Request<Incoming>> for CallbackService {
    type Response = http::Response<CallbackBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let config = Arc::clone(&self.config);
        let request_id = uuid::Uuid::new_v4().to_string();

        Box::pin(async move {
            let response = process_request(req, &config).await;
            Ok(add_common_headers(response, &request_id))
        })
    }
}

/// Process a single request through the full pipeline.
async fn process_request(
    req: http::Request<Incoming>,
    config: &CallbackServiceConfig,
) -> http::Response<CallbackBody> {
    let (parts, incoming) = req.into_parts();

    if is_health_check(&parts.method, parts.uri.path()) {
        return health_response(VERSION);
    }

    let body = match collect_body(incoming, config.max_body_bytes).await {
        Ok(body) => body,
        Err(response) => return response,
    };

    handle_callback(&http::Request::from_parts(parts, body), config)
}

/// Collect the incoming body into a single `Bytes` buffer.
async fn collect_body(
    incoming: Incoming,
    limit: usize,
) -> Result<Bytes, http::Response<CallbackBody>> {
    match Limited::new(incoming, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            warn!(limit, "request body exceeds limit");
            Err(error_response(
                http::StatusCode::PAYLOAD_TOO_LARGE,
                "request body too large",
            ))
        }
        Err(e) => {
            warn!(error = %e, "failed to read request body");
            Err(error_response(
                http::StatusCode::BAD_REQUEST,
                "failed to read request body",
            ))
        }
    }
}

/// Authenticate a fully buffered callback and build the reply.
pub fn handle_callback(
    req: &http::Request<Bytes>,
    config: &CallbackServiceConfig,
) -> http::Response<CallbackBody> {
    let url = claimed_url(req, config.public_url.as_deref());
    let method = req.method();

    let Some(validator) = &config.validator else {
        debug!(%method, %url, "signature validation disabled, accepting callback");
        return twiml_response(&TwimlResponse::new());
    };

    match validator.verify(req, &url) {
        Ok(true) => {
            let form = req.form().unwrap_or_default();
            let (sid, status) = describe_callback(&form);
            info!(%method, %url, sid, status, "accepted callback");
            twiml_response(&TwimlResponse::new())
        }
        Ok(false) => {
            warn!(%method, %url, "rejected callback with invalid signature");
            error_response(http::StatusCode::FORBIDDEN, "invalid signature")
        }
        Err(AuthError::MissingSignature) => {
            warn!(%method, %url, "rejected callback without signature");
            error_response(http::StatusCode::UNAUTHORIZED, "missing signature")
        }
        Err(e @ AuthError::MalformedBody(_)) => {
            warn!(%method, %url, error = %e, "rejected callback with malformed body");
            error_response(http::StatusCode::BAD_REQUEST, &e.to_string())
        }
    }
}

/// Reconstruct the URL the provider called.
///
/// The request path and query are appended to `public_url` when it is set.
/// Otherwise the `Host` header (or the request authority) is used with an
/// `http` scheme, which only matches when no proxy sits in front.
fn claimed_url<B>(req: &http::Request<B>, public_url: Option<&str>) -> String {
    let path_and_query = req
        .uri()
        .path_and_query()
        .map_or("/", http::uri::PathAndQuery::as_str);

    if let Some(base) = public_url {
        return format!("{base}{path_and_query}");
    }

    let host = req
        .headers()
        .get(http::header::HOST)
        .and_then(|v| v.to_str().ok())
        .or_else(|| req.uri().authority().map(http::uri::Authority::as_str))
        .unwrap_or("localhost");

    format!("http://{host}{path_and_query}")
}

/// Pick the resource id and status out of a call or message callback.
fn describe_callback(form: &FormParams) -> (&str, &str) {
    let sid = form
        .first("CallSid")
        .or_else(|| form.first("MessageSid"))
        .unwrap_or("-");
    let status = form
        .first("CallStatus")
        .or_else(|| form.first("MessageStatus"))
        .or_else(|| form.first("SmsStatus"))
        .unwrap_or("-");
    (sid, status)
}

/// Check if the request is a health check probe.
fn is_health_check(method: &http::Method, path: &str) -> bool {
    *method == http::Method::GET && (path == "/health" || path == "/_health")
}

#[cfg(test)]
mod tests {
    use ringstack_auth::{SIGNATURE_HEADER, sign_request};

    use super::*;

    const TOKEN: &str = "12345";
    const PUBLIC_URL: &str = "https://hooks.example.com";

    fn config(validate: bool) -> CallbackServiceConfig {
        CallbackServiceConfig {
            public_url: Some(PUBLIC_URL.to_owned()),
            max_body_bytes: 1024,
            validator: validate.then(|| WebhookValidator::new(TOKEN)),
        }
    }

    fn status_callback(signature: Option<&str>, body: &'static str) -> http::Request<Bytes> {
        let mut builder = http::Request::builder()
            .method("POST")
            .uri("/status?tenant=a")
            .header("host", "10.0.0.7:4577")
            .header("content-type", "application/x-www-form-urlencoded");
        if let Some(signature) = signature {
            builder = builder.header(SIGNATURE_HEADER, signature);
        }
        builder.body(Bytes::from_static(body.as_bytes())).unwrap()
    }

    fn sign(body: &str) -> String {
        let form = FormParams::parse(body.as_bytes()).unwrap();
        sign_request(
            "POST",
            "https://hooks.example.com/status?tenant=a",
            Some(&form),
            TOKEN.as_bytes(),
        )
    }

    #[test]
    fn test_should_accept_signed_callback() {
        let body = "CallSid=CA1&CallStatus=completed";
        let req = status_callback(Some(&sign(body)), body);

        let response = handle_callback(&req, &config(true));
        assert_eq!(response.status(), http::StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(http::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("application/xml"),
        );
    }

    #[test]
    fn test_should_accept_signed_callback_with_non_utf8_value() {
        let body = "CallSid=CA1&Body=%FF%FE";
        let req = status_callback(Some(&sign(body)), body);

        let response = handle_callback(&req, &config(true));
        assert_eq!(response.status(), http::StatusCode::OK);
    }

    #[test]
    fn test_should_reject_tampered_callback() {
        let signature = sign("CallSid=CA1&CallStatus=completed");
        let req = status_callback(Some(&signature), "CallSid=CA1&CallStatus=failed");

        let response = handle_callback(&req, &config(true));
        assert_eq!(response.status(), http::StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_should_reject_unsigned_callback() {
        let req = status_callback(None, "CallSid=CA1");
        let response = handle_callback(&req, &config(true));
        assert_eq!(response.status(), http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_should_reject_malformed_body() {
        let req = status_callback(Some("anything"), "CallSid=%ZZ");
        let response = handle_callback(&req, &config(true));
        assert_eq!(response.status(), http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_should_accept_anything_when_validation_disabled() {
        let req = status_callback(None, "CallSid=CA1");
        let response = handle_callback(&req, &config(false));
        assert_eq!(response.status(), http::StatusCode::OK);
    }

    #[test]
    fn test_should_build_claimed_url_from_public_url() {
        let req = status_callback(None, "");
        assert_eq!(
            claimed_url(&req, Some(PUBLIC_URL)),
            "https://hooks.example.com/status?tenant=a"
        );
    }

    #[test]
    fn test_should_fall_back_to_host_header() {
        let req = status_callback(None, "");
        assert_eq!(claimed_url(&req, None), "http://10.0.0.7:4577/status?tenant=a");

        let req = http::Request::builder()
            .uri("http://proxy.local/hook")
            .body(())
            .unwrap();
        assert_eq!(claimed_url(&req, None), "http://proxy.local/hook");
    }

    #[test]
    fn test_should_describe_call_and_message_callbacks() {
        let call = FormParams::parse(b"CallSid=CA1&CallStatus=ringing").unwrap();
        assert_eq!(describe_callback(&call), ("CA1", "ringing"));

        let message = FormParams::parse(b"MessageSid=SM1&MessageStatus=delivered").unwrap();
        assert_eq!(describe_callback(&message), ("SM1", "delivered"));

        assert_eq!(describe_callback(&FormParams::new()), ("-", "-"));
    }

    #[test]
    fn test_should_detect_health_check_paths() {
        assert!(is_health_check(&http::Method::GET, "/health"));
        assert!(is_health_check(&http::Method::GET, "/_health"));
        assert!(!is_health_check(&http::Method::POST, "/health"));
        assert!(!is_health_check(&http::Method::GET, "/status"));
    }
}
