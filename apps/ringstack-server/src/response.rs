//! Response construction for the callback receiver.

use bytes::Bytes;
use http_body_util::Full;
use ringstack_twiml::Response as TwimlResponse;
use tracing::error;

/// Response body used by every receiver response.
pub type CallbackBody = Full<Bytes>;

/// Content type of TwiML replies.
pub const TWIML_CONTENT_TYPE: &str = "application/xml";

/// Serialize `twiml` into a `200 OK` response.
pub fn twiml_response(twiml: &TwimlResponse) -> http::Response<CallbackBody> {
    match twiml.to_xml() {
        Ok(xml) => http::Response::builder()
            .status(http::StatusCode::OK)
            .header(http::header::CONTENT_TYPE, TWIML_CONTENT_TYPE)
            .body(Full::new(Bytes::from(xml)))
            .expect("static TwiML response should be valid"),
        Err(e) => {
            error!(error = %e, "failed to serialize TwiML response");
            error_response(
                http::StatusCode::INTERNAL_SERVER_ERROR,
                "failed to build reply",
            )
        }
    }
}

/// A plain-text error response.
pub fn error_response(status: http::StatusCode, message: &str) -> http::Response<CallbackBody> {
    http::Response::builder()
        .status(status)
        .header(http::header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from(format!("{message}\n"))))
        .expect("static error response should be valid")
}

/// Health check response reporting the running version.
pub fn health_response(version: &str) -> http::Response<CallbackBody> {
    let body = serde_json::json!({ "status": "running", "version": version });
    http::Response::builder()
        .status(http::StatusCode::OK)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .expect("static health response should be valid")
}

/// Add headers common to every receiver response.
pub fn add_common_headers(
    mut response: http::Response<CallbackBody>,
    request_id: &str,
) -> http::Response<CallbackBody> {
    let headers = response.headers_mut();

    if let Ok(hv) = http::HeaderValue::from_str(request_id) {
        headers.entry("x-request-id").or_insert(hv);
    }

    headers.insert("server", http::HeaderValue::from_static("RingStack"));

    response
}
