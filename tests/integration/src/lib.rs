//! Integration tests for RingStack server.
//!
//! These tests require a running RingStack server at `localhost:4577`,
//! started with `TWILIO_AUTH_TOKEN` and `PUBLIC_URL` matching
//! [`auth_token`] and [`endpoint_url`]. They are marked `#[ignore]` so they
//! don't run during normal `cargo test`.
//!
//! Run them with:
//! ```text
//! cargo test -p ringstack-integration -- --ignored
//! ```

use std::sync::Once;

use ringstack_auth::{FormParams, SIGNATURE_HEADER, sign_request};

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Endpoint URL for the server, as configured in its `PUBLIC_URL`.
#[must_use]
pub fn endpoint_url() -> String {
    std::env::var("RINGSTACK_ENDPOINT_URL").unwrap_or_else(|_| "http://localhost:4577".to_owned())
}

/// Auth token the server was started with.
#[must_use]
pub fn auth_token() -> String {
    std::env::var("RINGSTACK_AUTH_TOKEN").unwrap_or_else(|_| "12345".to_owned())
}

/// Create an HTTP client for talking to the server.
#[must_use]
pub fn http_client() -> reqwest::Client {
    init_tracing();
    reqwest::Client::new()
}

/// A minimal call status callback form with a unique call id.
#[must_use]
pub fn call_status_form(status: &str) -> FormParams {
    let sid = format!("CA{}", uuid::Uuid::new_v4().simple());
    [
        ("AccountSid", "AC00000000000000000000000000000000"),
        ("CallSid", sid.as_str()),
        ("CallStatus", status),
        ("From", "+15550001111"),
        ("To", "+15552223333"),
    ]
    .into_iter()
    .collect()
}

/// POST `form` to `path`, signed for the server's public URL with `token`.
///
/// # Errors
///
/// Returns an error if the request cannot be sent.
pub async fn post_signed(
    client: &reqwest::Client,
    path: &str,
    form: &FormParams,
    token: &str,
) -> anyhow::Result<reqwest::Response> {
    let url = format!("{}{path}", endpoint_url());
    let signature = sign_request("POST", &url, Some(form), token.as_bytes());
    tracing::debug!(%url, "posting signed callback");

    Ok(client
        .post(&url)
        .header(SIGNATURE_HEADER, signature)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(form.to_urlencoded())
        .send()
        .await?)
}

mod test_callback;
mod test_health;
