//! Configuration management for RingStack.
//!
//! All configuration is driven by environment variables.

use std::fmt;

use tracing::warn;

use crate::error::{RingStackError, RingStackResult};

/// Default bind address of the webhook receiver.
pub const DEFAULT_LISTEN: &str = "0.0.0.0:4577";

/// Default cap on request body size (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1 << 20;

/// Global configuration for RingStack.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RingStackConfig {
    /// Bind address for the receiver.
    pub listen_addr: String,
    /// Externally visible base URL (`scheme://host[:port]`) the provider calls.
    ///
    /// Behind a reverse proxy the locally observed URL differs from the one the
    /// provider signed, so this must be set for verification to succeed.
    pub public_url: Option<String>,
    /// Shared auth token used to verify callback signatures.
    #[serde(skip_serializing)]
    pub auth_token: Option<String>,
    /// Accept callbacks without checking their signature.
    pub skip_signature_validation: bool,
    /// Log level.
    pub log_level: String,
    /// Largest request body the receiver will read.
    pub max_body_bytes: usize,
}

impl Default for RingStackConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN.to_owned(),
            public_url: None,
            auth_token: None,
            skip_signature_validation: false,
            log_level: "info".to_owned(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl fmt::Debug for RingStackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingStackConfig")
            .field("listen_addr", &self.listen_addr)
            .field("public_url", &self.public_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "***"))
            .field("skip_signature_validation", &self.skip_signature_validation)
            .field("log_level", &self.log_level)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

impl RingStackConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Unset keys keep their default. Empty `PUBLIC_URL` and
    /// `TWILIO_AUTH_TOKEN` values count as unset.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(v) = lookup("LISTEN_ADDR") {
            config.listen_addr = v;
        }
        if let Some(v) = lookup("PUBLIC_URL").filter(|v| !v.is_empty()) {
            config.public_url = Some(v.trim_end_matches('/').to_owned());
        }
        if let Some(v) = lookup("TWILIO_AUTH_TOKEN").filter(|v| !v.is_empty()) {
            config.auth_token = Some(v);
        }
        if let Some(v) = lookup("SKIP_SIGNATURE_VALIDATION") {
            config.skip_signature_validation = parse_bool(&v);
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Some(v) = lookup("MAX_BODY_BYTES") {
            match v.parse() {
                Ok(n) => config.max_body_bytes = n,
                Err(_) => warn!(value = %v, "ignoring invalid MAX_BODY_BYTES"),
            }
        }

        config
    }

    /// Check that the configuration can serve authenticated callbacks.
    ///
    /// # Errors
    ///
    /// Returns [`RingStackError::Config`] if signature validation is enabled
    /// without an auth token, or if `PUBLIC_URL` is not an http(s) URL.
    pub fn validate(&self) -> RingStackResult<()> {
        if !self.skip_signature_validation && self.auth_token.is_none() {
            return Err(RingStackError::Config(
                "TWILIO_AUTH_TOKEN must be set unless SKIP_SIGNATURE_VALIDATION is enabled"
                    .to_owned(),
            ));
        }
        if let Some(url) = &self.public_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(RingStackError::Config(format!(
                    "PUBLIC_URL must start with http:// or https://, got {url}"
                )));
            }
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
