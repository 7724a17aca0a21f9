//! RingStack Server - authenticated webhook receiver.
//!
//! This binary accepts status callbacks from a telephony/messaging provider,
//! verifies their `X-Twilio-Signature` against the shared auth token, and
//! answers with a TwiML document.
//!
//! # Usage
//!
//! ```text
//! TWILIO_AUTH_TOKEN=... PUBLIC_URL=https://hooks.example.com ringstack-server
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LISTEN_ADDR` | `0.0.0.0:4577` | Bind address |
//! | `PUBLIC_URL` | *(unset)* | Externally visible base URL the provider signs against |
//! | `TWILIO_AUTH_TOKEN` | *(unset)* | Shared secret used to verify signatures |
//! | `SKIP_SIGNATURE_VALIDATION` | `false` | Accept unsigned callbacks |
//! | `MAX_BODY_BYTES` | `1048576` | Request body limit |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod response;
mod service;

use std::future::Future;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use ringstack_auth::WebhookValidator;
use ringstack_core::RingStackConfig;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::service::{CallbackService, CallbackServiceConfig, VERSION};

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Build the [`CallbackServiceConfig`] from the application [`RingStackConfig`].
fn build_service_config(config: &RingStackConfig) -> CallbackServiceConfig {
    let validator = if config.skip_signature_validation {
        None
    } else {
        config.auth_token.as_deref().map(WebhookValidator::new)
    };

    CallbackServiceConfig {
        public_url: config.public_url.clone(),
        max_body_bytes: config.max_body_bytes,
        validator,
    }
}

/// Run the accept loop, serving connections until `shutdown` resolves.
async fn serve(
    listener: TcpListener,
    service: CallbackService,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let svc = service.clone();
                let conn = http.serve_connection(TokioIo::new(stream), svc);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    // Wait for in-flight requests to complete.
    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}

/// Resolve once Ctrl-C is received.
async fn ctrl_c() {
    tokio::signal::ctrl_c().await.ok();
    info!("received shutdown signal, draining connections");
}

/// Perform a health check by connecting to the server and requesting the health endpoint.
///
/// Exits with code 0 if the response is 200 OK and reports the server as
/// running, 1 otherwise.
async fn run_health_check(addr: &str) -> Result<()> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    let stream = TcpStream::connect(addr)
        .await
        .with_context(|| format!("cannot connect to {addr}"))?;

    let (mut reader, mut writer) = stream.into_split();

    let request = format!("GET /health HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    writer.write_all(request.as_bytes()).await?;
    writer.shutdown().await?;

    let mut response = String::new();
    reader.read_to_string(&mut response).await?;

    if response.contains("200 OK") && response.contains("\"running\"") {
        Ok(())
    } else {
        anyhow::bail!("unhealthy response from {addr}")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = RingStackConfig::from_env();

    // Handle --health-check flag for Docker HEALTHCHECK.
    if std::env::args().any(|a| a == "--health-check") {
        let addr = config.listen_addr.replace("0.0.0.0", "127.0.0.1");
        let healthy = run_health_check(&addr).await.is_ok();
        std::process::exit(i32::from(!healthy));
    }

    init_tracing(&config.log_level)?;
    config.validate()?;

    if config.skip_signature_validation {
        warn!("signature validation is disabled; every callback will be accepted");
    }
    if config.public_url.is_none() {
        warn!("PUBLIC_URL is not set; callback URLs are rebuilt from the Host header");
    }

    let service = CallbackService::new(build_service_config(&config));

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.listen_addr))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(
        %addr,
        public_url = ?config.public_url,
        skip_signature_validation = config.skip_signature_validation,
        version = VERSION,
        "starting RingStack Server",
    );

    serve(listener, service, ctrl_c()).await
}
