//! Configuration and shared error types for RingStack.
//!
//! This crate holds what the webhook receiver needs before it can accept a
//! single request: environment-driven configuration and the error type used
//! while assembling the server.

mod config;
mod error;

pub use config::RingStackConfig;
pub use error::{RingStackError, RingStackResult};
