//! Error types for the RingStack core.

/// Core error type for RingStack infrastructure.
#[derive(Debug, thiserror::Error)]
pub enum RingStackError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience result type for RingStack operations.
pub type RingStackResult<T> = Result<T, RingStackError>;
