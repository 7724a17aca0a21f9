//! Error types for TwiML serialization.

use std::io;

/// Errors that can occur while writing a TwiML document.
#[derive(Debug, thiserror::Error)]
pub enum TwimlError {
    /// An I/O error while writing to the destination.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An error from the underlying quick-xml library.
    #[error("XML processing error: {0}")]
    QuickXml(#[from] quick_xml::Error),
}
