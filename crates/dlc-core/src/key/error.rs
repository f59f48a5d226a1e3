//! Key derivation error type.

use thiserror::Error;

/// The requested source/destination pair cannot be turned into a transfer key.
///
/// Returned by `Coordinator::start` before any state is touched; the call
/// should be treated as not issued.
#[derive(Debug, Error)]
pub enum KeyDerivationError {
    #[error("invalid source locator {source_url:?}: {reason}")]
    InvalidSource { source_url: String, reason: String },

    #[error("unsupported source scheme: {0}")]
    UnsupportedScheme(String),

    #[error("no usable file name for {source_url:?}")]
    NoFileName { source_url: String },

    #[error("destination directory is empty")]
    EmptyDirectory,

    #[error("cannot resolve working directory: {0}")]
    WorkingDirectory(#[source] std::io::Error),
}
