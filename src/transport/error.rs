//! Error types for HTTP operations.

use thiserror::Error;

/// Error type for outbound HTTP operations.
///
/// Describes what went wrong at the transport level. Whether the failure
/// is fatal is decided by the caller: the probe reports it for the current
/// cycle only, a channel reports it for the current event only.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network connection failed.
    ///
    /// This includes DNS resolution failures, connection refused,
    /// TLS failures and broken response bodies.
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request timed out inside the HTTP client.
    #[error("Request timed out")]
    Timeout,

    /// The request could not be built from the given URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
