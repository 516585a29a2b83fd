//! Error types for HTTP operations.

use thiserror::Error;

/// Error type for HTTP transport operations.
///
/// Only covers failures where no response was received. A response with an
/// error status is still a response and is reported through
/// [`HttpResponse`](super::HttpResponse).
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network connection failed.
    ///
    /// This includes DNS resolution failures, connection refused,
    /// and other network-level errors.
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// The provided URL is invalid.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
