//! Error type for backend requests.
//!
//! [`TransportError`] is the only error the chat client surfaces. A request
//! either yields its full result or one of these; there are no partial
//! results and no retries.

/// Failure of a single request against the chat backend.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection failure, timeout, or a body that did not decode.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("{url} returned {status}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    /// The configured server URL cannot carry API paths.
    #[error("invalid server URL: {0}")]
    InvalidUrl(String),

    /// The task running the request ended without a result.
    #[error("request interrupted: {0}")]
    Interrupted(String),
}
