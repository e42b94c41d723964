//! Error types for the notification system.

use thiserror::Error;

/// Errors that abort a single dispatch.
///
/// These are setup or programming defects and always reach the caller.
/// Transport failures are a separate type, see [`TransportError`].
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A required destination setting is missing
    #[error("Destination not configured: {0}")]
    Configuration(String),

    /// The configured accent color is not a `#RRGGBB` code
    #[error("Invalid color code {value:?}: {reason}")]
    Format {
        /// The offending input
        value: String,
        /// What is wrong with it
        reason: &'static str,
    },

    /// The payload lacks a field the matched rendering rule reads
    #[error("Payload is missing required field `{0}`")]
    MissingField(&'static str),
}

/// Errors raised while delivering a message to the webhook endpoint.
///
/// Has no conversion into [`DispatchError`]. The client logs and drops these
/// at its delivery boundary.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limited by the service
    #[error("Rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds the endpoint asked us to wait
        retry_after_secs: u64,
    },

    /// Endpoint answered with a non-success status
    #[error("Webhook returned {status}: {body}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },
}

/// Result alias for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;
