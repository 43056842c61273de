//! # Design
//!
//! - Delivery failures are reported, never retried.
//! - Keep the HTTP status and Slack's error code for operators.

use reqwest::StatusCode;
use thiserror::Error;

/// Result alias for notification operations.
pub type NotifyResult<T> = Result<T, NotifyError>;

/// Errors raised while delivering a summary.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    Client {
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// A configured URL could not be parsed.
    #[error("invalid URL '{value}'")]
    InvalidUrl {
        /// Offending value.
        value: String,
        /// Underlying parse error.
        source: url::ParseError,
    },
    /// The request could not be sent or the response body could not be read.
    #[error("slack request failed")]
    Transport {
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// Slack answered with a non-200 status.
    #[error("slack API returned {status}")]
    Status {
        /// HTTP status received.
        status: StatusCode,
        /// Response body, trimmed.
        body: String,
    },
    /// The response body was not the expected JSON envelope.
    #[error("invalid slack API response")]
    Decode {
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// Slack accepted the request but rejected the message.
    #[error("slack API rejected message: {error}")]
    Rejected {
        /// Slack error code, e.g. `channel_not_found`.
        error: String,
    },
}
