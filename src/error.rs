//! Error types for the generation pipeline.

use std::time::Duration;

/// Errors that can occur while generating and resolving videos.
#[derive(Debug, thiserror::Error)]
pub enum VeoGenError {
    /// API key missing or unresolvable.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Request inputs failed validation before submission.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A completed operation produced no playable media.
    #[error("no videos generated")]
    NoMediaGenerated,

    /// A completed operation carried an embedded failure payload.
    #[error("video generation failed: {message}")]
    OperationFailed {
        /// Status code embedded in the operation's error payload.
        code: Option<u32>,
        /// Server-supplied failure message.
        message: String,
    },

    /// The API returned a non-success status. The body is kept verbatim
    /// so classification can inspect the structured error envelope.
    #[error("API error: {status}: {body}")]
    Api {
        /// HTTP status code of the response.
        status: u16,
        /// Raw response body text.
        body: String,
    },

    /// Network or HTTP-level failure.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A server reply was well-formed HTTP but not the shape we expect.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// A poll guard tripped before the operation completed.
    #[error("operation still running after {polls} polls ({waited:?})")]
    PollBudgetExhausted {
        /// Status re-fetches performed before giving up.
        polls: u32,
        /// Wall-clock time spent waiting.
        waited: Duration,
    },

    /// I/O error (e.g. saving a clip).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, VeoGenError>;
