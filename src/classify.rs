//! Failure classification for user-facing reporting.
//!
//! Every failure that escapes the pipeline passes through here exactly once
//! before it reaches a rendering surface. Quota exhaustion gets its own
//! category because the UI treats it differently from everything else.

use crate::error::VeoGenError;
use serde::Deserialize;

/// Status code the API uses for rate-limit/quota exhaustion.
const RATE_LIMIT_CODE: u32 = 429;

/// Category of a classified failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rate limit or quota exhausted; the UI shows a dedicated affordance.
    QuotaExceeded,
    /// Structured server error other than quota.
    Service,
    /// Network-level failure, or an error body that isn't structured data.
    Transport,
    /// Invalid input shape, or a "successful" result with nothing in it.
    Malformed,
}

/// A failure digest ready for display.
///
/// `message` is empty for [`ErrorKind::QuotaExceeded`]: the UI shows a fixed
/// affordance for quota exhaustion rather than server text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedError {
    /// Failure category.
    pub kind: ErrorKind,
    /// Display text; server message, raw text, or empty for quota.
    pub message: String,
}

/// Structured error envelope the API embeds in failure bodies:
/// `{"error": {"code": 429, "message": "..."}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    code: u32,
    #[serde(default)]
    message: String,
}

impl ClassifiedError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Classifies a pipeline failure. Total: never fails or panics.
    pub fn classify(error: &VeoGenError) -> Self {
        match error {
            VeoGenError::Api { body, .. } => Self::from_raw_text(body),
            VeoGenError::OperationFailed { code, message } => {
                if *code == Some(RATE_LIMIT_CODE) {
                    Self::new(ErrorKind::QuotaExceeded, "")
                } else {
                    Self::new(ErrorKind::Service, message.clone())
                }
            }
            VeoGenError::Auth(_)
            | VeoGenError::InvalidRequest(_)
            | VeoGenError::NoMediaGenerated
            | VeoGenError::UnexpectedResponse(_) => {
                Self::new(ErrorKind::Malformed, error.to_string())
            }
            VeoGenError::Network(_)
            | VeoGenError::PollBudgetExhausted { .. }
            | VeoGenError::Io(_) => Self::new(ErrorKind::Transport, error.to_string()),
        }
    }

    /// Classifies raw failure text via a speculative structured parse.
    ///
    /// Tries the `{"error": {"code", "message"}}` envelope first; anything
    /// that doesn't parse degrades to [`ErrorKind::Transport`] with the text
    /// carried through verbatim.
    pub fn from_raw_text(raw: &str) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(raw) {
            Ok(envelope) if envelope.error.code == RATE_LIMIT_CODE => {
                Self::new(ErrorKind::QuotaExceeded, "")
            }
            Ok(envelope) => Self::new(ErrorKind::Service, envelope.error.message),
            Err(_) => Self::new(ErrorKind::Transport, raw),
        }
    }
}
