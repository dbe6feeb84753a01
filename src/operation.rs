//! Long-running operation handle and its result payload.
//!
//! An [`Operation`] is an opaque server-side job. The client never assumes
//! completion: the handle is only updated by re-fetching it, and it is
//! terminal once `done` is reported true.

use crate::error::{Result, VeoGenError};
use serde::Deserialize;

/// Fallback media type when a descriptor doesn't carry one.
const DEFAULT_MEDIA_MIME: &str = "video/mp4";

/// Server-side handle for an in-flight or finished generation job.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Server-assigned operation name; the key used to re-fetch status.
    pub name: String,
    /// Completion flag. Absent means still running.
    #[serde(default)]
    pub done: Option<bool>,
    /// Result payload, present once the operation succeeds.
    #[serde(default)]
    pub response: Option<OperationResult>,
    /// Embedded failure payload, present once the operation fails.
    #[serde(default)]
    pub error: Option<OperationError>,
}

/// Result payload of a completed operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult {
    /// Video-generation results.
    #[serde(default)]
    pub generate_video_response: Option<VideoResults>,
}

/// The media list inside a completed operation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResults {
    /// Generated artifacts, one descriptor per requested video.
    /// `generatedVideos` is the older name for the same list.
    #[serde(default, alias = "generatedVideos")]
    pub generated_samples: Option<Vec<MediaDescriptor>>,
}

/// Reference to one generated media artifact. Immutable once received.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaDescriptor {
    /// The artifact's remote location.
    #[serde(default)]
    pub video: Option<MediaRef>,
}

impl MediaDescriptor {
    /// Download URI of the artifact, if the descriptor carries one.
    pub fn uri(&self) -> Option<&str> {
        self.video.as_ref().and_then(|media| media.uri.as_deref())
    }

    /// Media type of the artifact, defaulting to `video/mp4`.
    pub fn mime_type(&self) -> &str {
        self.video
            .as_ref()
            .and_then(|media| media.mime_type.as_deref())
            .unwrap_or(DEFAULT_MEDIA_MIME)
    }
}

/// Remote media location plus fetch metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRef {
    /// Possibly percent-escaped download URI.
    #[serde(default)]
    pub uri: Option<String>,
    /// Media type reported by the server.
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// Failure payload embedded in a finished operation.
#[derive(Debug, Clone, Deserialize)]
pub struct OperationError {
    /// Status code of the failure.
    #[serde(default)]
    pub code: Option<u32>,
    /// Human-readable failure message.
    #[serde(default)]
    pub message: Option<String>,
}

impl Operation {
    /// Whether the server has reported this operation terminal.
    pub fn is_done(&self) -> bool {
        self.done.unwrap_or(false)
    }

    /// Extracts the media descriptors from a completed operation.
    ///
    /// The embedded failure payload wins over any response content. A done
    /// operation whose media list is missing or empty is a failure, not a
    /// vacuous success: the caller always expects at least one artifact.
    pub fn media_descriptors(&self) -> Result<&[MediaDescriptor]> {
        if let Some(error) = &self.error {
            return Err(VeoGenError::OperationFailed {
                code: error.code,
                message: error
                    .message
                    .clone()
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        let descriptors = self
            .response
            .as_ref()
            .and_then(|result| result.generate_video_response.as_ref())
            .and_then(|results| results.generated_samples.as_deref())
            .unwrap_or(&[]);

        if descriptors.is_empty() {
            return Err(VeoGenError::NoMediaGenerated);
        }
        Ok(descriptors)
    }
}
