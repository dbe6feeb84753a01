//! Generation request assembly and validation.

use crate::error::{Result, VeoGenError};
use serde::{Deserialize, Serialize};

/// Media type of the accepted reference-image upload format.
pub const REFERENCE_IMAGE_MIME: &str = "image/png";

/// A reference image riding along with a prompt.
///
/// `data` is the transport-safe base64 text produced by the upload adapter;
/// encoding raw bytes is the adapter's job, not this crate's. Built through
/// [`GenerationRequestBuilder`], which guarantees the payload is non-empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceImage {
    /// Base64-encoded image bytes.
    pub data: String,
    /// Media-type tag, fixed to [`REFERENCE_IMAGE_MIME`].
    pub mime_type: String,
}

/// A request to generate one or more videos.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The text prompt describing the desired video.
    pub prompt: String,
    /// Optional reference image steering the generation.
    pub reference_image: Option<ReferenceImage>,
    /// How many videos to request. Always >= 1; the server remains the
    /// source of truth for how many it actually honors.
    pub output_count: u32,
}

impl GenerationRequest {
    /// Starts building a request for the given prompt.
    pub fn builder(prompt: impl Into<String>) -> GenerationRequestBuilder {
        GenerationRequestBuilder::new(prompt)
    }
}

/// Builder for [`GenerationRequest`].
#[derive(Debug, Clone)]
pub struct GenerationRequestBuilder {
    prompt: String,
    encoded_image: String,
    output_count: i64,
}

impl GenerationRequestBuilder {
    /// Creates a builder with the given prompt and an output count of 1.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            encoded_image: String::new(),
            output_count: 1,
        }
    }

    /// Sets the base64-encoded reference image.
    ///
    /// An empty string leaves the image out of the request entirely; the
    /// wire payload omits the field rather than sending it empty.
    pub fn reference_image(mut self, encoded: impl Into<String>) -> Self {
        self.encoded_image = encoded.into();
        self
    }

    /// Sets the number of videos to request.
    pub fn output_count(mut self, count: i64) -> Self {
        self.output_count = count;
        self
    }

    /// Validates and assembles the request.
    ///
    /// Rejects a non-positive output count rather than clamping it, so a
    /// bad value from an input widget surfaces instead of being masked.
    pub fn build(self) -> Result<GenerationRequest> {
        let output_count = u32::try_from(self.output_count)
            .ok()
            .filter(|count| *count >= 1)
            .ok_or_else(|| {
                VeoGenError::InvalidRequest(format!(
                    "output count must be a positive integer, got {}",
                    self.output_count
                ))
            })?;

        let reference_image = if self.encoded_image.is_empty() {
            None
        } else {
            Some(ReferenceImage {
                data: self.encoded_image,
                mime_type: REFERENCE_IMAGE_MIME.to_string(),
            })
        };

        Ok(GenerationRequest {
            prompt: self.prompt,
            reference_image,
            output_count,
        })
    }
}
