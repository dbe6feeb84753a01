//! Resolution of completed operations into locally playable clips.

use crate::error::{Result, VeoGenError};
use crate::operation::{MediaDescriptor, Operation};
use crate::service::VideoService;
use futures::future;
use percent_encoding::percent_decode_str;
use std::path::Path;

/// A locally playable clip: fetched bytes plus what a rendering surface
/// needs to play them.
///
/// The caller owns the handle and drops it when the clip leaves the screen;
/// the buffer is transient in-memory data, nothing is persisted.
#[derive(Debug, Clone)]
pub struct PlayableHandle {
    /// Raw media bytes.
    pub data: Vec<u8>,
    /// MIME type (e.g. "video/mp4").
    pub mime_type: String,
    /// Decoded URI the bytes were fetched from.
    pub source_uri: String,
}

impl PlayableHandle {
    /// Returns the size of the media data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Returns the clip as a data URL, the passback format for embedding
    /// directly in a rendering surface.
    pub fn to_data_url(&self) -> String {
        use base64::Engine;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.data);
        format!("data:{};base64,{}", self.mime_type, encoded)
    }

    /// Saves the clip to the specified path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }
}

/// Turns a completed operation's media descriptors into playable handles.
pub struct ResultResolver<'a, S: ?Sized> {
    service: &'a S,
}

impl<'a, S: VideoService + ?Sized> ResultResolver<'a, S> {
    /// Creates a resolver fetching through the given service.
    pub fn new(service: &'a S) -> Self {
        Self { service }
    }

    /// Resolves every descriptor of a completed operation.
    ///
    /// All fetches run concurrently; the first failure cancels the rest and
    /// fails the whole resolution, so there are no partial results. The
    /// returned handles keep the descriptor order no matter which fetch
    /// finishes first.
    pub async fn resolve(&self, operation: &Operation) -> Result<Vec<PlayableHandle>> {
        let descriptors = operation.media_descriptors()?;
        tracing::debug!(count = descriptors.len(), "resolving generated media");

        future::try_join_all(
            descriptors
                .iter()
                .map(|descriptor| self.resolve_one(descriptor)),
        )
        .await
    }

    async fn resolve_one(&self, descriptor: &MediaDescriptor) -> Result<PlayableHandle> {
        let raw = descriptor.uri().ok_or_else(|| {
            VeoGenError::UnexpectedResponse("media descriptor carries no download URI".into())
        })?;

        let uri = percent_decode_str(raw)
            .decode_utf8()
            .map_err(|error| {
                VeoGenError::UnexpectedResponse(format!("undecodable media URI {raw:?}: {error}"))
            })?
            .into_owned();

        let data = self.service.fetch(&uri).await?;
        Ok(PlayableHandle {
            data,
            mime_type: descriptor.mime_type().to_string(),
            source_uri: uri,
        })
    }
}
