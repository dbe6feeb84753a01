//! The remote-service contract the pipeline runs against.

use crate::error::Result;
use crate::operation::Operation;
use crate::request::GenerationRequest;
use async_trait::async_trait;

/// What the pipeline needs from the video-generation service.
///
/// Implementations must not interpret server failures; they surface them
/// raw, and classification happens once at the top of the workflow.
#[async_trait]
pub trait VideoService: Send + Sync {
    /// Submits a generation request, returning the initial operation handle.
    async fn submit(&self, request: &GenerationRequest) -> Result<Operation>;

    /// Re-fetches an operation's status. Idempotent; may return the
    /// operation unchanged.
    async fn poll(&self, operation: &Operation) -> Result<Operation>;

    /// Fetches the byte content behind a resolved media URI.
    async fn fetch(&self, uri: &str) -> Result<Vec<u8>>;
}
