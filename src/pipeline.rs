//! End-to-end generation workflow.
//!
//! One logical workflow per invocation: submit, poll to completion, resolve
//! media, hand the clips to a rendering surface. Every failure is caught
//! exactly once here, classified, and rendered; nothing escapes
//! unclassified and nothing is silently swallowed. Overlapping invocations
//! are prevented by the UI collaborator (it disables its trigger control
//! while a run is in flight), not by the core.

use crate::classify::{ClassifiedError, ErrorKind};
use crate::error::Result;
use crate::poller::{FixedDelay, OperationPoller, DEFAULT_POLL_INTERVAL};
use crate::request::GenerationRequest;
use crate::resolver::{PlayableHandle, ResultResolver};
use crate::service::VideoService;
use std::time::Duration;

const GENERATING_STATUS: &str = "Generating...";
const DONE_STATUS: &str = "Done.";

/// Output collaborator: where clips, status text, and the quota affordance
/// land.
pub trait RenderSurface {
    /// Replaces the status line.
    fn set_status(&mut self, status: &str);

    /// Presents the finished clips, in generation order.
    fn present(&mut self, clips: Vec<PlayableHandle>);

    /// Raises the dedicated quota-exhaustion affordance.
    fn show_quota_notice(&mut self);
}

/// The full submit → poll → resolve pipeline over one service.
pub struct GenerationPipeline<S> {
    service: S,
    poll_interval: Duration,
    max_polls: Option<u32>,
    max_wait: Option<Duration>,
}

impl<S: VideoService> GenerationPipeline<S> {
    /// Creates a pipeline with the default 1 s poll interval and no poll
    /// bounds.
    pub fn new(service: S) -> Self {
        Self {
            service,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_polls: None,
            max_wait: None,
        }
    }

    /// Sets the fixed delay between status checks.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Bounds the number of status re-fetches per run.
    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = Some(max_polls);
        self
    }

    /// Bounds the total wall-clock wait per run.
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }

    /// Runs the request to completion and returns the playable clips.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<Vec<PlayableHandle>> {
        let mut poller = OperationPoller::new(&self.service)
            .with_delay(FixedDelay::new(self.poll_interval));
        if let Some(max_polls) = self.max_polls {
            poller = poller.with_max_polls(max_polls);
        }
        if let Some(max_wait) = self.max_wait {
            poller = poller.with_max_wait(max_wait);
        }

        let operation = poller.run(request).await?;
        ResultResolver::new(&self.service).resolve(&operation).await
    }

    /// Runs the request and renders the outcome.
    ///
    /// On success the surface receives the ordered clips and a success
    /// status. On failure the classified result decides the rendering:
    /// quota exhaustion clears the status text and raises the dedicated
    /// affordance; every other kind renders the classified message as
    /// status text.
    pub async fn run(&self, request: &GenerationRequest, surface: &mut dyn RenderSurface) {
        surface.set_status(GENERATING_STATUS);

        match self.generate(request).await {
            Ok(clips) => {
                surface.present(clips);
                surface.set_status(DONE_STATUS);
            }
            Err(error) => {
                let classified = ClassifiedError::classify(&error);
                tracing::warn!(kind = ?classified.kind, "video generation failed: {error}");
                if classified.kind == ErrorKind::QuotaExceeded {
                    surface.set_status("");
                    surface.show_quota_notice();
                } else {
                    surface.set_status(&classified.message);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockVideoService;

    #[derive(Default)]
    struct RecordingSurface {
        statuses: Vec<String>,
        presented: Vec<Vec<PlayableHandle>>,
        quota_notices: u32,
    }

    impl RenderSurface for RecordingSurface {
        fn set_status(&mut self, status: &str) {
            self.statuses.push(status.to_string());
        }

        fn present(&mut self, clips: Vec<PlayableHandle>) {
            self.presented.push(clips);
        }

        fn show_quota_notice(&mut self) {
            self.quota_notices += 1;
        }
    }

    fn fast_pipeline(service: MockVideoService) -> GenerationPipeline<MockVideoService> {
        GenerationPipeline::new(service).with_poll_interval(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_end_to_end_success() {
        let service = MockVideoService::new()
            .completing_after(2)
            .with_media_uris(["https://host/a", "https://host/b"]);
        let pipeline = fast_pipeline(service);
        let request = GenerationRequest::builder("a cat")
            .output_count(2)
            .build()
            .unwrap();
        let mut surface = RecordingSurface::default();

        pipeline.run(&request, &mut surface).await;

        assert_eq!(surface.statuses, ["Generating...", "Done."]);
        assert_eq!(surface.presented.len(), 1);
        assert_eq!(surface.presented[0].len(), 2);
        assert_eq!(surface.quota_notices, 0);
        assert_eq!(pipeline.service.poll_calls(), 2);
    }

    #[tokio::test]
    async fn test_quota_exhaustion_raises_affordance_and_clears_status() {
        let service = MockVideoService::new()
            .failing_submit(429, r#"{"error":{"code":429,"message":"quota"}}"#);
        let pipeline = fast_pipeline(service);
        let request = GenerationRequest::builder("a cat").build().unwrap();
        let mut surface = RecordingSurface::default();

        pipeline.run(&request, &mut surface).await;

        assert_eq!(surface.quota_notices, 1);
        assert_eq!(surface.statuses, ["Generating...", ""]);
        assert!(surface.presented.is_empty());
    }

    #[tokio::test]
    async fn test_service_error_renders_server_message() {
        let service = MockVideoService::new()
            .failing_submit(500, r#"{"error":{"code":500,"message":"server down"}}"#);
        let pipeline = fast_pipeline(service);
        let request = GenerationRequest::builder("a cat").build().unwrap();
        let mut surface = RecordingSurface::default();

        pipeline.run(&request, &mut surface).await;

        assert_eq!(surface.statuses.last().map(String::as_str), Some("server down"));
        assert_eq!(surface.quota_notices, 0);
    }

    #[tokio::test]
    async fn test_unstructured_error_body_passes_through_verbatim() {
        let service = MockVideoService::new().failing_submit(502, "bad gateway");
        let pipeline = fast_pipeline(service);
        let request = GenerationRequest::builder("a cat").build().unwrap();
        let mut surface = RecordingSurface::default();

        pipeline.run(&request, &mut surface).await;

        assert_eq!(surface.statuses.last().map(String::as_str), Some("bad gateway"));
    }

    #[tokio::test]
    async fn test_zero_outputs_render_as_no_videos_generated() {
        let service = MockVideoService::new().with_no_media();
        let pipeline = fast_pipeline(service);
        let request = GenerationRequest::builder("a cat").build().unwrap();
        let mut surface = RecordingSurface::default();

        pipeline.run(&request, &mut surface).await;

        assert_eq!(
            surface.statuses.last().map(String::as_str),
            Some("no videos generated")
        );
        assert!(surface.presented.is_empty());
    }

    #[tokio::test]
    async fn test_generate_returns_ordered_handles() {
        let service = MockVideoService::new().with_media_uris(["https://host/a", "https://host/b"]);
        let pipeline = fast_pipeline(service);
        let request = GenerationRequest::builder("a cat")
            .output_count(2)
            .build()
            .unwrap();

        let clips = pipeline.generate(&request).await.unwrap();
        let uris: Vec<&str> = clips.iter().map(|clip| clip.source_uri.as_str()).collect();
        assert_eq!(uris, ["https://host/a", "https://host/b"]);
    }
}
