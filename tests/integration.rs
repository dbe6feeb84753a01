use pretty_assertions::assert_eq;
use std::time::Duration;
use veogen::{
    ClassifiedError, ErrorKind, GenerationPipeline, GenerationRequest, PlayableHandle,
    RenderSurface, VeoClient, VeoGenError,
};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SUBMIT_PATH: &str = "/v1beta/models/veo-2.0-generate-001:predictLongRunning";
const OPERATION_PATH: &str = "/v1beta/operations/xyz";

fn make_client(server: &MockServer) -> VeoClient {
    VeoClient::builder()
        .api_key("test-key")
        .base_url(server.uri())
        .build()
        .unwrap()
}

fn fast_pipeline(client: VeoClient) -> GenerationPipeline<VeoClient> {
    GenerationPipeline::new(client).with_poll_interval(Duration::from_millis(1))
}

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

#[tokio::test]
async fn test_full_pipeline_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SUBMIT_PATH))
        .and(body_string_contains(r#""prompt":"a cat""#))
        .and(body_string_contains(r#""numberOfVideos":2"#))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "operations/xyz",
            "done": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    // One pending status check, then completion with two clips.
    Mock::given(method("GET"))
        .and(path(OPERATION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "operations/xyz",
            "done": false
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(OPERATION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "operations/xyz",
            "done": true,
            "response": {"generateVideoResponse": {"generatedSamples": [
                {"video": {"uri": format!("{}/files/a.mp4", server.uri())}},
                {"video": {"uri": format!("{}/files/b.mp4", server.uri())}}
            ]}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Downloads must carry the API key as a query parameter.
    Mock::given(method("GET"))
        .and(path("/files/a.mp4"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"clip-a".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/files/b.mp4"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"clip-b".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = fast_pipeline(make_client(&server));
    let request = GenerationRequest::builder("a cat")
        .output_count(2)
        .build()
        .unwrap();
    let mut surface = RecordingSurface::default();

    pipeline.run(&request, &mut surface).await;

    assert_eq!(surface.statuses, vec!["Generating...", "Done."]);
    assert_eq!(surface.quota_notices, 0);
    assert_eq!(surface.presented.len(), 1);

    let clips = &surface.presented[0];
    assert_eq!(clips.len(), 2);
    assert_eq!(clips[0].data, b"clip-a");
    assert_eq!(clips[1].data, b"clip-b");
    assert_eq!(clips[0].mime_type, "video/mp4");
}

#[tokio::test]
async fn test_reference_image_rides_as_inline_data() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SUBMIT_PATH))
        .and(body_string_contains(r#""mimeType":"image/png""#))
        .and(body_string_contains(r#""data":"aGVsbG8=""#))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "operations/xyz",
            "done": true,
            "response": {"generateVideoResponse": {"generatedSamples": [
                {"video": {"uri": format!("{}/files/a.mp4", server.uri())}}
            ]}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/files/a.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"clip-a".to_vec()))
        .mount(&server)
        .await;

    let pipeline = fast_pipeline(make_client(&server));
    let request = GenerationRequest::builder("animate this")
        .reference_image("aGVsbG8=")
        .build()
        .unwrap();

    // Already done at submission: no status re-fetches happen at all.
    let clips = pipeline.generate(&request).await.unwrap();
    assert_eq!(clips.len(), 1);
}

#[tokio::test]
async fn test_quota_exhaustion_end_to_end() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SUBMIT_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_string(
            r#"{"error":{"code":429,"message":"Resource has been exhausted"}}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = fast_pipeline(make_client(&server));
    let request = GenerationRequest::builder("a cat").build().unwrap();
    let mut surface = RecordingSurface::default();

    pipeline.run(&request, &mut surface).await;

    assert_eq!(surface.quota_notices, 1);
    assert_eq!(surface.statuses, vec!["Generating...", ""]);
    assert!(surface.presented.is_empty());
}

#[tokio::test]
async fn test_server_error_body_survives_to_classification() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SUBMIT_PATH))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_string(r#"{"error":{"code":500,"message":"server down"}}"#),
        )
        .mount(&server)
        .await;

    let pipeline = fast_pipeline(make_client(&server));
    let request = GenerationRequest::builder("a cat").build().unwrap();

    let error = pipeline.generate(&request).await.unwrap_err();
    assert!(matches!(error, VeoGenError::Api { status: 500, .. }));

    let classified = ClassifiedError::classify(&error);
    assert_eq!(classified.kind, ErrorKind::Service);
    assert_eq!(classified.message, "server down");
}

#[tokio::test]
async fn test_completed_operation_without_media_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SUBMIT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "operations/xyz",
            "done": true,
            "response": {"generateVideoResponse": {"generatedSamples": []}}
        })))
        .mount(&server)
        .await;

    let pipeline = fast_pipeline(make_client(&server));
    let request = GenerationRequest::builder("a cat").build().unwrap();

    let error = pipeline.generate(&request).await.unwrap_err();
    assert!(matches!(error, VeoGenError::NoMediaGenerated));
}
