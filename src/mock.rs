//! Scriptable in-memory [`VideoService`] for tests.
//!
//! Lets tests control exactly how many polls an operation takes, what media
//! it produces, and how individual fetches behave (bytes, latency, failure),
//! without a network.

use crate::error::{Result, VeoGenError};
use crate::operation::{MediaDescriptor, MediaRef, Operation, OperationResult, VideoResults};
use crate::poller::PollDelay;
use crate::request::GenerationRequest;
use crate::service::VideoService;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// A [`PollDelay`] that never waits.
pub struct NoDelay;

#[async_trait]
impl PollDelay for NoDelay {
    async fn wait(&self) {}
}

/// In-memory video service with scripted behavior.
pub struct MockVideoService {
    polls_until_done: u32,
    media_uris: Vec<String>,
    submit_failure: Option<(u16, String)>,
    poll_failure: Option<(u32, u16, String)>,
    fetch_bodies: HashMap<String, Vec<u8>>,
    fetch_latencies: HashMap<String, Duration>,
    fetch_failures: HashMap<String, (u16, String)>,
    submit_count: Mutex<u32>,
    poll_count: Mutex<u32>,
    fetched: Mutex<Vec<String>>,
}

impl MockVideoService {
    /// Creates a service whose operations complete on the first check and
    /// yield a single default clip.
    pub fn new() -> Self {
        Self {
            polls_until_done: 0,
            media_uris: vec!["https://example.com/files/clip.mp4".to_string()],
            submit_failure: None,
            poll_failure: None,
            fetch_bodies: HashMap::new(),
            fetch_latencies: HashMap::new(),
            fetch_failures: HashMap::new(),
            submit_count: Mutex::new(0),
            poll_count: Mutex::new(0),
            fetched: Mutex::new(Vec::new()),
        }
    }

    /// Operations report done only after `polls` status re-fetches.
    pub fn completing_after(mut self, polls: u32) -> Self {
        self.polls_until_done = polls;
        self
    }

    /// Media URIs the completed operation advertises, in order.
    pub fn with_media_uris<I, S>(mut self, uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.media_uris = uris.into_iter().map(Into::into).collect();
        self
    }

    /// The completed operation advertises no media at all.
    pub fn with_no_media(mut self) -> Self {
        self.media_uris.clear();
        self
    }

    /// Submission fails with the given status and body.
    pub fn failing_submit(mut self, status: u16, body: impl Into<String>) -> Self {
        self.submit_failure = Some((status, body.into()));
        self
    }

    /// The `nth` poll (1-based) fails with the given status and body.
    pub fn failing_poll_at(mut self, nth: u32, status: u16, body: impl Into<String>) -> Self {
        self.poll_failure = Some((nth, status, body.into()));
        self
    }

    /// Scripts the bytes returned for a URI. Unscripted URIs echo
    /// `bytes:<uri>`.
    pub fn with_fetch_body(mut self, uri: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.fetch_bodies.insert(uri.into(), body.into());
        self
    }

    /// Delays the fetch of a URI, for exercising completion-order handling.
    pub fn with_fetch_latency(mut self, uri: impl Into<String>, latency: Duration) -> Self {
        self.fetch_latencies.insert(uri.into(), latency);
        self
    }

    /// The fetch of a URI fails with the given status and body.
    pub fn failing_fetch(
        mut self,
        uri: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        self.fetch_failures.insert(uri.into(), (status, body.into()));
        self
    }

    /// Number of submissions performed.
    pub fn submit_calls(&self) -> u32 {
        *self.submit_count.lock().unwrap()
    }

    /// Number of status re-fetches performed.
    pub fn poll_calls(&self) -> u32 {
        *self.poll_count.lock().unwrap()
    }

    /// URIs fetched so far, in invocation order.
    pub fn fetched_uris(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    fn operation_at(&self, polls: u32) -> Operation {
        let done = polls >= self.polls_until_done;
        let response = done.then(|| OperationResult {
            generate_video_response: Some(VideoResults {
                generated_samples: Some(
                    self.media_uris
                        .iter()
                        .map(|uri| MediaDescriptor {
                            video: Some(MediaRef {
                                uri: Some(uri.clone()),
                                mime_type: None,
                            }),
                        })
                        .collect(),
                ),
            }),
        });

        Operation {
            name: "operations/mock".to_string(),
            done: Some(done),
            response,
            error: None,
        }
    }
}

impl Default for MockVideoService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VideoService for MockVideoService {
    async fn submit(&self, _request: &GenerationRequest) -> Result<Operation> {
        *self.submit_count.lock().unwrap() += 1;

        if let Some((status, body)) = &self.submit_failure {
            return Err(VeoGenError::Api {
                status: *status,
                body: body.clone(),
            });
        }
        Ok(self.operation_at(0))
    }

    async fn poll(&self, _operation: &Operation) -> Result<Operation> {
        let polls = {
            let mut count = self.poll_count.lock().unwrap();
            *count += 1;
            *count
        };

        if let Some((nth, status, body)) = &self.poll_failure {
            if polls == *nth {
                return Err(VeoGenError::Api {
                    status: *status,
                    body: body.clone(),
                });
            }
        }
        Ok(self.operation_at(polls))
    }

    async fn fetch(&self, uri: &str) -> Result<Vec<u8>> {
        self.fetched.lock().unwrap().push(uri.to_string());

        if let Some(latency) = self.fetch_latencies.get(uri) {
            tokio::time::sleep(*latency).await;
        }
        if let Some((status, body)) = self.fetch_failures.get(uri) {
            return Err(VeoGenError::Api {
                status: *status,
                body: body.clone(),
            });
        }
        Ok(self
            .fetch_bodies
            .get(uri)
            .cloned()
            .unwrap_or_else(|| format!("bytes:{uri}").into_bytes()))
    }
}
