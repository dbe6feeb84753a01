//! Veo REST client: the network adapter behind [`VideoService`].

use crate::error::{Result, VeoGenError};
use crate::operation::Operation;
use crate::request::GenerationRequest;
use crate::service::VideoService;
use async_trait::async_trait;
use serde::Serialize;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Veo model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VeoModel {
    /// Veo 2 - Google's video generation model.
    #[default]
    Veo2,
}

impl VeoModel {
    /// Returns the API model identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Veo2 => "veo-2.0-generate-001",
        }
    }
}

/// Builder for [`VeoClient`].
#[derive(Debug, Clone)]
pub struct VeoClientBuilder {
    api_key: Option<String>,
    model: VeoModel,
    base_url: String,
}

impl Default for VeoClientBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            model: VeoModel::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl VeoClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to the `GOOGLE_API_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the Veo model variant.
    pub fn model(mut self, model: VeoModel) -> Self {
        self.model = model;
        self
    }

    /// Overrides the API base URL. Mainly for pointing tests at a local
    /// mock server.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Builds the client, resolving the API key.
    pub fn build(self) -> Result<VeoClient> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .ok_or_else(|| {
                VeoGenError::Auth("GOOGLE_API_KEY not set and no API key provided".into())
            })?;

        Ok(VeoClient {
            client: reqwest::Client::new(),
            api_key,
            model: self.model,
            base_url: self.base_url,
        })
    }
}

/// REST client for the Veo video-generation API.
pub struct VeoClient {
    client: reqwest::Client,
    api_key: String,
    model: VeoModel,
    base_url: String,
}

impl VeoClient {
    /// Creates a new [`VeoClientBuilder`].
    pub fn builder() -> VeoClientBuilder {
        VeoClientBuilder::new()
    }

    /// Returns the configured model.
    pub fn model(&self) -> VeoModel {
        self.model
    }

    /// Reads an operation out of a response, preserving non-2xx bodies
    /// verbatim for classification.
    async fn read_operation(&self, response: reqwest::Response) -> Result<Operation> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VeoGenError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl VideoService for VeoClient {
    async fn submit(&self, request: &GenerationRequest) -> Result<Operation> {
        let url = format!(
            "{}/v1beta/models/{}:predictLongRunning",
            self.base_url,
            self.model.as_str(),
        );
        let body = GenerateVideosPayload::from_request(request);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let operation = self.read_operation(response).await?;
        tracing::debug!(operation = %operation.name, "submitted video generation request");
        Ok(operation)
    }

    async fn poll(&self, operation: &Operation) -> Result<Operation> {
        let url = format!("{}/v1beta/{}", self.base_url, operation.name);

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        self.read_operation(response).await
    }

    async fn fetch(&self, uri: &str) -> Result<Vec<u8>> {
        // The API key must ride along on file downloads, both as a header
        // and as a query parameter (known SDK requirement).
        let response = self
            .client
            .get(uri)
            .query(&[("key", &self.api_key)])
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VeoGenError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

// ── Wire format ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateVideosPayload<'a> {
    instances: Vec<Instance<'a>>,
    parameters: Parameters,
}

#[derive(Debug, Serialize)]
struct Instance<'a> {
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<MediaPayload<'a>>,
}

/// Inline media wrapper (`{"inlineData": {"mimeType": "...", "data": "..."}}`).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MediaPayload<'a> {
    inline_data: InlinePayload<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlinePayload<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Parameters {
    number_of_videos: u32,
}

impl<'a> GenerateVideosPayload<'a> {
    fn from_request(request: &'a GenerationRequest) -> Self {
        let image = request.reference_image.as_ref().map(|image| MediaPayload {
            inline_data: InlinePayload {
                mime_type: &image.mime_type,
                data: &image.data,
            },
        });

        Self {
            instances: vec![Instance {
                prompt: &request.prompt,
                image,
            }],
            parameters: Parameters {
                number_of_videos: request.output_count,
            },
        }
    }
}
