#![warn(missing_docs)]
//! Veogen - client pipeline for Google Veo video generation.
//!
//! Submits a text prompt (plus an optional reference image) as a
//! long-running operation, polls it to completion, resolves the returned
//! media references into locally playable clips, and classifies failures
//! for differentiated user feedback.
//!
//! # Quick Start
//!
//! ```no_run
//! use veogen::{GenerationPipeline, GenerationRequest, VeoClient};
//!
//! #[tokio::main]
//! async fn main() -> veogen::Result<()> {
//!     let client = VeoClient::builder().build()?; // key from GOOGLE_API_KEY
//!     let pipeline = GenerationPipeline::new(client);
//!
//!     let request = GenerationRequest::builder("A cat playing with a ball")
//!         .output_count(2)
//!         .build()?;
//!
//!     let clips = pipeline.generate(&request).await?;
//!     for (index, clip) in clips.iter().enumerate() {
//!         clip.save(format!("clip-{index}.mp4"))?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Driving a UI
//!
//! [`GenerationPipeline::run`] renders the outcome onto a
//! [`RenderSurface`]: the ordered clips and a status line on success, and
//! on failure a classified message - with quota exhaustion routed to a
//! dedicated affordance instead of status text.

mod classify;
mod client;
mod error;
mod operation;
mod pipeline;
mod poller;
mod request;
mod resolver;
mod service;

pub mod mock;

pub use classify::{ClassifiedError, ErrorKind};
pub use client::{VeoClient, VeoClientBuilder, VeoModel};
pub use error::{Result, VeoGenError};
pub use operation::{
    MediaDescriptor, MediaRef, Operation, OperationError, OperationResult, VideoResults,
};
pub use pipeline::{GenerationPipeline, RenderSurface};
pub use poller::{FixedDelay, OperationPoller, PollDelay, DEFAULT_POLL_INTERVAL};
pub use request::{
    GenerationRequest, GenerationRequestBuilder, ReferenceImage, REFERENCE_IMAGE_MIME,
};
pub use resolver::{PlayableHandle, ResultResolver};
pub use service::VideoService;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::classify::{ClassifiedError, ErrorKind};
    pub use crate::client::VeoClient;
    pub use crate::error::{Result, VeoGenError};
    pub use crate::pipeline::{GenerationPipeline, RenderSurface};
    pub use crate::request::GenerationRequest;
    pub use crate::resolver::PlayableHandle;
    pub use crate::service::VideoService;
}
