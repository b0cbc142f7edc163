//! Vision-capable model trait.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TransportError;

/// One request to a vision-capable model: instructions, prompt text and an
/// optional screenshot.
#[derive(Debug, Clone, PartialEq)]
pub struct VisionRequest {
    /// Fixed system-level instruction
    pub system: String,

    /// Rendered user prompt
    pub prompt: String,

    /// Screenshot as bare base64 or a `data:` URI
    pub image: Option<String>,

    /// Ask the provider for JSON-only output
    pub json_output: bool,
}

impl VisionRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            image: None,
            json_output: true,
        }
    }

    /// Attach a screenshot. Empty payloads are treated as no screenshot.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        let image = image.into();
        self.image = (!image.trim().is_empty()).then_some(image);
        self
    }
}

/// A model that answers a [`VisionRequest`] with raw text.
///
/// Implementations return the response text exactly as produced; judging it
/// is the caller's job. Transport failures (network, timeout, quota,
/// cancellation) come back as [`TransportError`] and are never retried here.
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn complete(&self, request: VisionRequest) -> Result<String, TransportError>;
}

#[async_trait]
impl<M: VisionModel + ?Sized> VisionModel for Arc<M> {
    async fn complete(&self, request: VisionRequest) -> Result<String, TransportError> {
        (**self).complete(request).await
    }
}

#[async_trait]
impl<M: VisionModel + ?Sized> VisionModel for &M {
    async fn complete(&self, request: VisionRequest) -> Result<String, TransportError> {
        (**self).complete(request).await
    }
}
