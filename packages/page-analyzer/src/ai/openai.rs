//! OpenAI implementation of the VisionModel trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use openai_client::OpenAIClient;
//! use page_analyzer::{ai::OpenAIVisionModel, AnalyzerConfig, PageAnalyzer};
//!
//! let config = AnalyzerConfig::from_env()?;
//! let model = OpenAIVisionModel::from_config(OpenAIClient::from_env()?, &config);
//! let analyzer = PageAnalyzer::with_config(model, config);
//! ```

use async_trait::async_trait;
use openai_client::{image_data_url, ChatRequest, Message, OpenAIClient, OpenAIError, ResponseFormat};
use tracing::warn;

use crate::error::{TransportError, TransportErrorKind};
use crate::traits::vision::{VisionModel, VisionRequest};
use crate::types::config::AnalyzerConfig;

/// OpenAI-backed vision model.
#[derive(Clone)]
pub struct OpenAIVisionModel {
    client: OpenAIClient,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    image_mime: String,
}

impl OpenAIVisionModel {
    /// Wrap a client using gpt-4o with provider defaults.
    pub fn new(client: OpenAIClient) -> Self {
        Self {
            client,
            model: "gpt-4o".to_string(),
            temperature: None,
            max_tokens: None,
            image_mime: "image/png".to_string(),
        }
    }

    /// Take model name and sampling settings from an analyzer config.
    pub fn from_config(client: OpenAIClient, config: &AnalyzerConfig) -> Self {
        Self {
            client,
            model: config.model.clone(),
            temperature: Some(config.temperature),
            max_tokens: Some(config.max_tokens),
            image_mime: config.image_mime.clone(),
        }
    }

    /// Set the chat model (default: gpt-4o).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Get the current model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, request: &VisionRequest) -> ChatRequest {
        let user = match &request.image {
            Some(image) => Message::user_with_image(
                request.prompt.clone(),
                image_data_url(image, &self.image_mime),
            ),
            None => Message::user(request.prompt.clone()),
        };

        let mut chat = ChatRequest::new(self.model.clone())
            .message(Message::system(request.system.clone()))
            .message(user);

        if let Some(temperature) = self.temperature {
            chat = chat.temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            chat = chat.token_limit(max_tokens);
        }
        if request.json_output {
            chat = chat.response_format(ResponseFormat::JsonObject);
        }
        chat
    }
}

#[async_trait]
impl VisionModel for OpenAIVisionModel {
    async fn complete(&self, request: VisionRequest) -> Result<String, TransportError> {
        let response = self.client.chat_completion(self.build_request(&request)).await?;

        if response.finish_reason.as_deref() == Some("length") {
            warn!(
                model = %self.model,
                content_len = response.content.len(),
                "Model output hit the token limit and is likely truncated"
            );
        }

        Ok(response.content)
    }
}

impl From<OpenAIError> for TransportError {
    fn from(err: OpenAIError) -> Self {
        let kind = match &err {
            OpenAIError::Network(_) => TransportErrorKind::Network,
            OpenAIError::Timeout(_) => TransportErrorKind::Timeout,
            OpenAIError::RateLimited(_) => TransportErrorKind::RateLimited,
            OpenAIError::Api { .. } => TransportErrorKind::Api,
            OpenAIError::Config(_) | OpenAIError::Parse(_) => TransportErrorKind::Other,
        };
        TransportError::new(kind, err)
    }
}
