//! Pure OpenAI REST API client
//!
//! A clean, minimal client for the OpenAI chat completions API with no
//! domain-specific logic. Supports multimodal (text + image) messages and
//! JSON response formats.
//!
//! # Example
//!
//! ```rust,ignore
//! use openai_client::{image_data_url, ChatRequest, Message, OpenAIClient, ResponseFormat};
//!
//! let client = OpenAIClient::from_env()?;
//!
//! let response = client.chat_completion(
//!     ChatRequest::new("gpt-4o")
//!         .message(Message::system("Describe the page as JSON."))
//!         .message(Message::user_with_image(
//!             "What is on this page?",
//!             image_data_url(&screenshot_b64, "image/png"),
//!         ))
//!         .response_format(ResponseFormat::JsonObject),
//! ).await?;
//! ```

pub mod error;
pub mod types;

pub use error::{OpenAIError, Result};
pub use types::*;

use std::time::Duration;

use reqwest::{header, Client, StatusCode};
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Pure OpenAI API client.
#[derive(Clone)]
pub struct OpenAIClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAIClient {
    /// Create a new OpenAI client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create from environment variables `OPENAI_API_KEY` and optional `OPENAI_BASE_URL`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| OpenAIError::Config("OPENAI_API_KEY not set".into()))?;
        let client = Self::new(api_key);
        Ok(match std::env::var("OPENAI_BASE_URL") {
            Ok(url) if !url.trim().is_empty() => client.with_base_url(url.trim()),
            _ => client,
        })
    }

    /// Set a custom base URL (for Azure, proxies, OpenRouter, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Apply a whole-request timeout. Without one, requests wait indefinitely.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OpenAIError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(self)
    }

    /// Get the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Chat completion.
    ///
    /// Returns the first choice's content. No retries: a failed call is
    /// reported to the caller exactly once.
    pub async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(header::CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, model = %request.model, "OpenAI request failed");
                OpenAIError::from_send(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "OpenAI API error");
            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(OpenAIError::RateLimited(error_text));
            }
            return Err(OpenAIError::api(status.as_u16(), error_text));
        }

        let chat_response: types::ChatResponseRaw = response.json().await.map_err(|e| {
            if e.is_timeout() {
                OpenAIError::Timeout(e.to_string())
            } else {
                OpenAIError::Parse(e.to_string())
            }
        })?;

        let choice = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| OpenAIError::api(status.as_u16(), "No choices in response"))?;

        let content = choice
            .message
            .content
            .ok_or_else(|| OpenAIError::api(status.as_u16(), "Choice has no content"))?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis(),
            finish_reason = ?choice.finish_reason,
            content_len = content.len(),
            "OpenAI chat completion"
        );

        Ok(ChatResponse {
            content,
            usage: chat_response.usage,
            finish_reason: choice.finish_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder() {
        let client = OpenAIClient::new("sk-test").with_base_url("https://custom.api.com/");

        assert_eq!(client.api_key, "sk-test");
        assert_eq!(client.base_url, "https://custom.api.com");
    }

    #[test]
    fn test_default_base_url() {
        let client = OpenAIClient::new("sk-test");
        assert_eq!(client.base_url(), "https://api.openai.com/v1");
    }

    #[test]
    fn test_with_timeout_keeps_settings() {
        let client = OpenAIClient::new("sk-test")
            .with_base_url("http://localhost:9999")
            .with_timeout(Duration::from_secs(5))
            .unwrap();

        assert_eq!(client.api_key(), "sk-test");
        assert_eq!(client.base_url(), "http://localhost:9999");
    }

    #[test]
    fn test_unreachable_host_is_network_error() {
        let client = OpenAIClient::new("sk-test").with_base_url("http://127.0.0.1:1");
        let request = ChatRequest::new("gpt-4o").message(Message::user("ping"));

        let err = tokio_test::block_on(client.chat_completion(request)).unwrap_err();

        assert!(matches!(err, OpenAIError::Network(_)), "got {err:?}");
        assert!(err.is_transient());
    }
}
