use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;

use crate::errors::ProviderError;
use crate::providers::ChatProvider;
use crate::providers::openai::{ChatCompletionRequest, OpenAi};

/// Default DeepSeek chat completions endpoint
const DEFAULT_ENDPOINT: &str = "https://api.deepseek.com";

/// Model used when the configuration does not name one
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// DeepSeek client for chat completions.
///
/// The wire format is OpenAI-compatible, so the request/response types are
/// shared with the OpenAI client; only the endpoint and model naming differ.
#[derive(Debug)]
pub struct DeepSeek {
    /// HTTP client for API requests
    client: Client,
    /// API endpoint URL
    endpoint: String,
}

impl DeepSeek {
    /// Create a new DeepSeek client with the default endpoint
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    /// Create a new DeepSeek client with a custom endpoint
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
        }
    }
}

impl Default for DeepSeek {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatProvider for DeepSeek {
    fn name(&self) -> &'static str {
        "deepseek"
    }

    async fn chat(
        &self,
        api_key: &str,
        model: &str,
        system_prompt: &str,
        user_input: &str,
    ) -> Result<String, ProviderError> {
        let model = if model.is_empty() { DEFAULT_MODEL } else { model };
        let request = ChatCompletionRequest::new(model, system_prompt, user_input);
        OpenAi::execute(&self.client, &self.endpoint, api_key, &request, self.name()).await
    }
}
