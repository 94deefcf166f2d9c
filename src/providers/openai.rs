use std::time::Duration;
use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::providers::ChatProvider;

/// Default OpenAI chat completions endpoint
const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

/// OpenAI client for chat completions
#[derive(Debug)]
pub struct OpenAi {
    /// HTTP client for API requests
    client: Client,
    /// API endpoint URL
    endpoint: String,
}

/// Chat message object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system or user)
    pub role: String,
    /// Content of the message
    pub content: String,
}

/// Chat completion request body
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    /// Model identifier
    pub model: String,
    /// Messages of the conversation
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Chat completion response body
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    /// Completion choices
    pub choices: Vec<ChatChoice>,
}

/// Single completion choice
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    /// Response message
    pub message: ChatMessage,
}

impl ChatCompletionRequest {
    /// Build a request with one system and one user message
    pub fn new(model: impl Into<String>, system_prompt: &str, user_input: &str) -> Self {
        Self {
            model: model.into(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_input.to_string(),
                },
            ],
            temperature: None,
        }
    }
}

impl OpenAi {
    /// Create a new OpenAI client with the default endpoint
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    /// Create a new OpenAI client with a custom endpoint
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
        }
    }

    /// Execute a chat completion request against an OpenAI-compatible endpoint
    pub(crate) async fn execute(
        client: &Client,
        endpoint: &str,
        api_key: &str,
        request: &ChatCompletionRequest,
        backend_name: &str,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", endpoint.trim_end_matches('/'));

        let response = client
            .post(&url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("{backend_name}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("{} API error ({}): {}", backend_name, status, message);
            return Err(match status.as_u16() {
                401 | 403 => ProviderError::AuthenticationError(message),
                429 => ProviderError::RateLimitExceeded(message),
                code => ProviderError::ApiError {
                    status_code: code,
                    message,
                },
            });
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(format!("{backend_name}: {e}")))?;

        let content = body
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        Ok(content)
    }
}

impl Default for OpenAi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatProvider for OpenAi {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn chat(
        &self,
        api_key: &str,
        model: &str,
        system_prompt: &str,
        user_input: &str,
    ) -> Result<String, ProviderError> {
        let request = ChatCompletionRequest::new(model, system_prompt, user_input);
        Self::execute(&self.client, &self.endpoint, api_key, &request, self.name()).await
    }
}
