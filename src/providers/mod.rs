/*!
 * Provider implementations for the translation backends.
 *
 * This module contains client implementations for the supported
 * chat-completion backends:
 * - OpenAI: primary hosted API
 * - DeepSeek: secondary hosted API (OpenAI-compatible wire format)
 * - Passthrough: no-op backend that echoes its input, used for dry runs
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common capability for all translation backends.
///
/// One synchronous chat completion: one system message, one user message,
/// one response text. Credentials are passed per call so a single client can
/// serve a pool of keys.
#[async_trait]
pub trait ChatProvider: Send + Sync + Debug {
    /// Short backend name, used for logging and cache file naming
    fn name(&self) -> &'static str;

    /// Execute one chat completion
    ///
    /// # Arguments
    /// * `api_key` - Credential for this call
    /// * `model` - Model identifier
    /// * `system_prompt` - Instruction message
    /// * `user_input` - Content message
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The response text or an error
    async fn chat(
        &self,
        api_key: &str,
        model: &str,
        system_prompt: &str,
        user_input: &str,
    ) -> Result<String, ProviderError>;
}

/// No-op backend that returns the input unchanged.
///
/// Selected when no credential is configured; lets the whole pipeline run
/// end to end without touching the network.
#[derive(Debug, Default)]
pub struct Passthrough;

#[async_trait]
impl ChatProvider for Passthrough {
    fn name(&self) -> &'static str {
        "passthrough"
    }

    async fn chat(
        &self,
        _api_key: &str,
        _model: &str,
        _system_prompt: &str,
        user_input: &str,
    ) -> Result<String, ProviderError> {
        Ok(user_input.to_string())
    }
}

pub mod deepseek;
pub mod mock;
pub mod openai;
