/*!
 * Core translation service.
 *
 * This module contains the service shared by all batches of a run: backend
 * selection, the API key pool, the retry loop, and the prompt cache lookup
 * wrapped around every remote call.
 */

use std::sync::Arc;
use std::time::Duration;
use log::{debug, warn};

use crate::errors::ProviderError;
use crate::providers::deepseek::DeepSeek;
use crate::providers::openai::OpenAi;
use crate::providers::{ChatProvider, Passthrough};
use crate::translation::cache::{PromptCache, cache_key};

/// Maximum attempts per prompt before the batch is failed
const MAX_RETRY_ATTEMPTS: usize = 20;

/// Base delay before the first retry
const RETRY_BASE_DELAY_MS: u64 = 500;

/// Additional delay added per attempt
const RETRY_STEP_DELAY_MS: u64 = 250;

/// Split a raw credential string into a deduplicated key pool.
///
/// Keys are separated by semicolons; blank fragments are dropped and
/// duplicates keep their first position.
pub fn parse_key_pool(raw: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for key in raw.split(';') {
        let key = key.trim();
        if !key.is_empty() && !keys.iter().any(|k| k == key) {
            keys.push(key.to_string());
        }
    }
    keys
}

/// Translation service shared across all batches of one run
#[derive(Clone)]
pub struct TranslationService {
    /// Selected backend
    provider: Arc<dyn ChatProvider>,

    /// Pool of API keys, rotated across batches
    api_keys: Vec<String>,

    /// Model identifier passed to the backend
    model: String,

    /// Prompt/response memo shared with every batch
    cache: Arc<PromptCache>,
}

impl TranslationService {
    /// Select a backend from the configured credentials.
    ///
    /// OpenAI wins when it has at least one key, then DeepSeek; with no
    /// credentials at all the passthrough backend echoes the input so the
    /// pipeline still runs end to end.
    pub fn from_credentials(
        openai_api_key: &str,
        deepseek_api_key: &str,
        model: impl Into<String>,
        cache: Arc<PromptCache>,
    ) -> Self {
        let openai_keys = parse_key_pool(openai_api_key);
        if !openai_keys.is_empty() {
            return Self::with_provider(Arc::new(OpenAi::new()), openai_keys, model, cache);
        }

        let deepseek_keys = parse_key_pool(deepseek_api_key);
        if !deepseek_keys.is_empty() {
            return Self::with_provider(Arc::new(DeepSeek::new()), deepseek_keys, model, cache);
        }

        warn!("No API key configured, subtitles will pass through untranslated");
        Self::with_provider(Arc::new(Passthrough), Vec::new(), model, cache)
    }

    /// Create a service over an explicit backend and key pool
    pub fn with_provider(
        provider: Arc<dyn ChatProvider>,
        api_keys: Vec<String>,
        model: impl Into<String>,
        cache: Arc<PromptCache>,
    ) -> Self {
        TranslationService {
            provider,
            api_keys,
            model: model.into(),
            cache,
        }
    }

    /// Short name of the selected backend
    pub fn backend_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Number of batches to run in parallel, one slot per key
    pub fn concurrency(&self) -> usize {
        self.api_keys.len().max(1)
    }

    /// Key assigned to a batch, rotating through the pool by batch index
    pub fn key_for_batch(&self, batch_index: usize) -> &str {
        if self.api_keys.is_empty() {
            return "";
        }
        &self.api_keys[batch_index % self.api_keys.len()]
    }

    /// Execute one prompt against the backend, going through the cache.
    ///
    /// Cache hits return without any remote call. On a miss the backend is
    /// called under the retry policy and the successful response is memoized
    /// before returning.
    pub async fn execute_prompt(
        &self,
        api_key: &str,
        system_prompt: &str,
        user_input: &str,
    ) -> Result<String, ProviderError> {
        let key = cache_key(&self.model, system_prompt, user_input);
        if let Some(cached) = self.cache.get(&key) {
            debug!("Prompt cache hit ({})", self.backend_name());
            return Ok(cached);
        }

        let response = self.execute_with_retry(api_key, system_prompt, user_input).await?;
        self.cache.insert(key, response.clone());
        Ok(response)
    }

    /// Retry loop around one backend call.
    ///
    /// Linear backoff, capped attempt count. An empty response does not
    /// consume an attempt slot; a non-retryable error propagates immediately.
    async fn execute_with_retry(
        &self,
        api_key: &str,
        system_prompt: &str,
        user_input: &str,
    ) -> Result<String, ProviderError> {
        let mut attempt = 0;
        loop {
            match self
                .provider
                .chat(api_key, &self.model, system_prompt, user_input)
                .await
            {
                Ok(response) => return Ok(response),
                Err(ProviderError::EmptyResponse) => {
                    // Transient backend hiccup, does not count against the cap
                    warn!("{} returned an empty response, retrying", self.backend_name());
                }
                Err(e) if e.is_retryable() && attempt + 1 < MAX_RETRY_ATTEMPTS => {
                    attempt += 1;
                    warn!(
                        "{} call failed (attempt {}/{}): {}",
                        self.backend_name(),
                        attempt,
                        MAX_RETRY_ATTEMPTS,
                        e
                    );
                }
                Err(e) => return Err(e),
            }

            let delay = RETRY_BASE_DELAY_MS + RETRY_STEP_DELAY_MS * attempt as u64;
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }
}
