/*!
 * Mock backend implementations for testing.
 *
 * This module provides mock backends that simulate different behaviors:
 * - `MockProvider::working()` - Translates each delimited line
 * - `MockProvider::intermittent(n)` - Fails every nth request
 * - `MockProvider::failing()` - Always fails with an error
 */

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::ChatProvider;
use crate::translation::line_codec::LINE_DELIMITER;

/// Behavior mode for the mock backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds, tagging each delimited line as translated
    Working,
    /// Fails intermittently (every nth request)
    Intermittent { fail_every: usize },
    /// Always fails with a server error
    Failing,
    /// Drops the last delimited line from each response
    Truncated,
    /// Returns an empty response
    Empty,
}

/// Mock backend for exercising the dispatcher and retry loop
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&str) -> String>,
}

impl MockProvider {
    /// Create a new mock backend with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            custom_response: None,
        }
    }

    /// Create a working mock backend that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create an intermittently failing mock backend
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a failing mock backend that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that drops a line from each response
    pub fn truncated() -> Self {
        Self::new(MockBehavior::Truncated)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Set a custom response generator over the user input
    pub fn with_custom_response(mut self, generator: fn(&str) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of chat calls made so far
    pub fn call_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Translate a delimited request by tagging each line
    fn translate_lines(user_input: &str) -> String {
        let mut response = String::new();
        for line in user_input.split(LINE_DELIMITER).filter(|l| !l.is_empty()) {
            response.push_str(&format!("[TRANSLATED] {}", line));
            response.push_str(LINE_DELIMITER);
        }
        response
    }

    /// Translate a delimited request but drop the final line
    fn translate_lines_truncated(user_input: &str) -> String {
        let lines: Vec<&str> = user_input
            .split(LINE_DELIMITER)
            .filter(|l| !l.is_empty())
            .collect();
        let keep = lines.len().saturating_sub(1);

        let mut response = String::new();
        for line in &lines[..keep] {
            response.push_str(&format!("[TRANSLATED] {}", line));
            response.push_str(LINE_DELIMITER);
        }
        response
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn chat(
        &self,
        _api_key: &str,
        _model: &str,
        _system_prompt: &str,
        user_input: &str,
    ) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            MockBehavior::Working => {
                let text = if let Some(generator) = self.custom_response {
                    generator(user_input)
                } else {
                    Self::translate_lines(user_input)
                };
                Ok(text)
            }

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(Self::translate_lines(user_input))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated backend failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Truncated => Ok(Self::translate_lines_truncated(user_input)),

            MockBehavior::Empty => Err(ProviderError::EmptyResponse),
        }
    }
}
