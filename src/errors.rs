/*!
 * Error types for the vidscribe application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions. The split between
 * `ProviderError` retryable variants and `TranslationError` contract violations
 * matters: the retry loop in `translation::core` only ever retries the former.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails (network, timeout)
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The provider returned a completion with no content at all.
    /// Retried without consuming an attempt slot.
    #[error("Provider returned an empty response")]
    EmptyResponse,
}

impl ProviderError {
    /// Whether the retry loop may try again after this error.
    ///
    /// Structural errors (unparseable body, bad credentials, client-side 4xx)
    /// will not get better on a second attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RequestFailed(_) | Self::RateLimitExceeded(_) | Self::EmptyResponse => true,
            Self::ApiError { status_code, .. } => *status_code >= 500 || *status_code == 429,
            Self::ParseError(_) | Self::AuthenticationError(_) => false,
        }
    }
}

/// Errors that can occur during subtitle processing
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// Subtitle file could not be found
    #[error("Subtitle file not found: {0}")]
    FileNotFound(String),

    /// A timing line could not be parsed
    #[error("Invalid timestamp in block {block}: {text}")]
    InvalidTimestamp {
        /// One-based block ordinal in the source file
        block: usize,
        /// The offending timing line
        text: String,
    },

    /// No usable entries were found in the content
    #[error("No valid subtitle entries were found in the SRT content")]
    Empty,
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error with subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// The decoded response does not line up with the request.
    /// This is a contract violation with the backend, never retried.
    #[error("Line count mismatch: expected {expected} translated lines, received {received}")]
    LineCountMismatch {
        /// Compressed line count sent to the provider
        expected: usize,
        /// Line count recovered from the response
        received: usize,
    },

    /// Batch planning was given an unusable configuration
    #[error("Invalid batch configuration: max batch size {max_batch_size} leaves no room for a margin of {margin} on both sides")]
    InvalidBatchConfig {
        /// Configured maximum lines per request
        max_batch_size: usize,
        /// Configured context margin
        margin: usize,
    },

    /// The run was aborted because another batch already failed
    #[error("Translation run aborted after a batch failure")]
    Aborted,
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
