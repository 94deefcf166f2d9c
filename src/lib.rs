/*!
 * # vidscribe
 *
 * A Rust library for turning spoken video into translated subtitles.
 *
 * ## Features
 *
 * - Stage videos from local files or YouTube URLs
 * - Extract audio and transcribe it with Whisper
 * - Merge choppy transcript segments into readable captions
 * - Translate SRT documents in overlapping batches through
 *   chat-completion backends (OpenAI, DeepSeek)
 * - Optional bilingual output and subtitle burn-in
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle_processor`: SRT parsing, serialization and segment merging
 * - `translation`: Batched AI translation:
 *   - `translation::core`: Backend selection, key pool and retries
 *   - `translation::batch`: Window planning and concurrent dispatch
 *   - `translation::line_codec`: Line compression and the wire contract
 *   - `translation::cache`: Prompt/response memoization
 * - `media`: Video intake, audio extraction, transcription, burn-in
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `providers`: Chat-completion backend clients
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod media;
pub mod providers;
pub mod subtitle_processor;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, ProviderError, SubtitleError, TranslationError};
pub use subtitle_processor::{SubtitleCollection, SubtitleEntry};
