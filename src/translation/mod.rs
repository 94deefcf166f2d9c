/*!
 * Translation pipeline for subtitle documents.
 *
 * This module contains the core functionality for translating subtitles
 * through chat-completion backends. It is split into several submodules:
 *
 * - `core`: Backend selection, key pool and retry policy
 * - `batch`: Window planning and concurrent batch dispatch
 * - `line_codec`: Line compression and the delimiter wire contract
 * - `cache`: Prompt/response memoization
 */

// Re-export main types for easier usage
pub use self::batch::{BatchPlan, BatchTranslator, plan_batches};
pub use self::cache::{CacheStore, JsonFileStore, MemoryStore, PromptCache};
pub use self::core::{TranslationService, parse_key_pool};
pub use self::line_codec::{LINE_DELIMITER, LineCodec};

// Submodules
pub mod batch;
pub mod cache;
pub mod core;
pub mod line_codec;
