/*!
 * Batch planning and concurrent dispatch.
 *
 * A document is partitioned into overlapping request windows: every segment
 * is translated exactly once (its effective range), while a margin of
 * neighboring segments travels along for context and is discarded from the
 * result. Batches run concurrently, one in-flight request per API key.
 */

use anyhow::{Result, anyhow};
use futures::stream::{self, StreamExt};
use log::{debug, error, info};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

use crate::errors::TranslationError;
use crate::subtitle_processor::{SubtitleCollection, SubtitleEntry};

use super::core::TranslationService;
use super::line_codec::{LINE_DELIMITER, LineCodec};

/// One planned request window over the segment array
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPlan {
    /// Position of this batch in the plan, also the key-rotation index
    pub index: usize,

    /// First segment index sent in the request
    pub request_start: usize,

    /// Last segment index sent in the request (inclusive)
    pub request_end: usize,

    /// First segment index whose translation is kept
    pub effective_start: usize,

    /// Last segment index whose translation is kept (inclusive)
    pub effective_end: usize,
}

impl BatchPlan {
    /// Number of segments sent in the request
    pub fn request_len(&self) -> usize {
        self.request_end - self.request_start + 1
    }

    /// Number of segments whose translation is kept
    pub fn effective_len(&self) -> usize {
        self.effective_end - self.effective_start + 1
    }
}

/// Partition `total` segments into request windows.
///
/// The first batch has no left margin, the last no right margin; middle
/// batches carry `margin` context segments on both sides. Effective ranges
/// tile `[0, total-1]` contiguously with no overlap, and no request ever
/// exceeds `max_batch_size` segments.
pub fn plan_batches(
    total: usize,
    max_batch_size: usize,
    margin: usize,
) -> Result<Vec<BatchPlan>, TranslationError> {
    if max_batch_size <= 2 * margin {
        return Err(TranslationError::InvalidBatchConfig {
            max_batch_size,
            margin,
        });
    }

    if total == 0 {
        return Ok(Vec::new());
    }

    let mut batches = Vec::new();
    let mut index = 0;

    if total <= max_batch_size {
        batches.push(BatchPlan {
            index,
            request_start: 0,
            request_end: total - 1,
            effective_start: 0,
            effective_end: total - 1,
        });
        return Ok(batches);
    }

    let first_effective_size = max_batch_size - margin;
    let middle_effective_size = max_batch_size - 2 * margin;

    // First batch has no left margin to pay for
    let first_effective_end = (first_effective_size - 1).min(total - 1);
    let first_request_end = if first_effective_end < total - 1 {
        first_effective_end + margin
    } else {
        first_effective_end
    };
    batches.push(BatchPlan {
        index,
        request_start: 0,
        request_end: first_request_end,
        effective_start: 0,
        effective_end: first_effective_end,
    });
    index += 1;
    let mut current_effective_start = first_effective_end + 1;

    // Middle batches, margin on both sides
    while current_effective_start + middle_effective_size <= total - 1 {
        let effective_end = current_effective_start + middle_effective_size - 1;
        batches.push(BatchPlan {
            index,
            request_start: current_effective_start - margin,
            request_end: effective_end + margin,
            effective_start: current_effective_start,
            effective_end,
        });
        index += 1;
        current_effective_start = effective_end + 1;
    }

    // Residual tail, margin only on the left
    if current_effective_start < total {
        batches.push(BatchPlan {
            index,
            request_start: current_effective_start.saturating_sub(margin),
            request_end: total - 1,
            effective_start: current_effective_start,
            effective_end: total - 1,
        });
    }

    Ok(batches)
}

/// Build the system prompt sent with every batch of a run
fn build_system_prompt(source_language: &str, target_language: &str) -> String {
    format!(
        "Please translate the following subtitles from {source_language} to {target_language}.\n\
         Each line in the input represents a separate subtitle.\n\
         For each line, output the translated text followed immediately by the delimiter {LINE_DELIMITER}.\n\
         Do not add any extra text, numbering, or commentary.\n\
         If an input line is empty, output only the delimiter.\n\
         Ensure that the total number of delimiters in the output exactly matches the total number of input lines."
    )
}

/// Batch translator running planned windows concurrently
pub struct BatchTranslator {
    /// The translation service to use
    service: TranslationService,

    /// Maximum segments per request, margins included
    max_batch_size: usize,

    /// Context segments on each side of a batch's effective range
    margin: usize,
}

impl BatchTranslator {
    /// Create a new batch translator
    pub fn new(service: TranslationService, max_batch_size: usize, margin: usize) -> Self {
        Self {
            service,
            max_batch_size,
            margin,
        }
    }

    /// Translate a whole collection, returning a new collection with the same
    /// timing and translated text.
    ///
    /// When `bilingual` is set each output entry also keeps its source text.
    /// The first failed batch aborts the remaining ones; segments whose batch
    /// never completed would fall back to their source text, but a failed run
    /// returns an error rather than a partial document.
    pub async fn translate_collection(
        &self,
        collection: &SubtitleCollection,
        source_language: &str,
        target_language: &str,
        bilingual: bool,
        progress_callback: impl Fn(usize, usize) + Clone + Send + 'static,
    ) -> Result<SubtitleCollection> {
        if collection.is_empty() {
            return Ok(SubtitleCollection::new());
        }

        let total = collection.len();
        let plans = plan_batches(total, self.max_batch_size, self.margin)?;
        let total_batches = plans.len();
        info!(
            "Translating {} segments in {} batches via {} (concurrency {})",
            total,
            total_batches,
            self.service.backend_name(),
            self.service.concurrency()
        );

        let texts: Arc<Vec<String>> =
            Arc::new(collection.entries.iter().map(|e| e.text.clone()).collect());
        let system_prompt = Arc::new(build_system_prompt(source_language, target_language));

        let translations: Arc<Mutex<HashMap<usize, String>>> =
            Arc::new(Mutex::new(HashMap::new()));
        let completed = Arc::new(AtomicUsize::new(0));
        let aborted = Arc::new(AtomicBool::new(false));

        let results = stream::iter(plans)
            .map(|plan| {
                let service = self.service.clone();
                let texts = texts.clone();
                let system_prompt = system_prompt.clone();
                let translations = translations.clone();
                let completed = completed.clone();
                let aborted = aborted.clone();
                let progress_callback = progress_callback.clone();

                async move {
                    let index = plan.index;
                    let result = Self::run_batch(
                        &service,
                        &plan,
                        &texts,
                        &system_prompt,
                        &translations,
                        &aborted,
                    )
                    .await;

                    if result.is_err() {
                        aborted.store(true, Ordering::SeqCst);
                    }

                    let current = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    progress_callback(current, total_batches);

                    (index, result)
                }
            })
            .buffer_unordered(self.service.concurrency())
            .collect::<Vec<_>>()
            .await;

        let mut sorted_results = results;
        sorted_results.sort_by_key(|(idx, _)| *idx);

        let mut errors = Vec::new();
        for (index, result) in sorted_results {
            if let Err(e) = result {
                // Abort markers only echo the batch that actually failed
                if !matches!(e, TranslationError::Aborted) {
                    errors.push(format!("Batch {} failed: {}", index + 1, e));
                }
            }
        }
        if !errors.is_empty() {
            let message = format!("Failed to translate all batches: {}", errors.join("; "));
            error!("{}", message);
            return Err(anyhow!(message));
        }

        let translations = translations.lock();
        let mut output = SubtitleCollection::new();
        for (i, entry) in collection.entries.iter().enumerate() {
            let translated = translations
                .get(&i)
                .cloned()
                .unwrap_or_else(|| entry.text.clone());
            let new_entry = if bilingual {
                SubtitleEntry::new_bilingual(
                    i + 1,
                    entry.start_time_ms,
                    entry.end_time_ms,
                    entry.text.clone(),
                    translated,
                )
            } else {
                SubtitleEntry::new(i + 1, entry.start_time_ms, entry.end_time_ms, translated)
            };
            output.entries.push(new_entry);
        }

        Ok(output)
    }

    /// Execute one planned batch and write its effective range into the
    /// shared translation map.
    async fn run_batch(
        service: &TranslationService,
        plan: &BatchPlan,
        texts: &[String],
        system_prompt: &str,
        translations: &Mutex<HashMap<usize, String>>,
        aborted: &AtomicBool,
    ) -> Result<(), TranslationError> {
        if aborted.load(Ordering::SeqCst) {
            return Err(TranslationError::Aborted);
        }

        let start_time = Instant::now();
        let request_lines = &texts[plan.request_start..=plan.request_end];
        let mut codec = LineCodec::encode(request_lines);

        let api_key = service.key_for_batch(plan.index);
        let response = service
            .execute_prompt(api_key, system_prompt, &codec.to_request_text())
            .await?;

        codec.apply_response(&response)?;
        let expanded = codec.expand();

        let offset = plan.effective_start - plan.request_start;
        let effective_count = plan.effective_len();
        if offset + effective_count > expanded.len() {
            return Err(TranslationError::LineCountMismatch {
                expected: offset + effective_count,
                received: expanded.len(),
            });
        }

        // Another batch may have failed while this one was in flight
        if aborted.load(Ordering::SeqCst) {
            return Err(TranslationError::Aborted);
        }

        // Each batch only ever writes inside its own effective range, so
        // concurrent batches never contend on the same key.
        let mut map = translations.lock();
        for i in 0..effective_count {
            map.insert(
                plan.effective_start + i,
                expanded[offset + i].clone(),
            );
        }
        drop(map);

        debug!(
            "Batch {} ([{}, {}]) completed in {:?}",
            plan.index + 1,
            plan.effective_start,
            plan.effective_end,
            start_time.elapsed()
        );
        Ok(())
    }
}
