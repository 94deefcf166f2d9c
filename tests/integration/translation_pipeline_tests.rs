/*!
 * End-to-end tests of the translation pipeline: SRT in, translated SRT out,
 * with a mock backend standing in for the remote API.
 */

use anyhow::Result;
use std::sync::Arc;
use vidscribe::providers::mock::MockProvider;
use vidscribe::subtitle_processor::SubtitleCollection;
use vidscribe::translation::{BatchTranslator, JsonFileStore, PromptCache, TranslationService};

use crate::common;

fn service(provider: MockProvider, cache: Arc<PromptCache>) -> TranslationService {
    TranslationService::with_provider(
        Arc::new(provider),
        vec!["key-a".to_string(), "key-b".to_string()],
        "test-model",
        cache,
    )
}

#[tokio::test]
async fn test_pipeline_fromSrtFileToTranslatedFile_shouldTranslateEveryEntry() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let srt_path = common::create_test_subtitle(temp_dir.path(), "input.srt")?;
    let out_path = temp_dir.path().join("input-fr.srt");

    let collection = SubtitleCollection::from_srt_file(&srt_path)?;
    let translator = BatchTranslator::new(
        service(MockProvider::working(), Arc::new(PromptCache::in_memory())),
        100,
        3,
    );

    let translated = translator
        .translate_collection(&collection, "English", "French", false, |_, _| {})
        .await?;
    translated.write_to_srt(&out_path, false)?;

    let written = SubtitleCollection::from_srt_file(&out_path)?;
    assert_eq!(written.len(), collection.len());
    for (original, translated) in collection.entries.iter().zip(written.entries.iter()) {
        assert_eq!(translated.text, format!("[TRANSLATED] {}", original.text));
        assert_eq!(translated.start_time_ms, original.start_time_ms);
        assert_eq!(translated.end_time_ms, original.end_time_ms);
    }
    Ok(())
}

#[tokio::test]
async fn test_pipeline_withBilingualOutput_shouldKeepBothTexts() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let srt_path = common::create_test_subtitle(temp_dir.path(), "input.srt")?;
    let out_path = temp_dir.path().join("input-en-fr.srt");

    let collection = SubtitleCollection::from_srt_file(&srt_path)?;
    let translator = BatchTranslator::new(
        service(MockProvider::working(), Arc::new(PromptCache::in_memory())),
        100,
        3,
    );

    let translated = translator
        .translate_collection(&collection, "English", "French", true, |_, _| {})
        .await?;
    translated.write_to_srt(&out_path, true)?;

    let content = std::fs::read_to_string(&out_path)?;
    assert!(content.contains("This is a test subtitle.\n----\n[TRANSLATED] This is a test subtitle."));

    // The bilingual file parses back with both texts attached
    let reloaded = SubtitleCollection::from_srt_file(&out_path)?;
    assert_eq!(
        reloaded.entries[0].original_text.as_deref(),
        Some("This is a test subtitle.")
    );
    Ok(())
}

#[tokio::test]
async fn test_pipeline_withManySmallBatches_shouldCoverWholeDocument() -> Result<()> {
    let entries: Vec<String> = (0..57).map(|i| format!("segment number {i}")).collect();
    let srt: String = entries
        .iter()
        .enumerate()
        .map(|(i, text)| {
            format!(
                "{}\n00:00:{:02},000 --> 00:00:{:02},500\n{}\n\n",
                i + 1,
                i,
                i,
                text
            )
        })
        .collect();
    let collection = SubtitleCollection::parse_srt_string(&srt)?;

    let translator = BatchTranslator::new(
        service(MockProvider::working(), Arc::new(PromptCache::in_memory())),
        10,
        2,
    );
    let translated = translator
        .translate_collection(&collection, "English", "French", false, |_, _| {})
        .await?;

    assert_eq!(translated.len(), 57);
    for (i, entry) in translated.entries.iter().enumerate() {
        assert_eq!(entry.text, format!("[TRANSLATED] segment number {i}"));
    }
    Ok(())
}

#[tokio::test]
async fn test_pipeline_withTruncatedBackend_shouldFailInsteadOfPadding() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let srt_path = common::create_test_subtitle(temp_dir.path(), "input.srt")?;
    let collection = SubtitleCollection::from_srt_file(&srt_path)?;

    let translator = BatchTranslator::new(
        service(MockProvider::truncated(), Arc::new(PromptCache::in_memory())),
        100,
        3,
    );
    let result = translator
        .translate_collection(&collection, "English", "French", false, |_, _| {})
        .await;

    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn test_pipeline_withPersistedCache_shouldSkipRemoteCallsOnSecondRun() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let srt_path = common::create_test_subtitle(temp_dir.path(), "input.srt")?;
    let cache_path = temp_dir.path().join("prompts-mock.json");
    let collection = SubtitleCollection::from_srt_file(&srt_path)?;

    // First run populates the on-disk cache
    let provider = MockProvider::working();
    let counter = provider.clone();
    let cache = Arc::new(PromptCache::new(Box::new(JsonFileStore::new(cache_path.clone())))?);
    let translator = BatchTranslator::new(service(provider, cache), 100, 3);
    translator
        .translate_collection(&collection, "English", "French", false, |_, _| {})
        .await?;
    let first_run_calls = counter.call_count();
    assert!(first_run_calls > 0);

    // Second run with a fresh service over the same cache file stays local
    let provider = MockProvider::working();
    let counter = provider.clone();
    let cache = Arc::new(PromptCache::new(Box::new(JsonFileStore::new(cache_path)))?);
    let translator = BatchTranslator::new(service(provider, cache), 100, 3);
    let translated = translator
        .translate_collection(&collection, "English", "French", false, |_, _| {})
        .await?;

    assert_eq!(counter.call_count(), 0);
    assert_eq!(translated.len(), collection.len());
    Ok(())
}

#[tokio::test]
async fn test_pipeline_withEmptyDocument_shouldProduceEmptyOutput() -> Result<()> {
    let translator = BatchTranslator::new(
        service(MockProvider::working(), Arc::new(PromptCache::in_memory())),
        100,
        3,
    );
    let translated = translator
        .translate_collection(&SubtitleCollection::new(), "English", "French", false, |_, _| {})
        .await?;
    assert!(translated.is_empty());
    Ok(())
}
