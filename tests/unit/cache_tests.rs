/*!
 * Unit tests for the prompt cache and its on-disk store
 */

use anyhow::Result;
use vidscribe::translation::{CacheStore, JsonFileStore, PromptCache};
use vidscribe::translation::cache::cache_key;

use crate::common;

#[test]
fn test_jsonFileStore_saveAndLoad_shouldPersistEntries() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let cache_path = temp_dir.path().join("prompts-openai.json");

    let cache = PromptCache::new(Box::new(JsonFileStore::new(cache_path.clone())))?;
    cache.insert(
        cache_key("gpt-4o", "translate", "Hello"),
        "Bonjour".to_string(),
    );
    assert!(cache_path.exists());

    // A fresh cache over the same file sees the previous run's entries
    let reloaded = PromptCache::new(Box::new(JsonFileStore::new(cache_path)))?;
    assert_eq!(
        reloaded.get(&cache_key("gpt-4o", "translate", "Hello")),
        Some("Bonjour".to_string())
    );
    assert_eq!(reloaded.len(), 1);
    Ok(())
}

#[test]
fn test_jsonFileStore_withMissingFile_shouldStartEmpty() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let store = JsonFileStore::new(temp_dir.path().join("absent.json"));
    assert!(store.load()?.is_empty());
    Ok(())
}

#[test]
fn test_jsonFileStore_withCorruptFile_shouldStartEmpty() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let cache_path = common::create_test_file(temp_dir.path(), "broken.json", "not json {")?;

    let store = JsonFileStore::new(cache_path);
    assert!(store.load()?.is_empty());
    Ok(())
}

#[test]
fn test_jsonFileStore_save_shouldCreateParentDirectories() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let cache_path = temp_dir.path().join("nested").join("dir").join("cache.json");

    let cache = PromptCache::new(Box::new(JsonFileStore::new(cache_path.clone())))?;
    cache.insert("k".to_string(), "v".to_string());
    assert!(cache_path.exists());
    Ok(())
}

#[test]
fn test_cacheKey_shouldDifferPerModelPromptAndInput() {
    let base = cache_key("m", "p", "i");
    assert_ne!(base, cache_key("m2", "p", "i"));
    assert_ne!(base, cache_key("m", "p2", "i"));
    assert_ne!(base, cache_key("m", "p", "i2"));
}
