/*!
 * Prompt/response caching for translation calls.
 *
 * Every successful provider response is memoized under a composite key of
 * model, system prompt, and user input, so re-running a translation (or
 * producing a second bilingual rendering of the same document) never repeats
 * a remote call. The cache is write-through: the whole map is persisted
 * synchronously after each insert, under the same lock that guards lookups.
 */

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use anyhow::{Context, Result};
use log::{debug, warn};
use parking_lot::Mutex;

/// Key separator inside the composite cache key
const KEY_SEPARATOR: &str = "|||";

/// Build the composite cache key for one prompt execution
pub fn cache_key(model: &str, system_prompt: &str, user_input: &str) -> String {
    format!("{model}{KEY_SEPARATOR}{system_prompt}{KEY_SEPARATOR}{user_input}")
}

/// Backing store capability for the prompt cache.
///
/// Abstracted so tests can substitute an in-memory store for the on-disk
/// JSON document.
pub trait CacheStore: Send + Sync {
    /// Load all persisted entries
    fn load(&self) -> Result<HashMap<String, String>>;

    /// Persist the full entry map, replacing previous contents
    fn save(&self, entries: &HashMap<String, String>) -> Result<()>;
}

/// Flat JSON document on disk, one file per backend family
pub struct JsonFileStore {
    /// Cache file location
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store backed by the given file path
    pub fn new(path: PathBuf) -> Self {
        JsonFileStore { path }
    }

    /// Default cache location for a backend family
    pub fn default_path(backend_name: &str) -> PathBuf {
        let base = dirs::cache_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("vidscribe").join(format!("prompts-{backend_name}.json"))
    }
}

impl CacheStore for JsonFileStore {
    fn load(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read prompt cache: {}", self.path.display()))?;
        match serde_json::from_str(&json) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                // A corrupt cache costs re-translation, not correctness
                warn!("Discarding unreadable prompt cache {}: {}", self.path.display(), e);
                Ok(HashMap::new())
            }
        }
    }

    fn save(&self, entries: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create cache directory: {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(entries)
            .context("Failed to serialize prompt cache")?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write prompt cache: {}", self.path.display()))?;
        Ok(())
    }
}

/// In-memory store used by tests and dry runs
#[derive(Default)]
pub struct MemoryStore {
    /// Persisted snapshot, inspectable from tests
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in the last persisted snapshot
    pub fn persisted_len(&self) -> usize {
        self.entries.lock().len()
    }
}

impl CacheStore for MemoryStore {
    fn load(&self) -> Result<HashMap<String, String>> {
        Ok(self.entries.lock().clone())
    }

    fn save(&self, entries: &HashMap<String, String>) -> Result<()> {
        *self.entries.lock() = entries.clone();
        Ok(())
    }
}

/// Process-lifetime memo of prompt executions.
///
/// Constructed once and passed by reference to the dispatcher. Unbounded by
/// design: the key space is finite per run (one entry per batch prompt).
pub struct PromptCache {
    /// Backing store
    store: Box<dyn CacheStore>,

    /// In-memory entries, guarded for the whole read-or-insert section
    entries: Mutex<HashMap<String, String>>,
}

impl PromptCache {
    /// Create a cache over the given store, loading persisted entries once
    pub fn new(store: Box<dyn CacheStore>) -> Result<Self> {
        let entries = store.load()?;
        if !entries.is_empty() {
            debug!("Loaded {} cached prompt responses", entries.len());
        }
        Ok(PromptCache {
            store,
            entries: Mutex::new(entries),
        })
    }

    /// Create a cache with no persistence, for tests and passthrough runs
    pub fn in_memory() -> Self {
        PromptCache {
            store: Box::new(MemoryStore::new()),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Look up a cached response
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    /// Insert a response and flush the whole cache to the store.
    ///
    /// Persistence failures are logged and swallowed: losing the memo is
    /// cheaper than failing a translation that already succeeded.
    pub fn insert(&self, key: String, response: String) {
        // The lock is held across the save so concurrent inserts cannot
        // persist their snapshots out of order.
        let mut entries = self.entries.lock();
        entries.insert(key, response);
        if let Err(e) = self.store.save(&entries) {
            warn!("Failed to persist prompt cache: {}", e);
        }
    }

    /// Number of entries currently held
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
