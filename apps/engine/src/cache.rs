//! TTL-based keyword cache with a pluggable backing medium.
//!
//! One record per key, keyed by a sha256 content hash of the exact input
//! bytes. The durable store writes new-then-rename so concurrent readers
//! never observe a partially written record. Cache failures are never
//! surfaced: `get` degrades to a miss and `put` to a no-op, logged as
//! warnings.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

/// TTL for cached job-description keyword expansions: 30 days.
pub const KEYWORD_CACHE_TTL_SECS: i64 = 60 * 60 * 24 * 30;

/// Derives the cache key for an input text: sha256 over the exact bytes.
///
/// Deliberately no normalization first — two inputs differing only in
/// trailing whitespace are distinct entries.
pub fn content_key(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();

    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest.iter() {
        let _ = write!(&mut out, "{byte:02x}");
    }
    out
}

/// The persisted record format, one per key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Epoch seconds at write time.
    pub timestamp: i64,
    pub keywords: Vec<String>,
}

/// Keyed durable map with TTL expiry, shared across concurrent requests.
///
/// Implementations must make `put` atomic at the granularity of one entry
/// and must swallow medium failures (miss / no-op, not errors).
pub trait CacheStore: Send + Sync {
    /// Returns the payload for `key`, or `None` if absent or older than the
    /// store's TTL.
    fn get(&self, key: &str) -> Option<Vec<String>>;

    /// Overwrites the entry for `key` unconditionally.
    fn put(&self, key: &str, keywords: &[String]);
}

fn now_epoch_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

fn is_fresh(record: &CacheRecord, ttl_secs: i64) -> bool {
    now_epoch_secs() - record.timestamp < ttl_secs
}

/// Durable cache: one JSON file per key under a cache directory.
pub struct FileCacheStore {
    dir: PathBuf,
    ttl_secs: i64,
}

impl FileCacheStore {
    pub fn new(dir: impl Into<PathBuf>, ttl_secs: i64) -> Self {
        Self {
            dir: dir.into(),
            ttl_secs,
        }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl CacheStore for FileCacheStore {
    fn get(&self, key: &str) -> Option<Vec<String>> {
        let path = self.entry_path(key);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(_) => return None, // absent is the common case, not worth logging
        };

        let record: CacheRecord = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(e) => {
                warn!("ignoring corrupt cache entry {}: {e}", path.display());
                return None;
            }
        };

        if !is_fresh(&record, self.ttl_secs) {
            debug!("cache entry {key} expired");
            return None;
        }
        Some(record.keywords)
    }

    fn put(&self, key: &str, keywords: &[String]) {
        let record = CacheRecord {
            timestamp: now_epoch_secs(),
            keywords: keywords.to_vec(),
        };

        if let Err(e) = self.write_atomic(key, &record) {
            warn!("cache write for {key} failed: {e}");
        }
    }
}

impl FileCacheStore {
    // Write-new-then-rename: readers see either the old record or the new
    // one, never a torn write.
    fn write_atomic(&self, key: &str, record: &CacheRecord) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&serde_json::to_vec_pretty(record)?)?;
        tmp.persist(self.entry_path(key))?;
        Ok(())
    }
}

/// In-memory cache with the same TTL semantics, for tests and for callers
/// that want a non-durable layer.
pub struct MemoryCacheStore {
    ttl_secs: i64,
    entries: Mutex<HashMap<String, CacheRecord>>,
}

impl MemoryCacheStore {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            ttl_secs,
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &str) -> Option<Vec<String>> {
        let entries = self.entries.lock().ok()?;
        let record = entries.get(key)?;
        if !is_fresh(record, self.ttl_secs) {
            return None;
        }
        Some(record.keywords.clone())
    }

    fn put(&self, key: &str, keywords: &[String]) {
        let record = CacheRecord {
            timestamp: now_epoch_secs(),
            keywords: keywords.to_vec(),
        };
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), record);
        }
    }
}
