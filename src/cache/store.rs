//! Cache Store Module
//!
//! Chunked cache engine: stores payloads under generated ids, chunks them on
//! demand and evicts entries by age.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::cache::{
    serialize_payload, CacheEntry, CacheStats, Clock, SchemaSummary, SystemClock,
    DEFAULT_CHUNK_SIZE, DEFAULT_MAX_AGE_SECS,
};
use crate::error::CacheError;

// == Chunk ==
/// One chunk served from a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    pub cache_id: String,
    pub text: String,
    pub index: usize,
    pub total: usize,
    pub has_more: bool,
}

// == Cached Entry Info ==
/// Listing row for one live entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedEntryInfo {
    pub id: String,
    pub scope_id: String,
    pub table_count: usize,
    pub age_minutes: u64,
    pub total_size: usize,
}

// == Chunked Cache ==
/// In-memory store of large payloads with lazy chunking and age-based eviction.
#[derive(Debug)]
pub struct ChunkedCache {
    /// Entries keyed by cache id
    entries: HashMap<String, CacheEntry>,
    /// Performance statistics
    stats: CacheStats,
    /// Target chunk size in characters
    chunk_size: usize,
    /// Retention window in milliseconds
    max_age_ms: u64,
    /// Time source
    clock: Arc<dyn Clock>,
}

impl Default for ChunkedCache {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, DEFAULT_MAX_AGE_SECS)
    }
}

impl ChunkedCache {
    // == Constructor ==
    /// Creates a cache using the wall clock.
    ///
    /// # Arguments
    /// * `chunk_size` - Target chunk size in characters
    /// * `max_age_secs` - Retention window in seconds
    pub fn new(chunk_size: usize, max_age_secs: u64) -> Self {
        Self::with_clock(chunk_size, max_age_secs, Arc::new(SystemClock))
    }

    /// Creates a cache reading time from `clock`.
    pub fn with_clock(chunk_size: usize, max_age_secs: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            chunk_size: chunk_size.max(1),
            max_age_ms: max_age_secs.saturating_mul(1000),
            clock,
        }
    }

    // == Store ==
    /// Stores `payload` under a fresh id derived from `scope_id` and returns it.
    ///
    /// Only the serialized length and the shallow summary are computed here;
    /// chunking waits for the first `get_chunk`. Earlier entries for the same
    /// scope are left alone and age out on their own.
    pub fn store(&mut self, scope_id: &str, payload: Value) -> String {
        let now = self.clock.now_ms();
        let total_size = serialize_payload(&payload).chars().count();
        let id = self.generate_id(scope_id, now);

        let entry = CacheEntry::new(id.clone(), scope_id, payload, now, total_size);
        debug!(
            cache_id = %id,
            total_size,
            tables = entry.summary.table_count,
            "Stored payload"
        );
        self.entries.insert(id.clone(), entry);

        self.evict_expired();
        id
    }

    // == Get Chunk ==
    /// Returns chunk `index` of entry `id`.
    ///
    /// Chunks are computed on the first call for an entry and reused after.
    /// Unknown or expired ids yield `CacheError::NotFound`; indices past the
    /// last chunk yield `CacheError::OutOfRange`.
    pub fn get_chunk(&mut self, id: &str, index: usize) -> Result<Chunk, CacheError> {
        self.evict_expired();

        let Some(entry) = self.entries.get_mut(id) else {
            self.stats.record_miss();
            return Err(CacheError::NotFound {
                cache_id: id.to_string(),
            });
        };

        let (chunks, computed_now) = entry.ensure_chunks(self.chunk_size);
        let total = chunks.len();
        let text = chunks.get(index).cloned();

        if computed_now {
            self.stats.record_chunk_computation();
            debug!(cache_id = %id, chunks = total, "Computed chunks");
        }

        match text {
            Some(text) => {
                self.stats.record_hit();
                Ok(Chunk {
                    cache_id: id.to_string(),
                    text,
                    index,
                    total,
                    has_more: index + 1 < total,
                })
            }
            None => {
                self.stats.record_miss();
                Err(CacheError::OutOfRange { index, total })
            }
        }
    }

    // == Get Summary ==
    /// Returns the summary of a live entry. Does not modify the cache.
    pub fn get_summary(&self, id: &str) -> Option<&SchemaSummary> {
        self.live_entry(id).map(|entry| &entry.summary)
    }

    // == Get Entry ==
    /// Returns a live entry.
    pub fn get_entry(&self, id: &str) -> Option<&CacheEntry> {
        self.live_entry(id)
    }

    // == List Entries ==
    /// Lists live entries, oldest first.
    pub fn list_entries(&self) -> Vec<CachedEntryInfo> {
        let now = self.clock.now_ms();
        let mut live: Vec<&CacheEntry> = self
            .entries
            .values()
            .filter(|entry| !entry.is_expired(now, self.max_age_ms))
            .collect();
        live.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        live.into_iter()
            .map(|entry| CachedEntryInfo {
                id: entry.id.clone(),
                scope_id: entry.scope_id.clone(),
                table_count: entry.summary.table_count,
                age_minutes: entry.age_ms(now) / 60_000,
                total_size: entry.total_size,
            })
            .collect()
    }

    // == Evict Expired ==
    /// Removes every entry older than the retention window.
    ///
    /// Returns the number of entries removed.
    pub fn evict_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let max_age_ms = self.max_age_ms;
        let before = self.entries.len();

        self.entries
            .retain(|_, entry| !entry.is_expired(now, max_age_ms));

        let removed = before - self.entries.len();
        if removed > 0 {
            self.stats.record_evictions(removed);
            debug!(removed, "Evicted expired cache entries");
        }
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    fn live_entry(&self, id: &str) -> Option<&CacheEntry> {
        let now = self.clock.now_ms();
        self.entries
            .get(id)
            .filter(|entry| !entry.is_expired(now, self.max_age_ms))
    }

    /// `"{scope}-{timestamp}"`, bumping the timestamp part while it collides
    /// with a live id.
    fn generate_id(&self, scope_id: &str, now_ms: u64) -> String {
        let mut stamp = now_ms;
        loop {
            let id = format!("{scope_id}-{stamp}");
            if !self.entries.contains_key(&id) {
                return id;
            }
            stamp += 1;
        }
    }
}
