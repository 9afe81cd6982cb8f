//! In-memory content cache: TTL-bounded, capacity-bounded, recency-evicted.
//!
//! Holds the full extracted text of large/OCR documents so the chunk server
//! can hand out fixed-size windows without re-extraction. Explicitly owned
//! and injectable (no ambient singleton). One coarse mutex guards the map;
//! operations are O(entries) with a small bound.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Default capacity: distinct large documents a session realistically juggles.
pub const MAX_CACHE_ENTRIES: usize = 15;
/// Default TTL: bounds staleness for documents that may change upstream.
pub const CACHE_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub max_entries: usize,
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: MAX_CACHE_ENTRIES,
            ttl: CACHE_TTL,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    content: String,
    is_ocr: bool,
    stamp: Instant,
}

#[derive(Debug)]
pub struct ContentCache {
    cfg: CacheConfig,
    entries: Mutex<HashMap<String, Entry>>,
}

impl ContentCache {
    pub fn new(cfg: CacheConfig) -> Self {
        Self {
            cfg,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Insert or refresh an entry.
    ///
    /// Expired entries are swept first; if the map is full and the key is
    /// new, the single oldest-stamp entry is evicted.
    pub fn put(&self, key: &str, content: String, is_ocr: bool) {
        self.put_at(Instant::now(), key, content, is_ocr);
    }

    /// Look up an entry: a hit refreshes its timestamp (marking it
    /// most-recently-used); an expired entry is evicted and reported as a
    /// miss.
    pub fn get(&self, key: &str) -> Option<(String, bool)> {
        self.get_at(Instant::now(), key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        // A poisoned lock only means another thread panicked mid-operation;
        // the map itself stays structurally valid, so keep serving.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn put_at(&self, now: Instant, key: &str, content: String, is_ocr: bool) {
        let mut map = self.lock();
        map.retain(|_, e| now.saturating_duration_since(e.stamp) <= self.cfg.ttl);
        if !map.contains_key(key) && map.len() >= self.cfg.max_entries {
            let oldest = map
                .iter()
                .min_by_key(|(_, e)| e.stamp)
                .map(|(k, _)| k.clone());
            if let Some(k) = oldest {
                map.remove(&k);
            }
        }
        map.insert(
            key.to_string(),
            Entry {
                content,
                is_ocr,
                stamp: now,
            },
        );
    }

    pub(crate) fn get_at(&self, now: Instant, key: &str) -> Option<(String, bool)> {
        let mut map = self.lock();
        let expired = match map.get(key) {
            None => return None,
            Some(e) => now.saturating_duration_since(e.stamp) > self.cfg.ttl,
        };
        if expired {
            map.remove(key);
            return None;
        }
        let e = map.get_mut(key)?;
        e.stamp = now;
        Some((e.content.clone(), e.is_ocr))
    }
}

impl Default for ContentCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
