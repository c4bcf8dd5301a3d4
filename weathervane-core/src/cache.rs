//! Keyed TTL cache for fetched weather records.
//!
//! One entry per normalized lookup key; an entry for one city is never
//! disturbed by fetches (or fetch failures) for another.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::model::{WeatherRecord, normalize_key};

/// A cached record together with the instant it was stored.
///
/// Superseded wholesale by a later `put` for the same key, never patched.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: String,
    pub record: WeatherRecord,
    pub cached_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct TtlCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
}

impl TtlCache {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            entries: HashMap::new(),
            ttl: Duration::seconds(ttl_seconds as i64),
        }
    }

    /// Look up a live entry for `key` as of `now`.
    ///
    /// Expiry is strict: an entry whose age is exactly the TTL is already a
    /// miss. Expired entries are left in place; the next `put` overwrites
    /// them.
    pub fn get(&self, key: &str, now: DateTime<Utc>) -> Option<&CacheEntry> {
        let entry = self.entries.get(&normalize_key(key))?;
        if now - entry.cached_at < self.ttl {
            Some(entry)
        } else {
            None
        }
    }

    /// Store a record for `key`, replacing any previous entry.
    pub fn put(&mut self, key: &str, record: WeatherRecord, now: DateTime<Utc>) {
        let key = normalize_key(key);
        self.entries.insert(
            key.clone(),
            CacheEntry { key, record, cached_at: now },
        );
    }

    /// Drop the entry for `key`, if any.
    pub fn invalidate(&mut self, key: &str) {
        self.entries.remove(&normalize_key(key));
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
