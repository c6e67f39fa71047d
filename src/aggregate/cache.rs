//! Run-scoped image cache
//!
//! This module provides the cache the image resolver consults before any
//! network access. An empty URL is a negative entry: "resolved, nothing
//! found". It is served exactly like a real URL, so a monster identity is
//! fetched at most once per run unless a retry budget is configured for
//! transient failures.

use crate::dataset::MonsterRecord;
use std::collections::HashMap;
use std::fmt;

/// Composite key treating two monster records as the same creature
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonsterIdentityKey {
    pub combat_level: u32,
    pub name: String,
}

impl MonsterIdentityKey {
    pub fn new(combat_level: u32, name: impl Into<String>) -> Self {
        Self {
            combat_level,
            name: name.into(),
        }
    }

    pub fn of(monster: &MonsterRecord) -> Self {
        Self::new(monster.combat_level, monster.name.clone())
    }
}

impl fmt::Display for MonsterIdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (level {})", self.name, self.combat_level)
    }
}

/// Cached resolution for one monster identity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CachedImage {
    /// Resolved URL, or empty for a negative entry
    pub url: String,

    /// Attempts that ended in a transient failure
    pub transient_failures: u32,

    /// An attempt completed: an image was found or the page had none
    pub settled: bool,
}

impl CachedImage {
    /// Whether another fetch is allowed under the given retry budget
    ///
    /// Only entries whose every attempt failed transiently qualify.
    pub fn is_retryable(&self, retry_limit: u32) -> bool {
        !self.settled
            && self.url.is_empty()
            && self.transient_failures > 0
            && self.transient_failures <= retry_limit
    }
}

/// Image URLs keyed by monster identity, for a single aggregation run
#[derive(Debug, Clone, Default)]
pub struct ImageCache {
    entries: HashMap<MonsterIdentityKey, CachedImage>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached URL unless the entry may still be retried
    ///
    /// # Arguments
    ///
    /// * `key` - The monster identity
    /// * `retry_limit` - Extra attempts allowed after transient failures
    ///
    /// # Returns
    ///
    /// * `Some(url)` - Serve this value, possibly the empty sentinel
    /// * `None` - Resolve over the network
    pub fn lookup(&self, key: &MonsterIdentityKey, retry_limit: u32) -> Option<&str> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_retryable(retry_limit))
            .map(|entry| entry.url.as_str())
    }

    /// Writes the empty sentinel before a resolution attempt
    ///
    /// An existing entry keeps its failure count.
    pub fn mark_pending(&mut self, key: &MonsterIdentityKey) {
        self.entries.entry(key.clone()).or_default().url.clear();
    }

    /// Records a resolved URL
    pub fn store(&mut self, key: &MonsterIdentityKey, url: &str) {
        let entry = self.entries.entry(key.clone()).or_default();
        entry.url = url.to_string();
        entry.settled = true;
    }

    /// Records that the page was read and had no image
    ///
    /// The negative entry is final regardless of earlier transient failures.
    pub fn settle_empty(&mut self, key: &MonsterIdentityKey) {
        let entry = self.entries.entry(key.clone()).or_default();
        entry.url.clear();
        entry.settled = true;
    }

    /// Records a transient failure, leaving a negative entry
    pub fn record_failure(&mut self, key: &MonsterIdentityKey) {
        let entry = self.entries.entry(key.clone()).or_default();
        entry.url.clear();
        entry.transient_failures += 1;
    }

    pub fn get(&self, key: &MonsterIdentityKey) -> Option<&CachedImage> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of negative entries
    pub fn negative_count(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.url.is_empty())
            .count()
    }
}
