//! In-process TTL cache for public list payloads

use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cache key for the full menu
pub const MENU_KEY: &str = "menu";

/// Cache key for the ordered category list
pub const CATEGORIES_KEY: &str = "menu_categories";

/// Invalidation count of a key, taken when a lookup misses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

/// Outcome of a cache lookup
#[derive(Debug)]
pub enum Lookup {
    /// Fresh payload
    Hit(Arc<Value>),
    /// Nothing fresh; pass the generation back to [`ResponseCache::insert`]
    Miss(Generation),
}

#[derive(Debug)]
struct Entry {
    stored_at: Instant,
    payload: Arc<Value>,
}

/// Serialized responses keyed by name, dropped after `ttl`
///
/// A payload read before an invalidation is never stored after it.
#[derive(Debug)]
pub struct ResponseCache {
    entries: DashMap<&'static str, Entry>,
    generations: DashMap<&'static str, u64>,
    ttl: Duration,
}

impl ResponseCache {
    /// Create an empty cache
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            generations: DashMap::new(),
            ttl,
        }
    }

    /// Fresh payload for `key`, or the generation to store a new one under
    #[must_use]
    pub fn lookup(&self, key: &'static str) -> Lookup {
        if let Some(entry) = self.entries.get(key) {
            if entry.stored_at.elapsed() < self.ttl {
                return Lookup::Hit(Arc::clone(&entry.payload));
            }
            // Release the shard read lock before removing
            drop(entry);
            self.entries.remove(key);
        }
        Lookup::Miss(self.generation(key))
    }

    /// Fresh payload for `key`, if any
    #[must_use]
    pub fn get(&self, key: &'static str) -> Option<Arc<Value>> {
        match self.lookup(key) {
            Lookup::Hit(payload) => Some(payload),
            Lookup::Miss(_) => None,
        }
    }

    fn generation(&self, key: &'static str) -> Generation {
        Generation(self.generations.get(key).map_or(0, |g| *g))
    }

    /// Store a payload read after the lookup that returned `generation`
    ///
    /// The payload is dropped when `key` was invalidated in between; it is
    /// returned either way.
    pub fn insert(&self, key: &'static str, generation: Generation, payload: Value) -> Arc<Value> {
        let payload = Arc::new(payload);
        // Held across the store so an invalidation cannot slip in between
        let current = self.generations.get(key);
        if current.as_deref().map_or(0, |g| *g) != generation.0 {
            tracing::debug!("Skipping stale {} payload", key);
            return payload;
        }
        self.entries.insert(
            key,
            Entry {
                stored_at: Instant::now(),
                payload: Arc::clone(&payload),
            },
        );
        payload
    }

    fn invalidate(&self, key: &'static str) {
        *self.generations.entry(key).or_insert(0) += 1;
        self.entries.remove(key);
    }

    /// Drop everything derived from menu items or categories
    pub fn invalidate_menu(&self) {
        self.invalidate(MENU_KEY);
        self.invalidate(CATEGORIES_KEY);
        tracing::debug!("Menu cache invalidated");
    }

    /// Number of stored entries, fresh or not
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
