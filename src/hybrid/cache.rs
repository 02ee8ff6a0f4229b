//! Expiring cache of recommendation results.

use ahash::AHashMap;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use super::types::RecommendationResult;
use crate::config::{CacheConfig, MAX_CACHE_TTL_SECONDS};

/// Cache key: one entry per user, page and session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub user_id: String,
    pub current_page: String,
    pub session_id: Option<String>,
}

impl CacheKey {
    pub fn new<U: Into<String>, P: Into<String>>(
        user_id: U,
        current_page: P,
        session_id: Option<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            current_page: current_page.into(),
            session_id,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    result: RecommendationResult,
    created_at: DateTime<Utc>,
}

/// Recommendation results with a time to live.
///
/// Expiry is checked on read; [`RecommendationCache::cleanup_expired`] is
/// only needed to bound memory.
#[derive(Debug)]
pub struct RecommendationCache {
    ttl: Duration,
    max_entries: usize,
    entries: Mutex<AHashMap<CacheKey, CacheEntry>>,
}

impl RecommendationCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            ttl: Duration::seconds(
                config.ttl_seconds.clamp(1, MAX_CACHE_TTL_SECONDS),
            ),
            max_entries: config.max_entries,
            entries: Mutex::new(AHashMap::new()),
        }
    }

    fn is_expired(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now - entry.created_at >= self.ttl
    }

    /// Fresh result for `key`, removing it if it has expired.
    pub fn get(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<RecommendationResult> {
        let mut entries = self.entries.lock();
        let entry = entries.get(key)?;
        if self.is_expired(entry, now) {
            entries.remove(key);
            return None;
        }
        Some(entry.result.clone())
    }

    pub fn insert(&self, key: CacheKey, result: RecommendationResult, now: DateTime<Utc>) {
        let mut entries = self.entries.lock();

        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            entries.retain(|_, entry| now - entry.created_at < self.ttl);
            if entries.len() >= self.max_entries {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.created_at)
                    .map(|(key, _)| key.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                }
            }
        }

        entries.insert(
            key,
            CacheEntry {
                result,
                created_at: now,
            },
        );
    }

    /// Remove every entry of `user_id`. Returns the number removed.
    pub fn invalidate_user(&self, user_id: &str) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|key, _| key.user_id != user_id);
        before - entries.len()
    }

    /// Remove expired entries. Returns the number removed.
    pub fn cleanup_expired(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, entry| now - entry.created_at < self.ttl);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::hybrid::types::{Algorithm, MODEL_VERSION, RecommendationMetadata};

    fn at(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + Duration::minutes(minute)
    }

    fn result() -> RecommendationResult {
        RecommendationResult {
            suggestions: Vec::new(),
            algorithm: Algorithm::Fallback,
            confidence: 0.0,
            explanations: Vec::new(),
            metadata: RecommendationMetadata {
                processing_time_ms: 0,
                input_size: 0,
                candidate_count: 0,
                neighbor_count: 0,
                model_version: MODEL_VERSION.to_string(),
            },
        }
    }

    fn key(user: &str, page: &str) -> CacheKey {
        CacheKey::new(user, page, Some("s1".to_string()))
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let cache = RecommendationCache::new(&CacheConfig::default());
        cache.insert(key("u1", "/dashboard"), result(), at(0));

        assert!(cache.get(&key("u1", "/dashboard"), at(14)).is_some());
        assert!(cache.get(&key("u1", "/dashboard"), at(15)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_user() {
        let cache = RecommendationCache::new(&CacheConfig::default());
        cache.insert(key("u1", "/dashboard"), result(), at(0));
        cache.insert(key("u1", "/revenue"), result(), at(0));
        cache.insert(key("u2", "/dashboard"), result(), at(0));

        assert_eq!(cache.invalidate_user("u1"), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key("u2", "/dashboard"), at(1)).is_some());
    }

    #[test]
    fn test_cleanup_expired() {
        let cache = RecommendationCache::new(&CacheConfig::default());
        cache.insert(key("u1", "/a"), result(), at(0));
        cache.insert(key("u1", "/b"), result(), at(10));

        assert_eq!(cache.cleanup_expired(at(20)), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_max_entries_evicts_oldest() {
        let config = CacheConfig {
            max_entries: 2,
            ..CacheConfig::default()
        };
        let cache = RecommendationCache::new(&config);
        cache.insert(key("u1", "/a"), result(), at(0));
        cache.insert(key("u1", "/b"), result(), at(1));
        cache.insert(key("u1", "/c"), result(), at(2));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key("u1", "/a"), at(3)).is_none());
        assert!(cache.get(&key("u1", "/c"), at(3)).is_some());
    }
}
