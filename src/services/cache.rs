use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::services::scorecard::{InstitutionPage, ScorecardQuery};

/// Default time a provider page stays valid
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// In-memory TTL cache of provider pages
///
/// Cloning is cheap and clones share the same entries.
#[derive(Clone)]
pub struct ResponseCache {
    pages: moka::future::Cache<String, InstitutionPage>,
    ttl: Duration,
}

impl ResponseCache {
    /// Create a cache holding up to `capacity` pages for `ttl` each
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let pages = moka::future::CacheBuilder::new(capacity)
            .time_to_live(ttl)
            .build();

        Self { pages, ttl }
    }

    pub async fn get(&self, key: &str) -> Option<InstitutionPage> {
        let hit = self.pages.get(key).await;
        if hit.is_some() {
            tracing::trace!("Cache hit: {}", key);
        } else {
            tracing::trace!("Cache miss: {}", key);
        }
        hit
    }

    pub async fn insert(&self, key: String, page: InstitutionPage) {
        tracing::trace!("Cache set: {}", key);
        self.pages.insert(key, page).await;
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.pages.entry_count(),
            ttl_secs: self.ttl.as_secs(),
        }
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(1_000, DEFAULT_TTL)
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: u64,
    pub ttl_secs: u64,
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for one page of a provider query
    pub fn page(query: &ScorecardQuery, page: u32) -> String {
        format!("scorecard:{}:{}", query.cache_fragment(), page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InstitutionRecord;

    fn sample_page() -> InstitutionPage {
        InstitutionPage {
            results: vec![InstitutionRecord { id: 1, ..Default::default() }],
            total: 1,
            page: 0,
            per_page: 100,
            has_more: false,
        }
    }

    #[tokio::test]
    async fn test_cache_set_get() {
        let cache = ResponseCache::default();
        let key = CacheKey::page(&ScorecardQuery::for_state("WA"), 0);

        assert!(cache.get(&key).await.is_none());
        cache.insert(key.clone(), sample_page()).await;
        assert_eq!(cache.get(&key).await, Some(sample_page()));

        let other = CacheKey::page(&ScorecardQuery::for_state("WA"), 1);
        assert!(cache.get(&other).await.is_none());
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let cache = ResponseCache::new(10, Duration::from_millis(50));
        cache.insert("k".to_string(), sample_page()).await;

        tokio::time::sleep(Duration::from_millis(120)).await;

        assert!(cache.get("k").await.is_none());
    }

    #[test]
    fn test_cache_key_builder() {
        assert_eq!(CacheKey::page(&ScorecardQuery::for_state("WA"), 2), "scorecard:school.state=WA:2");
        assert_eq!(CacheKey::page(&ScorecardQuery::for_id(42), 0), "scorecard:id=42:0");
        assert_eq!(CacheKey::page(&ScorecardQuery::broad(), 0), "scorecard:all:0");
    }
}
