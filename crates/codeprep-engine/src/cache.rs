use std::time::{Duration, Instant};

use async_trait::async_trait;
use codeprep_core::{CatalogConfig, Difficulty, Problem};
use dashmap::DashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Problem generation failed: {0}")]
    Generation(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub topic: String,
    pub count: usize,
    pub difficulty: Difficulty,
}

/// Producer of problems in the engine's schema, such as a question generator.
#[async_trait]
pub trait ProblemSource: Send + Sync {
    async fn problems(&self, key: &CacheKey) -> Result<Vec<Problem>, SourceError>;
}

struct CacheEntry {
    problems: Vec<Problem>,
    inserted: Instant,
}

/// Generated problem lists keyed by request, expiring after a fixed TTL.
pub struct ProblemCache {
    entries: DashMap<CacheKey, CacheEntry>,
    ttl: Duration,
}

impl ProblemCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn from_config(config: &CatalogConfig) -> Self {
        Self::new(Duration::from_secs(config.cache_ttl_secs))
    }

    pub fn get(&self, key: &CacheKey) -> Option<Vec<Problem>> {
        let hit = self
            .entries
            .get(key)
            .filter(|entry| entry.inserted.elapsed() < self.ttl)
            .map(|entry| entry.problems.clone());
        if hit.is_none() {
            // Re-checked under the shard lock: a fresh insert since the read stays.
            self.entries
                .remove_if(key, |_, entry| entry.inserted.elapsed() >= self.ttl);
        }
        hit
    }

    pub fn insert(&self, key: CacheKey, problems: Vec<Problem>) {
        self.entries.insert(
            key,
            CacheEntry {
                problems,
                inserted: Instant::now(),
            },
        );
    }

    /// Drops every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.inserted.elapsed() < self.ttl);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Serves repeated requests from the cache. Generated problems that fail
/// the shape check are dropped before caching.
pub struct CachedProblemSource<S> {
    inner: S,
    cache: ProblemCache,
}

impl<S: ProblemSource> CachedProblemSource<S> {
    pub fn new(inner: S, cache: ProblemCache) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &ProblemCache {
        &self.cache
    }
}

#[async_trait]
impl<S: ProblemSource> ProblemSource for CachedProblemSource<S> {
    async fn problems(&self, key: &CacheKey) -> Result<Vec<Problem>, SourceError> {
        if let Some(hit) = self.cache.get(key) {
            tracing::debug!(topic = %key.topic, count = key.count, "Problem cache hit");
            return Ok(hit);
        }

        let generated = self.inner.problems(key).await?;
        let valid: Vec<Problem> = generated
            .into_iter()
            .filter(|p| match p.validate() {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(problem = %p.id, error = %e, "Dropping generated problem");
                    false
                }
            })
            .collect();

        self.cache.insert(key.clone(), valid.clone());
        Ok(valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeprep_core::{TestCase, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn problem(id: &str, expected: Value) -> Problem {
        Problem {
            id: id.to_string(),
            title: id.to_string(),
            difficulty: Difficulty::Easy,
            description: String::new(),
            example: String::new(),
            starter: format!("function {}() {{}}", id),
            test_cases: vec![TestCase {
                input: Value::Int(1),
                expected,
            }],
            visible_cases: 3,
        }
    }

    fn key() -> CacheKey {
        CacheKey {
            topic: "arrays".to_string(),
            count: 2,
            difficulty: Difficulty::Medium,
        }
    }

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ProblemSource for CountingSource {
        async fn problems(&self, _key: &CacheKey) -> Result<Vec<Problem>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![
                problem("good", Value::Int(2)),
                problem("bad", Value::Array(vec![Value::Int(1), Value::Bool(true)])),
            ])
        }
    }

    #[test]
    fn test_hit_within_ttl() {
        let cache = ProblemCache::new(Duration::from_secs(60));
        cache.insert(key(), vec![problem("a", Value::Int(1))]);
        assert_eq!(cache.get(&key()).map(|p| p.len()), Some(1));
        let other = CacheKey { count: 3, ..key() };
        assert!(cache.get(&other).is_none());
    }

    #[test]
    fn test_expired_entries_are_dropped() {
        let cache = ProblemCache::new(Duration::ZERO);
        cache.insert(key(), vec![problem("a", Value::Int(1))]);
        assert!(cache.get(&key()).is_none());
        assert!(cache.is_empty());

        cache.insert(key(), vec![]);
        assert_eq!(cache.purge_expired(), 1);
    }

    #[test]
    fn test_expired_miss_keeps_reinserted_entry() {
        let cache = ProblemCache::new(Duration::from_millis(100));
        cache.insert(key(), vec![problem("old", Value::Int(1))]);
        std::thread::sleep(Duration::from_millis(150));

        let entry = cache.entries.get(&key()).unwrap();
        assert!(entry.inserted.elapsed() >= cache.ttl);
        drop(entry);
        // Replaced between the stale read and the eviction.
        cache.insert(key(), vec![problem("new", Value::Int(1))]);
        cache
            .entries
            .remove_if(&key(), |_, entry| entry.inserted.elapsed() >= cache.ttl);

        let hit = cache.get(&key()).unwrap();
        assert_eq!(hit[0].id, "new");
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_cached_source_generates_once_and_filters() {
        let source = CachedProblemSource::new(
            CountingSource {
                calls: AtomicUsize::new(0),
            },
            ProblemCache::new(Duration::from_secs(60)),
        );
        let first = source.problems(&key()).await.unwrap();
        let second = source.problems(&key()).await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first, second);
        assert_eq!(source.inner.calls.load(Ordering::SeqCst), 1);
    }
}
