use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};

use async_trait::async_trait;
use scout_model::Task;
use tracing::debug;

use crate::{error::ApiError, handler::TaskLookup};

/// How long a service's task list is served from memory.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(20);

struct Entry {
    expires: Instant,
    tasks: Vec<Task>,
}

/// Per-service TTL cache in front of another [`TaskLookup`].
///
/// Only successful lookups are stored. Concurrent misses for the same service
/// may each reach the inner lookup.
pub struct CachedLookup<H> {
    inner: H,
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry>>,
}

impl<H> CachedLookup<H>
where
    H: TaskLookup,
{
    pub fn new(inner: H, ttl: Duration) -> Self {
        Self {
            inner,
            ttl: if ttl.is_zero() { DEFAULT_CACHE_TTL } else { ttl },
            entries: Mutex::new(HashMap::new()),
        }
    }

    #[inline]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn cached(&self, service: &str, now: Instant) -> Option<Vec<Task>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(service)
            .filter(|e| e.expires > now)
            .map(|e| e.tasks.clone())
    }

    /// Drop every cached service.
    pub fn purge(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[async_trait]
impl<H> TaskLookup for CachedLookup<H>
where
    H: TaskLookup,
{
    async fn find_tasks(&self, service: &str) -> Result<Vec<Task>, ApiError> {
        let now = Instant::now();
        if let Some(tasks) = self.cached(service, now) {
            debug!(service, tasks = tasks.len(), "cache hit");
            return Ok(tasks);
        }

        let tasks = self.inner.find_tasks(service).await?;

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, e| e.expires > now);
        entries.insert(
            service.to_string(),
            Entry {
                expires: Instant::now() + self.ttl,
                tasks: tasks.clone(),
            },
        );
        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;

    #[derive(Clone, Default)]
    struct Counting {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl TaskLookup for Counting {
        async fn find_tasks(&self, service: &str) -> Result<Vec<Task>, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ApiError::Internal("inventory down".into()));
            }
            Ok(vec![Task::new(format!("arn:{service}"), "10.0.0.1", "", "RUNNING")])
        }
    }

    #[tokio::test]
    async fn repeated_lookups_hit_the_cache() {
        let inner = Counting::default();
        let cache = CachedLookup::new(inner.clone(), Duration::from_secs(60));

        let a = cache.find_tasks("web").await.unwrap();
        let b = cache.find_tasks("web").await.unwrap();

        assert_eq!(a, b);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn services_are_cached_separately() {
        let inner = Counting::default();
        let cache = CachedLookup::new(inner.clone(), Duration::from_secs(60));

        cache.find_tasks("web").await.unwrap();
        let api = cache.find_tasks("api").await.unwrap();

        assert_eq!(api[0].arn, "arn:api");
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn entries_expire() {
        let inner = Counting::default();
        let cache = CachedLookup::new(inner.clone(), Duration::from_millis(20));

        cache.find_tasks("web").await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        cache.find_tasks("web").await.unwrap();

        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let inner = Counting {
            fail: true,
            ..Default::default()
        };
        let cache = CachedLookup::new(inner.clone(), Duration::from_secs(60));

        assert!(cache.find_tasks("web").await.is_err());
        assert!(cache.find_tasks("web").await.is_err());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn purge_forgets_everything() {
        let inner = Counting::default();
        let cache = CachedLookup::new(inner.clone(), Duration::from_secs(60));

        cache.find_tasks("web").await.unwrap();
        cache.purge();
        cache.find_tasks("web").await.unwrap();

        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn zero_ttl_uses_default() {
        let cache = CachedLookup::new(Counting::default(), Duration::ZERO);
        assert_eq!(cache.ttl(), DEFAULT_CACHE_TTL);
    }
}
