//! Explicit snapshot cache. The dashboard this engine powers re-runs the
//! same history query for every widget on a page; memoizing the snapshot is
//! the caller's concern, so the cache is an injected backend wrapped around
//! the store, never ambient state inside the services.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{errors::ServiceError, models::OrderLine, store::OrderHistoryStore};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("cache operation failed: {0}")]
    OperationFailed(String),
}

#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
    async fn clear(&self) -> Result<(), CacheError>;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(value: String, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.map(|d| Instant::now() + d),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() > at)
    }
}

/// In-memory TTL cache over a concurrent map. Bounded: when full, expired
/// entries are purged first and the insert is skipped if the map is still at
/// capacity — callers simply fall through to the store.
#[derive(Debug, Clone)]
pub struct InMemoryCache {
    entries: Arc<DashMap<String, CacheEntry>>,
    max_entries: usize,
}

impl InMemoryCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            max_entries,
        }
    }

    fn purge_expired(&self) {
        self.entries.retain(|_, entry| !entry.is_expired());
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new(CacheConfig::default().max_entries)
    }
}

#[async_trait]
impl CacheBackend for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => Ok(Some(entry.value.clone())),
            Some(_) => {
                drop(self.entries.remove(key));
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        if self.entries.len() >= self.max_entries {
            self.purge_expired();
            if self.entries.len() >= self.max_entries && !self.entries.contains_key(key) {
                debug!(key, "cache at capacity, skipping insert");
                return Ok(());
            }
        }
        self.entries
            .insert(key.to_string(), CacheEntry::new(value.to_string(), ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.entries.clear();
        Ok(())
    }
}

/// Cache tuning, a section of [`crate::config::AppConfig`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    pub default_ttl_secs: Option<u64>,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_ttl_secs: Some(300),
            max_entries: 64,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Option<Duration> {
        self.default_ttl_secs.map(Duration::from_secs)
    }
}

/// Store wrapper that memoizes snapshots keyed on the query parameters. A
/// cache failure is logged and degraded to a direct store read; it never
/// fails the computation.
pub struct CachedOrderStore {
    inner: Arc<dyn OrderHistoryStore>,
    cache: Arc<dyn CacheBackend>,
    ttl: Option<Duration>,
}

impl CachedOrderStore {
    pub fn new(
        inner: Arc<dyn OrderHistoryStore>,
        cache: Arc<dyn CacheBackend>,
        ttl: Option<Duration>,
    ) -> Self {
        Self { inner, cache, ttl }
    }

    fn key(since: NaiveDate) -> String {
        format!("order_lines:{since}")
    }
}

#[async_trait]
impl OrderHistoryStore for CachedOrderStore {
    async fn load_order_lines(&self, since: NaiveDate) -> Result<Vec<OrderLine>, ServiceError> {
        let key = Self::key(since);

        match self.cache.get(&key).await {
            Ok(Some(cached)) => match serde_json::from_str(&cached) {
                Ok(lines) => {
                    debug!(%key, "order history cache hit");
                    return Ok(lines);
                }
                Err(err) => {
                    tracing::warn!(%key, error = %err, "discarding undecodable cache entry");
                    let _ = self.cache.delete(&key).await;
                }
            },
            Ok(None) => {}
            Err(err) => tracing::warn!(%key, error = %err, "cache read failed"),
        }

        let lines = self.inner.load_order_lines(since).await?;
        match serde_json::to_string(&lines) {
            Ok(encoded) => {
                if let Err(err) = self.cache.set(&key, &encoded, self.ttl).await {
                    tracing::warn!(%key, error = %err, "cache write failed");
                }
            }
            Err(err) => tracing::warn!(%key, error = %err, "snapshot not cacheable"),
        }
        Ok(lines)
    }
}
