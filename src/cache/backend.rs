//! Cache backend trait and local implementations
//!
//! The backend is the raw key/value surface the manager speaks to: get,
//! set-with-ttl, and pattern delete. Implementations must be safe for
//! concurrent use; error semantics are decided one layer up, in the
//! manager, which treats every backend error as a degradation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

// == Cache Error ==
/// Error raised by a cache backend.
///
/// Never escapes the cache layer; the manager converts it into an
/// `Unavailable` lookup outcome.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The backend could not be reached or the operation failed
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}

/// Convenience Result type for backend operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

// == Cache Backend Trait ==
/// Raw key/value operations against the external cache store.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Fetches a raw value. `Ok(None)` is a miss.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores a raw value with a TTL in seconds.
    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()>;

    /// Deletes every key matching a glob pattern, returning the count.
    async fn delete_pattern(&self, pattern: &str) -> CacheResult<u64>;
}

// == Memory Backend ==
/// In-process cache backend with TTL expiration.
///
/// Used by tests and by local single-node deployments that run without an
/// external cache store. The `set_unavailable` switch simulates a backend
/// outage so degradation paths can be exercised.
#[derive(Debug, Default)]
pub struct MemoryCacheBackend {
    entries: RwLock<HashMap<String, MemoryEntry>>,
    unavailable: AtomicBool,
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    /// Expiration timestamp, Unix milliseconds
    expires_at: u64,
}

impl MemoryEntry {
    fn is_expired(&self) -> bool {
        current_timestamp_ms() >= self.expires_at
    }
}

fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}

impl MemoryCacheBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles simulated outage mode. While set, every operation returns
    /// `CacheError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of live (unexpired) entries.
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.values().filter(|e| !e.is_expired()).count()
    }

    /// Returns true if no live entries exist.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_available(&self) -> CacheResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(CacheError::Unavailable("simulated outage".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CacheBackend for MemoryCacheBackend {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.check_available()?;

        // Expired entries are dropped lazily on access.
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()> {
        self.check_available()?;

        let entry = MemoryEntry {
            value: value.to_string(),
            expires_at: current_timestamp_ms() + ttl_secs * 1000,
        };
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> CacheResult<u64> {
        self.check_available()?;

        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !glob_match(pattern, key));
        Ok((before - entries.len()) as u64)
    }
}

/// Minimal glob matcher covering the patterns the key builder produces:
/// a literal prefix terminated by a single `*`.
fn glob_match(pattern: &str, key: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => key.starts_with(prefix),
        None => key == pattern,
    }
}

// == Noop Backend ==
/// Always-miss, always-succeed backend used when caching is disabled.
///
/// Reads miss, writes are discarded, invalidation deletes nothing. Keeps
/// the rest of the service on a single code path whether or not a cache
/// store is configured.
#[derive(Debug, Default)]
pub struct NoopCacheBackend;

impl NoopCacheBackend {
    /// Creates the noop backend.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CacheBackend for NoopCacheBackend {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str, _ttl_secs: u64) -> CacheResult<()> {
        Ok(())
    }

    async fn delete_pattern(&self, _pattern: &str) -> CacheResult<u64> {
        Ok(0)
    }
}
