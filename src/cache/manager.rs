//! Cache manager
//!
//! The cache-aside layer between the note service and the raw backend.
//! Every operation here is advisory: reads degrade to a miss, writes and
//! invalidations are best-effort, and no backend failure ever escapes to
//! a caller. Reads must stay correct with the cache fully unavailable,
//! only slower.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cache::backend::CacheBackend;
use crate::cache::key::CacheKey;
use crate::cache::stats::{CacheStats, CacheStatsSnapshot};

// == Lookup Outcome ==
/// Outcome of a cache read.
///
/// `Unavailable` is deliberately distinct from `Miss`: both fall through
/// to storage, but only one of them should wake anyone up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The exact tuple was cached; storage is skipped
    Hit(T),
    /// Nothing cached for this key
    Miss,
    /// The backend failed; treated as a miss by callers
    Unavailable,
}

impl<T> Lookup<T> {
    /// Unwraps a hit, or None for miss/unavailable.
    pub fn hit(self) -> Option<T> {
        match self {
            Lookup::Hit(value) => Some(value),
            Lookup::Miss | Lookup::Unavailable => None,
        }
    }
}

// == Cache Manager ==
/// Typed cache-aside wrapper around a [`CacheBackend`].
#[derive(Clone)]
pub struct CacheManager {
    backend: Arc<dyn CacheBackend>,
    ttl_secs: u64,
    stats: Arc<CacheStats>,
}

impl CacheManager {
    /// Creates a manager over the given backend with a default entry TTL.
    pub fn new(backend: Arc<dyn CacheBackend>, ttl_secs: u64) -> Self {
        Self {
            backend,
            ttl_secs,
            stats: Arc::new(CacheStats::new()),
        }
    }

    /// Reads and deserializes the value cached under `key`.
    ///
    /// Backend errors and undecodable payloads both degrade: the former to
    /// `Unavailable`, the latter to `Miss` (the entry will be overwritten
    /// on repopulation).
    pub async fn read<T: DeserializeOwned>(&self, key: &CacheKey) -> Lookup<T> {
        let key_str = key.to_string();
        match self.backend.get(&key_str).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    self.stats.record_hit();
                    debug!(key = %key_str, "cache hit");
                    Lookup::Hit(value)
                }
                Err(err) => {
                    warn!(key = %key_str, error = %err, "cached payload undecodable, treating as miss");
                    self.stats.record_miss();
                    Lookup::Miss
                }
            },
            Ok(None) => {
                self.stats.record_miss();
                debug!(key = %key_str, "cache miss");
                Lookup::Miss
            }
            Err(err) => {
                warn!(key = %key_str, error = %err, "cache read failed");
                self.stats.record_unavailable();
                Lookup::Unavailable
            }
        }
    }

    /// Serializes and stores a value under `key` with the default TTL.
    /// Best-effort: failures are logged, never raised.
    pub async fn write<T: Serialize>(&self, key: &CacheKey, value: &T) {
        let key_str = key.to_string();
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(key = %key_str, error = %err, "cache serialization failed");
                return;
            }
        };
        if let Err(err) = self.backend.set(&key_str, &raw, self.ttl_secs).await {
            self.stats.record_unavailable();
            warn!(key = %key_str, error = %err, "cache write failed");
        }
    }

    /// Drops every cached view for one user.
    ///
    /// Must be called strictly after the triggering write's persistence
    /// commits; the caller owns that ordering. Failures are logged and
    /// absorbed: a skipped invalidation is bounded by the entry TTL.
    pub async fn invalidate_user(&self, user_id: Uuid) {
        let pattern = CacheKey::user_pattern(user_id);
        match self.backend.delete_pattern(&pattern).await {
            Ok(removed) => {
                self.stats.record_invalidation();
                debug!(%user_id, removed, "invalidated user cache namespace");
            }
            Err(err) => {
                self.stats.record_unavailable();
                warn!(%user_id, error = %err, "cache invalidation failed, stale entries expire by TTL");
            }
        }
    }

    /// Point-in-time counter snapshot.
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::backend::MemoryCacheBackend;
    use crate::cache::key::NoteView;
    use crate::models::NoteFilters;

    fn manager_with_memory() -> (Arc<MemoryCacheBackend>, CacheManager) {
        let backend = Arc::new(MemoryCacheBackend::new());
        let manager = CacheManager::new(backend.clone(), 300);
        (backend, manager)
    }

    fn list_key(user: Uuid) -> CacheKey {
        CacheKey::new(user, NoteView::List(NoteFilters::default()))
    }

    #[tokio::test]
    async fn test_read_miss_then_hit() {
        let (_, manager) = manager_with_memory();
        let key = list_key(Uuid::new_v4());

        let lookup: Lookup<Vec<String>> = manager.read(&key).await;
        assert_eq!(lookup, Lookup::Miss);

        manager.write(&key, &vec!["T1".to_string()]).await;
        let lookup: Lookup<Vec<String>> = manager.read(&key).await;
        assert_eq!(lookup, Lookup::Hit(vec!["T1".to_string()]));
    }

    #[tokio::test]
    async fn test_backend_outage_degrades_to_unavailable() {
        let (backend, manager) = manager_with_memory();
        let key = list_key(Uuid::new_v4());

        backend.set_unavailable(true);
        let lookup: Lookup<Vec<String>> = manager.read(&key).await;
        assert_eq!(lookup, Lookup::Unavailable);

        // Writes and invalidations also absorb the failure.
        manager.write(&key, &vec!["T1".to_string()]).await;
        manager.invalidate_user(key.user_id()).await;

        let snapshot = manager.stats();
        assert!(snapshot.unavailable >= 3);
    }

    #[tokio::test]
    async fn test_undecodable_payload_is_a_miss() {
        let (backend, manager) = manager_with_memory();
        let key = list_key(Uuid::new_v4());

        backend.set(&key.to_string(), "not json", 300).await.unwrap();

        let lookup: Lookup<Vec<String>> = manager.read(&key).await;
        assert_eq!(lookup, Lookup::Miss);
    }

    #[tokio::test]
    async fn test_invalidate_user_scopes_to_namespace() {
        let (_, manager) = manager_with_memory();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        manager.write(&list_key(alice), &vec!["a".to_string()]).await;
        manager
            .write(&CacheKey::new(alice, NoteView::Shared), &vec!["s".to_string()])
            .await;
        manager.write(&list_key(bob), &vec!["b".to_string()]).await;

        manager.invalidate_user(alice).await;

        let alice_list: Lookup<Vec<String>> = manager.read(&list_key(alice)).await;
        let alice_shared: Lookup<Vec<String>> =
            manager.read(&CacheKey::new(alice, NoteView::Shared)).await;
        let bob_list: Lookup<Vec<String>> = manager.read(&list_key(bob)).await;

        assert_eq!(alice_list, Lookup::Miss);
        assert_eq!(alice_shared, Lookup::Miss);
        assert_eq!(bob_list, Lookup::Hit(vec!["b".to_string()]));
    }

    #[tokio::test]
    async fn test_stats_track_lookups() {
        let (_, manager) = manager_with_memory();
        let key = list_key(Uuid::new_v4());

        let _: Lookup<Vec<String>> = manager.read(&key).await;
        manager.write(&key, &vec!["x".to_string()]).await;
        let _: Lookup<Vec<String>> = manager.read(&key).await;

        let snapshot = manager.stats();
        assert_eq!(snapshot.hits, 1);
        assert_eq!(snapshot.misses, 1);
        assert_eq!(snapshot.hit_rate, 0.5);
    }

    #[test]
    fn test_lookup_hit_accessor() {
        assert_eq!(Lookup::Hit(1).hit(), Some(1));
        assert_eq!(Lookup::<i32>::Miss.hit(), None);
        assert_eq!(Lookup::<i32>::Unavailable.hit(), None);
    }
}
