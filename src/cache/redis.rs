//! Redis cache backend
//!
//! Speaks to the external cache store through a tokio `ConnectionManager`,
//! which multiplexes one connection and transparently reconnects after
//! outages. Namespace enumeration uses SCAN rather than KEYS so a large
//! invalidation never blocks the store.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::cache::backend::{CacheBackend, CacheError, CacheResult};

// == Redis Backend ==
/// Cache backend backed by a Redis-protocol store.
#[derive(Clone)]
pub struct RedisCacheBackend {
    conn: ConnectionManager,
}

impl RedisCacheBackend {
    /// Connects to the store at the given URL (e.g. `redis://127.0.0.1:6379`).
    ///
    /// Connection failures here are startup errors; once connected, the
    /// manager reconnects on its own and per-operation failures surface as
    /// `CacheError::Unavailable`.
    pub async fn connect(url: &str) -> CacheResult<Self> {
        let client =
            redis::Client::open(url).map_err(|err| CacheError::Unavailable(err.to_string()))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|err| CacheError::Unavailable(err.to_string()))?;
        Ok(Self { conn })
    }

    /// Wraps an existing connection manager (shared with the queue client).
    pub fn from_connection(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl CacheBackend for RedisCacheBackend {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.conn.clone();
        conn.get(key)
            .await
            .map_err(|err| CacheError::Unavailable(err.to_string()))
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(key, value, ttl_secs)
            .await
            .map_err(|err| CacheError::Unavailable(err.to_string()))?;
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> CacheResult<u64> {
        // SCAN first, DEL after: the cursor holds a borrow on its
        // connection, so the delete goes through a second handle.
        let mut scan_conn = self.conn.clone();
        let mut keys: Vec<String> = Vec::new();
        {
            let mut iter: redis::AsyncIter<'_, String> = scan_conn
                .scan_match(pattern)
                .await
                .map_err(|err| CacheError::Unavailable(err.to_string()))?;
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
        }

        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.clone();
        let removed: u64 = conn
            .del(keys)
            .await
            .map_err(|err| CacheError::Unavailable(err.to_string()))?;
        Ok(removed)
    }
}
