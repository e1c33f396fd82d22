//! Redis-backed durable queue
//!
//! Reliable-queue pattern over Redis lists: `LPUSH` to publish, blocking
//! `BLMOVE` into a pending list to claim, `LREM` from the pending list to
//! acknowledge. A message therefore always lives in exactly one list, and
//! a worker crash leaves it parked in pending, where `recover_pending`
//! returns it to the main queue on the next worker start. Durability
//! across broker restarts comes from the store's persistence
//! configuration (AOF/RDB), matching the durable-queue flag of a
//! conventional broker.
//!
//! Publish and settlement share an auto-reconnecting `ConnectionManager`;
//! the blocking claim holds a dedicated connection so it cannot starve
//! unrelated commands.

use async_trait::async_trait;
use redis::aio::{ConnectionManager, MultiplexedConnection};
use redis::{AsyncCommands, Direction};
use tokio::sync::Mutex;
use tracing::warn;

use crate::queue::broker::{Delivery, MessageQueue, QueueError, QueueResult};

// == Redis Queue ==
/// Durable email-task queue over a Redis-protocol broker.
pub struct RedisQueue {
    client: redis::Client,
    settle_conn: ConnectionManager,
    /// Dedicated connection for blocking claims, rebuilt on error.
    consumer_conn: Mutex<Option<MultiplexedConnection>>,
    queue_key: String,
    pending_key: String,
    dead_key: String,
}

impl RedisQueue {
    /// Connects to the broker and binds the named queue.
    pub async fn connect(url: &str, queue_name: &str) -> QueueResult<Self> {
        let client =
            redis::Client::open(url).map_err(|err| QueueError::Unavailable(err.to_string()))?;
        let settle_conn = ConnectionManager::new(client.clone())
            .await
            .map_err(|err| QueueError::Unavailable(err.to_string()))?;
        Ok(Self {
            client,
            settle_conn,
            consumer_conn: Mutex::new(None),
            queue_key: queue_name.to_string(),
            pending_key: format!("{}:pending", queue_name),
            dead_key: format!("{}:dead", queue_name),
        })
    }

    /// Name of the dead-letter list.
    pub fn dead_letter_key(&self) -> &str {
        &self.dead_key
    }

    async fn claim_connection(&self) -> QueueResult<MultiplexedConnection> {
        let mut guard = self.consumer_conn.lock().await;
        if let Some(conn) = guard.as_ref() {
            return Ok(conn.clone());
        }
        let conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|err| QueueError::Unavailable(err.to_string()))?;
        *guard = Some(conn.clone());
        Ok(conn)
    }

    async fn drop_claim_connection(&self) {
        let mut guard = self.consumer_conn.lock().await;
        *guard = None;
    }
}

#[async_trait]
impl MessageQueue for RedisQueue {
    async fn publish(&self, payload: &[u8]) -> QueueResult<()> {
        let mut conn = self.settle_conn.clone();
        let _: i64 = conn
            .lpush(&self.queue_key, payload)
            .await
            .map_err(|err| QueueError::Unavailable(err.to_string()))?;
        Ok(())
    }

    async fn next_delivery(&self) -> QueueResult<Delivery> {
        loop {
            let mut conn = self.claim_connection().await?;
            // Atomically move the oldest message into the pending list,
            // blocking until one arrives (timeout 0 = forever).
            let moved: Result<Option<Vec<u8>>, redis::RedisError> = conn
                .blmove(
                    &self.queue_key,
                    &self.pending_key,
                    Direction::Right,
                    Direction::Left,
                    0.0,
                )
                .await;

            match moved {
                Ok(Some(payload)) => {
                    // Settlement is by payload value; no broker-side receipt.
                    return Ok(Delivery {
                        payload,
                        receipt: 0,
                    });
                }
                Ok(None) => continue,
                Err(err) => {
                    warn!(error = %err, "queue claim failed, reconnecting");
                    self.drop_claim_connection().await;
                    return Err(QueueError::Unavailable(err.to_string()));
                }
            }
        }
    }

    async fn ack(&self, delivery: &Delivery) -> QueueResult<()> {
        let mut conn = self.settle_conn.clone();
        let _: i64 = conn
            .lrem(&self.pending_key, 1, delivery.payload.as_slice())
            .await
            .map_err(|err| QueueError::Unavailable(err.to_string()))?;
        Ok(())
    }

    async fn dead_letter(&self, delivery: &Delivery) -> QueueResult<()> {
        let mut conn = self.settle_conn.clone();
        let _: i64 = conn
            .lpush(&self.dead_key, delivery.payload.as_slice())
            .await
            .map_err(|err| QueueError::Unavailable(err.to_string()))?;
        let _: i64 = conn
            .lrem(&self.pending_key, 1, delivery.payload.as_slice())
            .await
            .map_err(|err| QueueError::Unavailable(err.to_string()))?;
        Ok(())
    }

    async fn recover_pending(&self) -> QueueResult<u64> {
        let mut conn = self.settle_conn.clone();
        let mut requeued = 0;
        loop {
            // Oldest claimed message back onto the consuming end of the
            // main queue, one at a time.
            let moved: Option<Vec<u8>> = conn
                .lmove(
                    &self.pending_key,
                    &self.queue_key,
                    Direction::Right,
                    Direction::Right,
                )
                .await
                .map_err(|err| QueueError::Unavailable(err.to_string()))?;
            match moved {
                Some(_) => requeued += 1,
                None => break,
            }
        }
        Ok(requeued)
    }
}
