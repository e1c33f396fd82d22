//! Message queue trait and in-memory broker
//!
//! The queue contract the publisher and worker are written against:
//! durable publish, blocking dequeue, manual acknowledgement. A delivery
//! stays owned by the broker until it is acked or dead-lettered; anything
//! claimed but never acked is returned to the queue by `recover_pending`,
//! which is what makes at-least-once delivery observable across a worker
//! crash.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{Mutex, Notify};

// == Queue Error ==
/// Error raised by a queue backend.
#[derive(Error, Debug)]
pub enum QueueError {
    /// The broker could not be reached or the operation failed
    #[error("message broker unavailable: {0}")]
    Unavailable(String),
}

/// Convenience Result type for queue operations.
pub type QueueResult<T> = std::result::Result<T, QueueError>;

// == Delivery ==
/// A message claimed from the queue, pending acknowledgement.
#[derive(Debug, Clone)]
pub struct Delivery {
    /// Raw message payload
    pub payload: Vec<u8>,
    /// Broker-specific receipt used to settle the delivery
    pub receipt: u64,
}

// == Message Queue Trait ==
/// Durable queue operations used by the publisher and the worker.
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// Durably enqueues a payload.
    async fn publish(&self, payload: &[u8]) -> QueueResult<()>;

    /// Blocks until the next message is available and claims it.
    /// The claim is exclusive but not final: only `ack` removes it.
    async fn next_delivery(&self) -> QueueResult<Delivery>;

    /// Acknowledges a delivery, permanently removing the message.
    async fn ack(&self, delivery: &Delivery) -> QueueResult<()>;

    /// Settles a delivery by moving its message to the dead-letter queue.
    async fn dead_letter(&self, delivery: &Delivery) -> QueueResult<()>;

    /// Returns claimed-but-unacked messages to the queue, e.g. after a
    /// worker crash. Returns the number of messages requeued.
    async fn recover_pending(&self) -> QueueResult<u64>;
}

// == Memory Queue ==
/// In-process queue with the same settlement semantics as the external
/// broker. Used by tests and by single-node deployments without a broker;
/// durability is process-lifetime only.
#[derive(Debug, Default)]
pub struct MemoryQueue {
    state: Mutex<QueueState>,
    notify: Notify,
    next_receipt: AtomicU64,
}

#[derive(Debug, Default)]
struct QueueState {
    ready: VecDeque<Vec<u8>>,
    pending: Vec<(u64, Vec<u8>)>,
    dead: Vec<Vec<u8>>,
}

impl MemoryQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages waiting to be claimed.
    pub async fn ready_len(&self) -> usize {
        self.state.lock().await.ready.len()
    }

    /// Number of claimed, unsettled messages.
    pub async fn pending_len(&self) -> usize {
        self.state.lock().await.pending.len()
    }

    /// Snapshot of the dead-letter queue.
    pub async fn dead_letters(&self) -> Vec<Vec<u8>> {
        self.state.lock().await.dead.clone()
    }
}

#[async_trait]
impl MessageQueue for MemoryQueue {
    async fn publish(&self, payload: &[u8]) -> QueueResult<()> {
        let mut state = self.state.lock().await;
        state.ready.push_back(payload.to_vec());
        drop(state);
        self.notify.notify_one();
        Ok(())
    }

    async fn next_delivery(&self) -> QueueResult<Delivery> {
        loop {
            // Register for wakeup before checking, so a publish between
            // the check and the await cannot be missed.
            let notified = self.notify.notified();

            {
                let mut state = self.state.lock().await;
                if let Some(payload) = state.ready.pop_front() {
                    let receipt = self.next_receipt.fetch_add(1, Ordering::Relaxed);
                    state.pending.push((receipt, payload.clone()));
                    return Ok(Delivery { payload, receipt });
                }
            }

            notified.await;
        }
    }

    async fn ack(&self, delivery: &Delivery) -> QueueResult<()> {
        let mut state = self.state.lock().await;
        state.pending.retain(|(receipt, _)| *receipt != delivery.receipt);
        Ok(())
    }

    async fn dead_letter(&self, delivery: &Delivery) -> QueueResult<()> {
        let mut state = self.state.lock().await;
        if let Some(index) = state
            .pending
            .iter()
            .position(|(receipt, _)| *receipt == delivery.receipt)
        {
            let (_, payload) = state.pending.remove(index);
            state.dead.push(payload);
        }
        Ok(())
    }

    async fn recover_pending(&self) -> QueueResult<u64> {
        let mut state = self.state.lock().await;
        let requeued = state.pending.len() as u64;
        // Requeue in claim order, ahead of newer messages.
        let claimed: Vec<Vec<u8>> = state.pending.drain(..).map(|(_, p)| p).collect();
        for payload in claimed.into_iter().rev() {
            state.ready.push_front(payload);
        }
        drop(state);
        for _ in 0..requeued {
            self.notify.notify_one();
        }
        Ok(requeued)
    }
}
