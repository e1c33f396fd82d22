//! Queue Module
//!
//! Durable producer/consumer queue for collaboration-invitation emails.
//! At-least-once semantics: a published task may be delivered more than
//! once, but is never silently dropped once the publish call succeeds.

mod broker;
mod envelope;
mod publisher;
mod redis;

// Re-export public types
pub use broker::{Delivery, MemoryQueue, MessageQueue, QueueError, QueueResult};
pub use envelope::TaskEnvelope;
pub use publisher::NotificationPublisher;
pub use redis::RedisQueue;
