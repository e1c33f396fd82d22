//! Notification publisher
//!
//! Serializes an invitation task into its first-attempt envelope and
//! durably enqueues it. Publish failures surface to the caller, unlike
//! every cache failure: a lost invitation is a correctness bug, so the
//! collaborator-add that triggered the publish must fail as a whole.

use std::sync::Arc;

use tracing::info;

use crate::error::{AppError, Result};
use crate::models::NotificationTask;
use crate::queue::broker::MessageQueue;
use crate::queue::envelope::TaskEnvelope;

// == Notification Publisher ==
/// Producer side of the email queue.
#[derive(Clone)]
pub struct NotificationPublisher {
    queue: Arc<dyn MessageQueue>,
}

impl NotificationPublisher {
    /// Creates a publisher over the given queue.
    pub fn new(queue: Arc<dyn MessageQueue>) -> Self {
        Self { queue }
    }

    /// Enqueues an invitation task.
    pub async fn publish(&self, task: NotificationTask) -> Result<()> {
        let target = task.target_email.clone();
        let envelope = TaskEnvelope::first(task);
        let payload = serde_json::to_vec(&envelope)
            .map_err(|err| AppError::PublishFailure(err.to_string()))?;

        self.queue
            .publish(&payload)
            .await
            .map_err(|err| AppError::PublishFailure(err.to_string()))?;

        info!(target_email = %target, "invitation task published");
        Ok(())
    }
}
