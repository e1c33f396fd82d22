//! Delivery envelope
//!
//! Wire wrapper around a notification task carrying the delivery-attempt
//! counter that bounds transport retries. The counter travels with the
//! message so any worker instance, on any host, applies the same policy.

use serde::{Deserialize, Serialize};

use crate::models::NotificationTask;

// == Task Envelope ==
/// A notification task plus its delivery-attempt count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEnvelope {
    /// Delivery attempts made so far (1 on first publish)
    pub attempts: u32,
    /// The wrapped task
    pub task: NotificationTask,
}

impl TaskEnvelope {
    /// Wraps a freshly published task.
    pub fn first(task: NotificationTask) -> Self {
        Self { attempts: 1, task }
    }

    /// The envelope to republish after a failed delivery.
    pub fn next_attempt(&self) -> Self {
        Self {
            attempts: self.attempts + 1,
            task: self.task.clone(),
        }
    }

    /// True once this attempt count has reached the cap.
    pub fn exhausted(&self, max_attempts: u32) -> bool {
        self.attempts >= max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use uuid::Uuid;

    fn sample_task() -> NotificationTask {
        let user = User::new("Ada", "Lovelace", "ada@example.com");
        NotificationTask::invitation("c@x.com", &user, "T", Uuid::new_v4())
    }

    #[test]
    fn test_first_attempt_is_one() {
        let envelope = TaskEnvelope::first(sample_task());
        assert_eq!(envelope.attempts, 1);
        assert!(!envelope.exhausted(5));
    }

    #[test]
    fn test_next_attempt_bumps_counter() {
        let envelope = TaskEnvelope::first(sample_task());
        let retried = envelope.next_attempt();
        assert_eq!(retried.attempts, 2);
        assert_eq!(retried.task, envelope.task);
    }

    #[test]
    fn test_exhausted_at_cap() {
        let mut envelope = TaskEnvelope::first(sample_task());
        envelope.attempts = 5;
        assert!(envelope.exhausted(5));
        assert!(!envelope.exhausted(6));
    }
}
