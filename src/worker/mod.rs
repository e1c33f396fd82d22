//! Notification Worker Module
//!
//! Long-running consumer for the email queue. Each task moves through
//! `received -> rendering -> delivering` and settles as acknowledged
//! (delivered), retried (republished with a bumped attempt counter), or
//! dead-lettered (attempt cap reached, or the payload never deserialized).
//!
//! Tasks are independent and safe to reprocess, so any number of worker
//! instances can consume the same queue; duplicate delivery is accepted,
//! lost delivery is not.

mod email;

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::mail::MailTransport;
use crate::queue::{Delivery, MessageQueue, TaskEnvelope};

pub use email::render_invitation;

/// Pause between claim attempts while the broker is unreachable.
const CLAIM_RETRY_DELAY: Duration = Duration::from_secs(5);

// == Task Outcome ==
/// Final settlement of one delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Delivered and permanently removed from the queue
    Acknowledged,
    /// Transport failed below the attempt cap; republished for retry
    Retried,
    /// Attempt cap reached or payload undecodable; parked in dead letters
    DeadLettered,
}

// == Email Worker ==
/// Consumer side of the email queue.
pub struct EmailWorker {
    queue: Arc<dyn MessageQueue>,
    mailer: Arc<dyn MailTransport>,
    mail_from: String,
    app_url: String,
    max_attempts: u32,
}

impl EmailWorker {
    /// Creates a worker bound to the given queue and transport.
    pub fn new(
        queue: Arc<dyn MessageQueue>,
        mailer: Arc<dyn MailTransport>,
        mail_from: impl Into<String>,
        app_url: impl Into<String>,
        max_attempts: u32,
    ) -> Self {
        Self {
            queue,
            mailer,
            mail_from: mail_from.into(),
            app_url: app_url.into(),
            max_attempts,
        }
    }

    /// Consumes the queue until the task is aborted.
    ///
    /// Starts by requeueing anything a crashed predecessor claimed but
    /// never settled, then blocks on the queue for each next task.
    pub async fn run(&self) {
        match self.queue.recover_pending().await {
            Ok(0) => {}
            Ok(requeued) => info!(requeued, "requeued deliveries left by a previous worker"),
            Err(err) => warn!(error = %err, "pending-delivery recovery failed"),
        }

        info!("email worker waiting for invitation tasks");
        loop {
            let delivery = match self.queue.next_delivery().await {
                Ok(delivery) => delivery,
                Err(err) => {
                    warn!(error = %err, "queue claim failed, retrying");
                    tokio::time::sleep(CLAIM_RETRY_DELAY).await;
                    continue;
                }
            };
            self.process(delivery).await;
        }
    }

    /// Settles one claimed delivery.
    pub async fn process(&self, delivery: Delivery) -> TaskOutcome {
        debug!(state = "received", "claimed delivery");

        let envelope: TaskEnvelope = match serde_json::from_slice(&delivery.payload) {
            Ok(envelope) => envelope,
            Err(err) => {
                // Poison message: undecodable payloads can never succeed,
                // so they go straight to the dead-letter queue instead of
                // looping through redelivery forever.
                error!(error = %err, "undecodable task payload, dead-lettering");
                self.settle_dead(&delivery).await;
                return TaskOutcome::DeadLettered;
            }
        };

        debug!(
            state = "rendering",
            target_email = %envelope.task.target_email,
            attempt = envelope.attempts,
            "building invitation email"
        );
        let email = render_invitation(&envelope.task, &self.mail_from, &self.app_url);

        debug!(state = "delivering", target_email = %email.to, "sending through mail transport");
        match self.mailer.send(&email).await {
            Ok(()) => {
                if let Err(err) = self.queue.ack(&delivery).await {
                    // The send went out but the ack did not: the task will
                    // be redelivered and the recipient may get a duplicate,
                    // which at-least-once semantics accept.
                    warn!(error = %err, "ack failed after successful delivery");
                }
                info!(state = "acknowledged", target_email = %email.to, "invitation delivered");
                TaskOutcome::Acknowledged
            }
            Err(err) if envelope.exhausted(self.max_attempts) => {
                error!(
                    state = "abandoned",
                    error = %err,
                    attempts = envelope.attempts,
                    "delivery attempts exhausted, dead-lettering"
                );
                self.settle_dead(&delivery).await;
                TaskOutcome::DeadLettered
            }
            Err(err) => {
                warn!(
                    state = "abandoned",
                    error = %err,
                    attempt = envelope.attempts,
                    "delivery failed, republishing for retry"
                );
                // Republish strictly before acking the old delivery: a
                // crash in between duplicates the task instead of losing it.
                match self.republish(&envelope).await {
                    Ok(()) => {
                        if let Err(err) = self.queue.ack(&delivery).await {
                            warn!(error = %err, "ack failed after republish");
                        }
                    }
                    Err(err) => {
                        // Leave the delivery unacked; broker redelivery
                        // will produce another attempt with the same count.
                        warn!(error = %err, "republish failed, leaving delivery unacked");
                    }
                }
                TaskOutcome::Retried
            }
        }
    }

    async fn republish(&self, envelope: &TaskEnvelope) -> Result<(), String> {
        let payload =
            serde_json::to_vec(&envelope.next_attempt()).map_err(|err| err.to_string())?;
        self.queue
            .publish(&payload)
            .await
            .map_err(|err| err.to_string())
    }

    async fn settle_dead(&self, delivery: &Delivery) {
        if let Err(err) = self.queue.dead_letter(delivery).await {
            warn!(error = %err, "dead-letter settlement failed, delivery stays pending");
        }
    }
}

/// Spawns the email worker onto the runtime.
///
/// Started once at process boot; the returned handle is aborted during
/// graceful shutdown.
pub fn spawn_email_worker(worker: EmailWorker) -> JoinHandle<()> {
    tokio::spawn(async move {
        worker.run().await;
    })
}
