//! Notification task model
//!
//! The unit of work handed to the durable email queue. The broker owns a
//! task from publish until the worker acknowledges it; redelivery before
//! ack means a task may be rendered and sent more than once.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::User;

// == Inviter ==
/// Snapshot of the inviting user embedded in the task.
///
/// A snapshot, not a reference: the worker must be able to render the
/// email without consulting the directory, even if the inviter's profile
/// changes between publish and delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inviter {
    /// Inviting user's id
    pub id: Uuid,
    /// First name at publish time
    pub first_name: String,
    /// Last name at publish time
    pub last_name: String,
    /// Email at publish time
    pub email: String,
}

impl From<&User> for Inviter {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
        }
    }
}

// == Notification Task ==
/// A collaboration-invitation email waiting to be delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationTask {
    /// Recipient email address
    pub target_email: String,
    /// Who shared the note
    pub inviter: Inviter,
    /// Title of the shared note at publish time
    pub note_title: String,
    /// Id of the shared note
    pub note_id: Uuid,
}

impl NotificationTask {
    /// Builds an invitation task from the inviter's directory entry.
    pub fn invitation(
        target_email: impl Into<String>,
        inviter: &User,
        note_title: impl Into<String>,
        note_id: Uuid,
    ) -> Self {
        Self {
            target_email: target_email.into(),
            inviter: Inviter::from(inviter),
            note_title: note_title.into(),
            note_id,
        }
    }
}
