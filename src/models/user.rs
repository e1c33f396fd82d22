//! User directory model
//!
//! Authentication lives outside this service; the directory only carries
//! the identity fields that sharing and invitation rendering need.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// == User ==
/// A directory entry for a registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user id
    pub id: Uuid,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Email address, unique per directory
    pub email: String,
}

impl User {
    /// Creates a new directory entry with a fresh id.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
        }
    }

    /// Full display name used in invitation emails.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
