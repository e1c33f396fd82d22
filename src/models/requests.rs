//! Request DTOs for the notes service API
//!
//! Defines the structure of incoming HTTP request bodies. Each request type
//! exposes a `validate` method returning an error message on bad input.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::models::ChecklistItem;

/// Maximum accepted title length in characters.
pub const MAX_TITLE_LENGTH: usize = 256;

/// Maximum accepted description length in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 16 * 1024;

// == Create Note ==
/// Request body for POST /notes.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNoteRequest {
    /// Note title (required, non-empty)
    pub title: String,
    /// Note body (required)
    pub description: String,
    /// Optional display color
    #[serde(default)]
    pub color: Option<String>,
    /// Create the note pinned
    #[serde(default)]
    pub is_pinned: bool,
    /// Optional reminder timestamp
    #[serde(default)]
    pub reminder: Option<DateTime<Utc>>,
    /// Optional checklist entries
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
}

impl CreateNoteRequest {
    /// Validates the request data.
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.title.trim().is_empty() {
            return Some("Note title is required".to_string());
        }
        if self.title.len() > MAX_TITLE_LENGTH {
            return Some(format!(
                "Title exceeds maximum length of {} characters",
                MAX_TITLE_LENGTH
            ));
        }
        if self.description.len() > MAX_DESCRIPTION_LENGTH {
            return Some(format!(
                "Description exceeds maximum length of {} characters",
                MAX_DESCRIPTION_LENGTH
            ));
        }
        None
    }
}

// == Update Note ==
/// Request body for PATCH /notes/:id.
///
/// Only provided fields are applied; absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateNoteRequest {
    /// New title
    #[serde(default)]
    pub title: Option<String>,
    /// New body
    #[serde(default)]
    pub description: Option<String>,
    /// New display color
    #[serde(default)]
    pub color: Option<String>,
    /// New archived flag
    #[serde(default)]
    pub is_archived: Option<bool>,
    /// New pinned flag
    #[serde(default)]
    pub is_pinned: Option<bool>,
    /// New reminder timestamp
    #[serde(default)]
    pub reminder: Option<DateTime<Utc>>,
    /// Replacement checklist
    #[serde(default)]
    pub checklist: Option<Vec<ChecklistItem>>,
    /// New sort position
    #[serde(default)]
    pub position: Option<i64>,
}

impl UpdateNoteRequest {
    /// Validates the request data.
    pub fn validate(&self) -> Option<String> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Some("Note title cannot be empty".to_string());
            }
            if title.len() > MAX_TITLE_LENGTH {
                return Some(format!(
                    "Title exceeds maximum length of {} characters",
                    MAX_TITLE_LENGTH
                ));
            }
        }
        if let Some(description) = &self.description {
            if description.len() > MAX_DESCRIPTION_LENGTH {
                return Some(format!(
                    "Description exceeds maximum length of {} characters",
                    MAX_DESCRIPTION_LENGTH
                ));
            }
        }
        None
    }

    /// Returns true if no field is set.
    pub fn is_noop(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.color.is_none()
            && self.is_archived.is_none()
            && self.is_pinned.is_none()
            && self.reminder.is_none()
            && self.checklist.is_none()
            && self.position.is_none()
    }
}

// == Attach Label ==
/// Request body for POST /notes/:id/labels.
#[derive(Debug, Clone, Deserialize)]
pub struct AttachLabelRequest {
    /// Label to attach
    pub label_id: Uuid,
}

// == Add Collaborator ==
/// Request body for POST /notes/:id/collaborators.
#[derive(Debug, Clone, Deserialize)]
pub struct AddCollaboratorRequest {
    /// Email of the user to share with
    pub email: String,
}

impl AddCollaboratorRequest {
    /// Validates the request data.
    pub fn validate(&self) -> Option<String> {
        let email = self.email.trim();
        if email.is_empty() {
            return Some("Collaborator email is required".to_string());
        }
        // Shallow shape check; real validation happens at the directory lookup.
        if !email.contains('@') {
            return Some("Collaborator email is not a valid address".to_string());
        }
        None
    }
}

// == Create Label ==
/// Request body for POST /labels.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLabelRequest {
    /// Label name (required, non-empty)
    pub name: String,
    /// Optional display color
    #[serde(default)]
    pub color: Option<String>,
}

impl CreateLabelRequest {
    /// Validates the request data.
    pub fn validate(&self) -> Option<String> {
        if self.name.trim().is_empty() {
            return Some("Label name is required".to_string());
        }
        if self.name.len() > MAX_TITLE_LENGTH {
            return Some(format!(
                "Label name exceeds maximum length of {} characters",
                MAX_TITLE_LENGTH
            ));
        }
        None
    }
}

// == Update Label ==
/// Request body for PATCH /labels/:id.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLabelRequest {
    /// New label name
    #[serde(default)]
    pub name: Option<String>,
    /// New display color
    #[serde(default)]
    pub color: Option<String>,
}

impl UpdateLabelRequest {
    /// Validates the request data.
    pub fn validate(&self) -> Option<String> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Some("Label name cannot be empty".to_string());
            }
        }
        None
    }
}

// == Create User ==
/// Request body for POST /users.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Email address, unique per directory
    pub email: String,
}

impl CreateUserRequest {
    /// Validates the request data.
    pub fn validate(&self) -> Option<String> {
        if self.first_name.trim().is_empty() {
            return Some("First name is required".to_string());
        }
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Some("A valid email address is required".to_string());
        }
        None
    }
}
