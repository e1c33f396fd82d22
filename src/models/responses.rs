//! Response DTOs for the notes service API
//!
//! Defines the structure of outgoing HTTP response bodies. Domain models
//! serialize directly; the wrappers here add counts and messages.

use serde::Serialize;

use crate::models::{Label, Note, User};

// == Note List Response ==
/// Response body for every list-style notes endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct NoteListResponse {
    /// Number of notes returned
    pub count: usize,
    /// The notes, pinned first then most recently updated
    pub notes: Vec<Note>,
}

impl NoteListResponse {
    /// Wraps a result set.
    pub fn new(notes: Vec<Note>) -> Self {
        Self {
            count: notes.len(),
            notes,
        }
    }
}

// == Label List Response ==
/// Response body for GET /labels.
#[derive(Debug, Clone, Serialize)]
pub struct LabelListResponse {
    /// Number of labels returned
    pub count: usize,
    /// The user's labels
    pub labels: Vec<Label>,
}

impl LabelListResponse {
    /// Wraps a result set.
    pub fn new(labels: Vec<Label>) -> Self {
        Self {
            count: labels.len(),
            labels,
        }
    }
}

// == Message Response ==
/// Generic acknowledgement body for write operations without a payload.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    /// Human-readable outcome
    pub message: String,
}

impl MessageResponse {
    /// Creates a new MessageResponse.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// == User Response ==
/// Response body for user directory endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    /// The directory entry
    pub user: User,
}

impl UserResponse {
    /// Wraps a directory entry.
    pub fn new(user: User) -> Self {
        Self { user }
    }
}

// == Health Response ==
/// Response body for the health check endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status string
    pub status: String,
    /// Crate version
    pub version: String,
}

impl HealthResponse {
    /// Creates a healthy response.
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
