//! Note domain model
//!
//! The persisted note record is the source of truth that the cache layer
//! mirrors. Cached result sets are serialized `Vec<Note>` snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default background color for new notes.
pub const DEFAULT_NOTE_COLOR: &str = "#FFFFFF";

// == Checklist Item ==
/// A single checklist entry inside a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    /// Item text
    pub text: String,
    /// Whether the item has been ticked off
    #[serde(default)]
    pub is_done: bool,
}

// == Note ==
/// A persisted note.
///
/// Owner and collaborators are user ids resolved through the user
/// directory; labels are label ids owned by the note's owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    /// Unique note id
    pub id: Uuid,
    /// Owning user
    pub owner_id: Uuid,
    /// Note title
    pub title: String,
    /// Note body
    pub description: String,
    /// Display color (hex string)
    pub color: String,
    /// Archived flag
    pub is_archived: bool,
    /// Pinned flag
    pub is_pinned: bool,
    /// Soft-deleted flag; trashed notes are hidden from list views
    pub is_trashed: bool,
    /// Optional reminder timestamp
    pub reminder: Option<DateTime<Utc>>,
    /// Checklist entries
    pub checklist: Vec<ChecklistItem>,
    /// Client-controlled sort position
    pub position: i64,
    /// Attached label ids
    pub labels: Vec<Uuid>,
    /// Users this note is shared with
    pub collaborators: Vec<Uuid>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Creates a new note with default flags and timestamps set to now.
    pub fn new(owner_id: Uuid, title: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title: title.into(),
            description: description.into(),
            color: DEFAULT_NOTE_COLOR.to_string(),
            is_archived: false,
            is_pinned: false,
            is_trashed: false,
            reminder: None,
            checklist: Vec::new(),
            position: 0,
            labels: Vec::new(),
            collaborators: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if the label is attached to this note.
    pub fn has_label(&self, label_id: Uuid) -> bool {
        self.labels.contains(&label_id)
    }

    /// Returns true if the note is shared with the given user.
    pub fn has_collaborator(&self, user_id: Uuid) -> bool {
        self.collaborators.contains(&user_id)
    }

    /// Returns true if the user may read this note (owner or collaborator).
    pub fn readable_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id || self.has_collaborator(user_id)
    }

    /// Stamps the note as modified now.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// == Note Filters ==
/// Optional flag filters applied to the main list view.
///
/// The canonical serialization of this struct is part of the cache key, so
/// field order is fixed and absent fields render explicitly (see
/// `cache::key`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct NoteFilters {
    /// Restrict to archived (true) or unarchived (false) notes
    pub archived: Option<bool>,
    /// Restrict to pinned (true) or unpinned (false) notes
    pub pinned: Option<bool>,
}

impl NoteFilters {
    /// Returns true when no filter flag is set.
    pub fn is_empty(&self) -> bool {
        self.archived.is_none() && self.pinned.is_none()
    }
}
