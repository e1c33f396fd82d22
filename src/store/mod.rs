//! Storage traits for notes, labels, and the user directory
//!
//! The store is the source of truth the cache mirrors. Schema design is
//! out of scope here; what matters to the cache layer is the seam: reads
//! go through these traits on a cache miss, writes go through them before
//! any invalidation runs. The bundled implementation is in-memory; a SQL
//! or document store slots in behind the same traits.

mod memory;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Label, Note, User};

pub use memory::{MemoryLabelStore, MemoryNoteStore, MemoryUserDirectory};

// == Store Error ==
/// Error raised by a storage backend.
///
/// Unlike cache errors, store errors are real failures: the service maps
/// them to internal errors at the boundary.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The storage backend failed
    #[error("storage backend error: {0}")]
    Backend(String),
    /// Uniqueness violation (e.g. duplicate email)
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Convenience Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

// == Note Query ==
/// Predicate set for owned-note queries.
///
/// Every list read uses this shape so the page-size cap applies uniformly
/// and cached payloads stay bounded.
#[derive(Debug, Clone, Default)]
pub struct NoteQuery {
    /// Match trashed (true) or live (false) notes
    pub trashed: bool,
    /// Restrict on the archived flag
    pub archived: Option<bool>,
    /// Restrict on the pinned flag
    pub pinned: Option<bool>,
    /// Restrict to notes carrying this label
    pub label_id: Option<Uuid>,
    /// Case-insensitive substring over title and description
    pub text: Option<String>,
    /// Maximum number of notes to return
    pub limit: usize,
}

impl NoteQuery {
    /// Query for live notes with a page cap.
    pub fn live(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Query for trashed notes with a page cap.
    pub fn trashed(limit: usize) -> Self {
        Self {
            trashed: true,
            limit,
            ..Self::default()
        }
    }
}

// == Note Store ==
/// Persistence operations for notes.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Persists a new note.
    async fn insert(&self, note: Note) -> StoreResult<()>;

    /// Fetches a note by id regardless of owner.
    async fn get(&self, note_id: Uuid) -> StoreResult<Option<Note>>;

    /// Replaces a persisted note. Returns false if the note is gone.
    async fn update(&self, note: Note) -> StoreResult<bool>;

    /// Permanently removes a note. Returns false if the note is gone.
    async fn remove(&self, note_id: Uuid) -> StoreResult<bool>;

    /// Notes owned by `owner_id` matching the query, pinned first then
    /// most recently updated, capped at `query.limit`.
    async fn find_owned(&self, owner_id: Uuid, query: &NoteQuery) -> StoreResult<Vec<Note>>;

    /// Live notes shared with `user_id` by other owners, most recently
    /// updated first, capped at `limit`.
    async fn find_shared(&self, user_id: Uuid, limit: usize) -> StoreResult<Vec<Note>>;

    /// Detaches a label from every note of one owner, returning the number
    /// of notes touched.
    async fn detach_label(&self, owner_id: Uuid, label_id: Uuid) -> StoreResult<u64>;
}

// == Label Store ==
/// Persistence operations for labels.
#[async_trait]
pub trait LabelStore: Send + Sync {
    /// Persists a new label.
    async fn insert(&self, label: Label) -> StoreResult<()>;

    /// Fetches a label by id.
    async fn get(&self, label_id: Uuid) -> StoreResult<Option<Label>>;

    /// Labels owned by the user, sorted by name.
    async fn list_for_user(&self, owner_id: Uuid) -> StoreResult<Vec<Label>>;

    /// Replaces a persisted label. Returns false if the label is gone.
    async fn update(&self, label: Label) -> StoreResult<bool>;

    /// Removes a label. Returns false if the label is gone.
    async fn remove(&self, label_id: Uuid) -> StoreResult<bool>;
}

// == User Directory ==
/// Lookup surface for registered users.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Registers a user. Fails with `Conflict` on a duplicate email.
    async fn insert(&self, user: User) -> StoreResult<()>;

    /// Fetches a user by id.
    async fn get(&self, user_id: Uuid) -> StoreResult<Option<User>>;

    /// Resolves a user by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;
}
