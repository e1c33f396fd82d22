//! Domain models and API DTOs for the notes service
//!
//! Domain types (`Note`, `Label`, `User`, `NotificationTask`) are shared by
//! the store, the cache layer, and the queue; `requests`/`responses` hold
//! the HTTP-facing DTOs.

mod label;
mod note;
mod task;
mod user;

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use label::{Label, DEFAULT_LABEL_COLOR};
pub use note::{ChecklistItem, Note, NoteFilters, DEFAULT_NOTE_COLOR};
pub use task::{Inviter, NotificationTask};
pub use user::User;

pub use requests::{
    AddCollaboratorRequest, AttachLabelRequest, CreateLabelRequest, CreateNoteRequest,
    CreateUserRequest, UpdateLabelRequest, UpdateNoteRequest,
};
pub use responses::{
    HealthResponse, LabelListResponse, MessageResponse, NoteListResponse, UserResponse,
};
