//! API Module
//!
//! HTTP handlers and routing for the notes service REST API. The caller's
//! identity arrives in the `X-User-Id` header, supplied by the upstream
//! auth layer.

pub mod handlers;
pub mod routes;

pub use handlers::{AppState, Caller, USER_ID_HEADER};
pub use routes::create_router;

/// Builds an [`AppState`] wired entirely to in-memory backends.
#[cfg(test)]
pub fn test_state() -> AppState {
    use std::sync::Arc;

    use crate::cache::{CacheManager, MemoryCacheBackend};
    use crate::notes::{LabelService, NoteService};
    use crate::queue::{MemoryQueue, NotificationPublisher};
    use crate::store::{MemoryLabelStore, MemoryNoteStore, MemoryUserDirectory};

    let notes = Arc::new(MemoryNoteStore::new());
    let labels = Arc::new(MemoryLabelStore::new());
    let users = Arc::new(MemoryUserDirectory::new());
    let cache = CacheManager::new(Arc::new(MemoryCacheBackend::new()), 300);
    let queue = Arc::new(MemoryQueue::new());
    let publisher = NotificationPublisher::new(queue);

    let note_service = NoteService::new(
        notes.clone(),
        labels.clone(),
        users.clone(),
        cache.clone(),
        publisher,
        100,
    );
    let label_service = LabelService::new(labels, notes, cache);

    AppState::new(note_service, label_service, users)
}
