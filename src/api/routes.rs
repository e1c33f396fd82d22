//! API Routes
//!
//! Configures the Axum router with all notes service endpoints.

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    add_collaborator_handler, archived_notes_handler, attach_label_handler, cache_stats_handler,
    create_label_handler, create_note_handler, create_user_handler, delete_label_handler,
    detach_label_handler, get_note_handler, get_user_handler, health_handler, list_labels_handler,
    list_notes_handler, notes_by_label_handler, permanent_delete_handler, pinned_notes_handler,
    remove_collaborator_handler, restore_note_handler, search_notes_handler, shared_notes_handler,
    trash_note_handler, trashed_notes_handler, update_label_handler, update_note_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Static segments before the :id capture so /notes/archived and
    // friends never parse as note ids.
    Router::new()
        .route("/health", get(health_handler))
        .route("/cache/stats", get(cache_stats_handler))
        .route("/notes", get(list_notes_handler).post(create_note_handler))
        .route("/notes/archived", get(archived_notes_handler))
        .route("/notes/pinned", get(pinned_notes_handler))
        .route("/notes/trash", get(trashed_notes_handler))
        .route("/notes/shared", get(shared_notes_handler))
        .route("/notes/search", get(search_notes_handler))
        .route("/notes/label/:label_id", get(notes_by_label_handler))
        .route(
            "/notes/:id",
            get(get_note_handler)
                .patch(update_note_handler)
                .delete(trash_note_handler),
        )
        .route("/notes/:id/restore", post(restore_note_handler))
        .route("/notes/:id/permanent", delete(permanent_delete_handler))
        .route("/notes/:id/labels", post(attach_label_handler))
        .route("/notes/:id/labels/:label_id", delete(detach_label_handler))
        .route("/notes/:id/collaborators", post(add_collaborator_handler))
        .route(
            "/notes/:id/collaborators/:collaborator_id",
            delete(remove_collaborator_handler),
        )
        .route("/labels", get(list_labels_handler).post(create_label_handler))
        .route(
            "/labels/:id",
            patch(update_label_handler).delete(delete_label_handler),
        )
        .route("/users", post(create_user_handler))
        .route("/users/:id", get(get_user_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
