//! API Handlers
//!
//! HTTP request handlers for the notes service endpoints. Handlers
//! validate DTOs, resolve the caller from the `X-User-Id` header (token
//! verification lives in the upstream auth layer), and delegate to the
//! service layer.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::cache::CacheStatsSnapshot;
use crate::error::{AppError, Result};
use crate::models::{
    AddCollaboratorRequest, AttachLabelRequest, CreateLabelRequest, CreateNoteRequest,
    CreateUserRequest, HealthResponse, Label, LabelListResponse, MessageResponse, Note,
    NoteFilters, NoteListResponse, UpdateLabelRequest, UpdateNoteRequest, User, UserResponse,
};
use crate::notes::{LabelService, NoteService};
use crate::store::{StoreError, UserDirectory};

/// Header carrying the authenticated caller's id.
pub const USER_ID_HEADER: &str = "x-user-id";

// == App State ==
/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Note reads/writes with cache integration
    pub notes: Arc<NoteService>,
    /// Label management
    pub labels: Arc<LabelService>,
    /// User directory
    pub users: Arc<dyn UserDirectory>,
}

impl AppState {
    /// Creates a new AppState from the wired services.
    pub fn new(
        notes: NoteService,
        labels: LabelService,
        users: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            notes: Arc::new(notes),
            labels: Arc::new(labels),
            users,
        }
    }
}

// == Caller Extractor ==
/// The authenticated caller, extracted from the `X-User-Id` header.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| AppError::InvalidRequest("Missing X-User-Id header".to_string()))?;
        let raw = header
            .to_str()
            .map_err(|_| AppError::InvalidRequest("Malformed X-User-Id header".to_string()))?;
        let user_id = Uuid::parse_str(raw)
            .map_err(|_| AppError::InvalidRequest("X-User-Id is not a valid UUID".to_string()))?;
        Ok(Caller(user_id))
    }
}

// == Health & Stats ==

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for GET /cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStatsSnapshot> {
    Json(state.notes.cache_stats())
}

// == Note Read Handlers ==

/// Handler for GET /notes
pub async fn list_notes_handler(
    State(state): State<AppState>,
    Caller(user_id): Caller,
    Query(filters): Query<NoteFilters>,
) -> Result<Json<NoteListResponse>> {
    let notes = state.notes.get_notes(user_id, filters).await?;
    Ok(Json(NoteListResponse::new(notes)))
}

/// Handler for GET /notes/archived
pub async fn archived_notes_handler(
    State(state): State<AppState>,
    Caller(user_id): Caller,
) -> Result<Json<NoteListResponse>> {
    let notes = state.notes.get_archived(user_id).await?;
    Ok(Json(NoteListResponse::new(notes)))
}

/// Handler for GET /notes/pinned
pub async fn pinned_notes_handler(
    State(state): State<AppState>,
    Caller(user_id): Caller,
) -> Result<Json<NoteListResponse>> {
    let notes = state.notes.get_pinned(user_id).await?;
    Ok(Json(NoteListResponse::new(notes)))
}

/// Handler for GET /notes/trash
pub async fn trashed_notes_handler(
    State(state): State<AppState>,
    Caller(user_id): Caller,
) -> Result<Json<NoteListResponse>> {
    let notes = state.notes.get_trashed(user_id).await?;
    Ok(Json(NoteListResponse::new(notes)))
}

/// Handler for GET /notes/shared
pub async fn shared_notes_handler(
    State(state): State<AppState>,
    Caller(user_id): Caller,
) -> Result<Json<NoteListResponse>> {
    let notes = state.notes.get_shared(user_id).await?;
    Ok(Json(NoteListResponse::new(notes)))
}

/// Handler for GET /notes/label/:label_id
pub async fn notes_by_label_handler(
    State(state): State<AppState>,
    Caller(user_id): Caller,
    Path(label_id): Path<Uuid>,
) -> Result<Json<NoteListResponse>> {
    let notes = state.notes.get_by_label(user_id, label_id).await?;
    Ok(Json(NoteListResponse::new(notes)))
}

/// Query parameters for the search endpoint.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Substring to match against title and description
    pub q: String,
}

/// Handler for GET /notes/search
pub async fn search_notes_handler(
    State(state): State<AppState>,
    Caller(user_id): Caller,
    Query(params): Query<SearchParams>,
) -> Result<Json<NoteListResponse>> {
    let notes = state.notes.search(user_id, &params.q).await?;
    Ok(Json(NoteListResponse::new(notes)))
}

/// Handler for GET /notes/:id
pub async fn get_note_handler(
    State(state): State<AppState>,
    Caller(user_id): Caller,
    Path(note_id): Path<Uuid>,
) -> Result<Json<Note>> {
    let note = state.notes.get_note(note_id, user_id).await?;
    Ok(Json(note))
}

// == Note Write Handlers ==

/// Handler for POST /notes
pub async fn create_note_handler(
    State(state): State<AppState>,
    Caller(user_id): Caller,
    Json(req): Json<CreateNoteRequest>,
) -> Result<(StatusCode, Json<Note>)> {
    if let Some(error_msg) = req.validate() {
        return Err(AppError::InvalidRequest(error_msg));
    }

    let note = state.notes.create_note(user_id, req).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// Handler for PATCH /notes/:id
pub async fn update_note_handler(
    State(state): State<AppState>,
    Caller(user_id): Caller,
    Path(note_id): Path<Uuid>,
    Json(req): Json<UpdateNoteRequest>,
) -> Result<Json<Note>> {
    if let Some(error_msg) = req.validate() {
        return Err(AppError::InvalidRequest(error_msg));
    }

    let note = state.notes.update_note(note_id, user_id, req).await?;
    Ok(Json(note))
}

/// Handler for DELETE /notes/:id (soft delete)
pub async fn trash_note_handler(
    State(state): State<AppState>,
    Caller(user_id): Caller,
    Path(note_id): Path<Uuid>,
) -> Result<Json<MessageResponse>> {
    state.notes.trash_note(note_id, user_id).await?;
    Ok(Json(MessageResponse::new("Note moved to trash")))
}

/// Handler for POST /notes/:id/restore
pub async fn restore_note_handler(
    State(state): State<AppState>,
    Caller(user_id): Caller,
    Path(note_id): Path<Uuid>,
) -> Result<Json<Note>> {
    let note = state.notes.restore_note(note_id, user_id).await?;
    Ok(Json(note))
}

/// Handler for DELETE /notes/:id/permanent
pub async fn permanent_delete_handler(
    State(state): State<AppState>,
    Caller(user_id): Caller,
    Path(note_id): Path<Uuid>,
) -> Result<Json<MessageResponse>> {
    state.notes.delete_note_permanently(note_id, user_id).await?;
    Ok(Json(MessageResponse::new("Note permanently deleted")))
}

/// Handler for POST /notes/:id/labels
pub async fn attach_label_handler(
    State(state): State<AppState>,
    Caller(user_id): Caller,
    Path(note_id): Path<Uuid>,
    Json(req): Json<AttachLabelRequest>,
) -> Result<Json<Note>> {
    let note = state
        .notes
        .attach_label(note_id, user_id, req.label_id)
        .await?;
    Ok(Json(note))
}

/// Handler for DELETE /notes/:id/labels/:label_id
pub async fn detach_label_handler(
    State(state): State<AppState>,
    Caller(user_id): Caller,
    Path((note_id, label_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Note>> {
    let note = state.notes.detach_label(note_id, user_id, label_id).await?;
    Ok(Json(note))
}

/// Handler for POST /notes/:id/collaborators
///
/// Persists the collaborator, invalidates both affected namespaces, and
/// publishes the invitation task; a publish failure fails the request.
pub async fn add_collaborator_handler(
    State(state): State<AppState>,
    Caller(user_id): Caller,
    Path(note_id): Path<Uuid>,
    Json(req): Json<AddCollaboratorRequest>,
) -> Result<Json<Note>> {
    if let Some(error_msg) = req.validate() {
        return Err(AppError::InvalidRequest(error_msg));
    }

    let note = state.notes.add_collaborator(note_id, user_id, req).await?;
    Ok(Json(note))
}

/// Handler for DELETE /notes/:id/collaborators/:collaborator_id
pub async fn remove_collaborator_handler(
    State(state): State<AppState>,
    Caller(user_id): Caller,
    Path((note_id, collaborator_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Note>> {
    let note = state
        .notes
        .remove_collaborator(note_id, user_id, collaborator_id)
        .await?;
    Ok(Json(note))
}

// == Label Handlers ==

/// Handler for GET /labels
pub async fn list_labels_handler(
    State(state): State<AppState>,
    Caller(user_id): Caller,
) -> Result<Json<LabelListResponse>> {
    let labels = state.labels.list_labels(user_id).await?;
    Ok(Json(LabelListResponse::new(labels)))
}

/// Handler for POST /labels
pub async fn create_label_handler(
    State(state): State<AppState>,
    Caller(user_id): Caller,
    Json(req): Json<CreateLabelRequest>,
) -> Result<(StatusCode, Json<Label>)> {
    if let Some(error_msg) = req.validate() {
        return Err(AppError::InvalidRequest(error_msg));
    }

    let label = state.labels.create_label(user_id, req).await?;
    Ok((StatusCode::CREATED, Json(label)))
}

/// Handler for PATCH /labels/:id
pub async fn update_label_handler(
    State(state): State<AppState>,
    Caller(user_id): Caller,
    Path(label_id): Path<Uuid>,
    Json(req): Json<UpdateLabelRequest>,
) -> Result<Json<Label>> {
    if let Some(error_msg) = req.validate() {
        return Err(AppError::InvalidRequest(error_msg));
    }

    let label = state.labels.update_label(label_id, user_id, req).await?;
    Ok(Json(label))
}

/// Handler for DELETE /labels/:id
pub async fn delete_label_handler(
    State(state): State<AppState>,
    Caller(user_id): Caller,
    Path(label_id): Path<Uuid>,
) -> Result<Json<MessageResponse>> {
    state.labels.delete_label(label_id, user_id).await?;
    Ok(Json(MessageResponse::new("Label deleted successfully")))
}

// == User Handlers ==

/// Handler for POST /users
pub async fn create_user_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    if let Some(error_msg) = req.validate() {
        return Err(AppError::InvalidRequest(error_msg));
    }

    let user = User::new(
        req.first_name.trim(),
        req.last_name.trim(),
        req.email.trim(),
    );
    match state.users.insert(user.clone()).await {
        Ok(()) => Ok((StatusCode::CREATED, Json(UserResponse::new(user)))),
        Err(StoreError::Conflict(msg)) => Err(AppError::InvalidRequest(msg)),
        Err(err) => Err(AppError::Internal(err.to_string())),
    }
}

/// Handler for GET /users/:id
pub async fn get_user_handler(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>> {
    let user = state
        .users
        .get(user_id)
        .await
        .map_err(|err| AppError::Internal(err.to_string()))?
        .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))?;
    Ok(Json(UserResponse::new(user)))
}
