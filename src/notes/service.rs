//! Note service
//!
//! The read/write core. Every list-style read is cache-aside: key the
//! (user, view, filters) tuple, try the cache, fall back to the store on
//! miss and write the result through. Every write persists first and only
//! then invalidates the namespace of each user whose views could have
//! changed; a failed invalidation never rolls a write back, it just
//! leaves staleness bounded by the entry TTL.

use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::cache::{CacheKey, CacheManager, Lookup, NoteView};
use crate::error::{AppError, Result};
use crate::models::{
    AddCollaboratorRequest, CreateNoteRequest, Note, NoteFilters, NotificationTask,
    UpdateNoteRequest,
};
use crate::queue::NotificationPublisher;
use crate::store::{LabelStore, NoteQuery, NoteStore, StoreError, UserDirectory};

// == Note Service ==
/// Reads and writes notes through the cache and the store.
#[derive(Clone)]
pub struct NoteService {
    notes: Arc<dyn NoteStore>,
    labels: Arc<dyn LabelStore>,
    users: Arc<dyn UserDirectory>,
    cache: CacheManager,
    publisher: NotificationPublisher,
    page_size: usize,
}

fn store_err(err: StoreError) -> AppError {
    AppError::Internal(err.to_string())
}

impl NoteService {
    /// Wires the service to its collaborators.
    pub fn new(
        notes: Arc<dyn NoteStore>,
        labels: Arc<dyn LabelStore>,
        users: Arc<dyn UserDirectory>,
        cache: CacheManager,
        publisher: NotificationPublisher,
        page_size: usize,
    ) -> Self {
        Self {
            notes,
            labels,
            users,
            cache,
            publisher,
            page_size,
        }
    }

    // == Read Paths ==

    /// Main list view with optional flag filters.
    #[instrument(skip(self))]
    pub async fn get_notes(&self, user_id: Uuid, filters: NoteFilters) -> Result<Vec<Note>> {
        let key = CacheKey::new(user_id, NoteView::List(filters));
        if let Lookup::Hit(notes) = self.cache.read(&key).await {
            return Ok(notes);
        }

        let mut query = NoteQuery::live(self.page_size);
        query.archived = filters.archived;
        query.pinned = filters.pinned;
        let notes = self
            .notes
            .find_owned(user_id, &query)
            .await
            .map_err(store_err)?;

        self.cache.write(&key, &notes).await;
        Ok(notes)
    }

    /// Archived notes.
    #[instrument(skip(self))]
    pub async fn get_archived(&self, user_id: Uuid) -> Result<Vec<Note>> {
        let key = CacheKey::new(user_id, NoteView::Archived);
        if let Lookup::Hit(notes) = self.cache.read(&key).await {
            return Ok(notes);
        }

        let mut query = NoteQuery::live(self.page_size);
        query.archived = Some(true);
        let notes = self
            .notes
            .find_owned(user_id, &query)
            .await
            .map_err(store_err)?;

        self.cache.write(&key, &notes).await;
        Ok(notes)
    }

    /// Pinned notes.
    #[instrument(skip(self))]
    pub async fn get_pinned(&self, user_id: Uuid) -> Result<Vec<Note>> {
        let key = CacheKey::new(user_id, NoteView::Pinned);
        if let Lookup::Hit(notes) = self.cache.read(&key).await {
            return Ok(notes);
        }

        let mut query = NoteQuery::live(self.page_size);
        query.pinned = Some(true);
        let notes = self
            .notes
            .find_owned(user_id, &query)
            .await
            .map_err(store_err)?;

        self.cache.write(&key, &notes).await;
        Ok(notes)
    }

    /// Trashed notes.
    #[instrument(skip(self))]
    pub async fn get_trashed(&self, user_id: Uuid) -> Result<Vec<Note>> {
        let key = CacheKey::new(user_id, NoteView::Trashed);
        if let Lookup::Hit(notes) = self.cache.read(&key).await {
            return Ok(notes);
        }

        let notes = self
            .notes
            .find_owned(user_id, &NoteQuery::trashed(self.page_size))
            .await
            .map_err(store_err)?;

        self.cache.write(&key, &notes).await;
        Ok(notes)
    }

    /// Notes other owners have shared with this user.
    #[instrument(skip(self))]
    pub async fn get_shared(&self, user_id: Uuid) -> Result<Vec<Note>> {
        let key = CacheKey::new(user_id, NoteView::Shared);
        if let Lookup::Hit(notes) = self.cache.read(&key).await {
            return Ok(notes);
        }

        let notes = self
            .notes
            .find_shared(user_id, self.page_size)
            .await
            .map_err(store_err)?;

        self.cache.write(&key, &notes).await;
        Ok(notes)
    }

    /// Notes carrying one of the user's labels.
    #[instrument(skip(self))]
    pub async fn get_by_label(&self, user_id: Uuid, label_id: Uuid) -> Result<Vec<Note>> {
        // Resolve the label first so an unknown id is a domain error, not
        // an empty cached result set.
        let label = self.labels.get(label_id).await.map_err(store_err)?;
        match label {
            Some(label) if label.owner_id == user_id => {}
            _ => return Err(AppError::LabelNotFound(label_id)),
        }

        let key = CacheKey::new(user_id, NoteView::ByLabel(label_id));
        if let Lookup::Hit(notes) = self.cache.read(&key).await {
            return Ok(notes);
        }

        let mut query = NoteQuery::live(self.page_size);
        query.label_id = Some(label_id);
        let notes = self
            .notes
            .find_owned(user_id, &query)
            .await
            .map_err(store_err)?;

        self.cache.write(&key, &notes).await;
        Ok(notes)
    }

    /// Single note, readable by its owner or any collaborator. Uncached.
    pub async fn get_note(&self, note_id: Uuid, user_id: Uuid) -> Result<Note> {
        let note = self.notes.get(note_id).await.map_err(store_err)?;
        match note {
            Some(note) if note.readable_by(user_id) => Ok(note),
            _ => Err(AppError::NoteNotFound(note_id)),
        }
    }

    /// Case-insensitive substring search over title and description.
    /// Uncached: free-text queries would explode the key space.
    #[instrument(skip(self))]
    pub async fn search(&self, user_id: Uuid, text: &str) -> Result<Vec<Note>> {
        if text.trim().is_empty() {
            return Err(AppError::InvalidRequest(
                "Search query is required".to_string(),
            ));
        }

        let mut query = NoteQuery::live(self.page_size);
        query.text = Some(text.to_string());
        self.notes
            .find_owned(user_id, &query)
            .await
            .map_err(store_err)
    }

    // == Write Paths ==

    /// Creates a note for the user.
    #[instrument(skip(self, req))]
    pub async fn create_note(&self, user_id: Uuid, req: CreateNoteRequest) -> Result<Note> {
        let mut note = Note::new(user_id, req.title, req.description);
        if let Some(color) = req.color {
            note.color = color;
        }
        note.is_pinned = req.is_pinned;
        note.reminder = req.reminder;
        note.checklist = req.checklist;

        self.notes.insert(note.clone()).await.map_err(store_err)?;
        self.cache.invalidate_user(user_id).await;
        Ok(note)
    }

    /// Applies a partial update to an owned note.
    #[instrument(skip(self, req))]
    pub async fn update_note(
        &self,
        note_id: Uuid,
        user_id: Uuid,
        req: UpdateNoteRequest,
    ) -> Result<Note> {
        let mut note = self.load_owned(note_id, user_id).await?;
        let audience = note_audience(&note);

        if let Some(title) = req.title {
            note.title = title;
        }
        if let Some(description) = req.description {
            note.description = description;
        }
        if let Some(color) = req.color {
            note.color = color;
        }
        if let Some(is_archived) = req.is_archived {
            note.is_archived = is_archived;
        }
        if let Some(is_pinned) = req.is_pinned {
            note.is_pinned = is_pinned;
        }
        if let Some(reminder) = req.reminder {
            note.reminder = Some(reminder);
        }
        if let Some(checklist) = req.checklist {
            note.checklist = checklist;
        }
        if let Some(position) = req.position {
            note.position = position;
        }
        note.touch();

        self.persist(&note).await?;
        self.invalidate_all(&audience).await;
        Ok(note)
    }

    /// Soft-deletes an owned note.
    #[instrument(skip(self))]
    pub async fn trash_note(&self, note_id: Uuid, user_id: Uuid) -> Result<Note> {
        let mut note = self.load_owned(note_id, user_id).await?;
        let audience = note_audience(&note);

        note.is_trashed = true;
        note.touch();

        self.persist(&note).await?;
        self.invalidate_all(&audience).await;
        Ok(note)
    }

    /// Restores a trashed note.
    #[instrument(skip(self))]
    pub async fn restore_note(&self, note_id: Uuid, user_id: Uuid) -> Result<Note> {
        let mut note = self.load_owned(note_id, user_id).await?;
        let audience = note_audience(&note);

        note.is_trashed = false;
        note.touch();

        self.persist(&note).await?;
        self.invalidate_all(&audience).await;
        Ok(note)
    }

    /// Permanently removes an owned note.
    #[instrument(skip(self))]
    pub async fn delete_note_permanently(&self, note_id: Uuid, user_id: Uuid) -> Result<()> {
        let note = self.load_owned(note_id, user_id).await?;
        let audience = note_audience(&note);

        let removed = self.notes.remove(note_id).await.map_err(store_err)?;
        if !removed {
            return Err(AppError::NoteNotFound(note_id));
        }
        self.invalidate_all(&audience).await;
        Ok(())
    }

    /// Attaches one of the user's labels to an owned note.
    #[instrument(skip(self))]
    pub async fn attach_label(&self, note_id: Uuid, user_id: Uuid, label_id: Uuid) -> Result<Note> {
        let label = self.labels.get(label_id).await.map_err(store_err)?;
        match label {
            Some(label) if label.owner_id == user_id => {}
            _ => return Err(AppError::LabelNotFound(label_id)),
        }

        let mut note = self.load_owned(note_id, user_id).await?;
        let audience = note_audience(&note);

        if !note.has_label(label_id) {
            note.labels.push(label_id);
            note.touch();
            self.persist(&note).await?;
            self.invalidate_all(&audience).await;
        }
        Ok(note)
    }

    /// Detaches a label from an owned note.
    #[instrument(skip(self))]
    pub async fn detach_label(&self, note_id: Uuid, user_id: Uuid, label_id: Uuid) -> Result<Note> {
        let mut note = self.load_owned(note_id, user_id).await?;
        let audience = note_audience(&note);

        if note.has_label(label_id) {
            note.labels.retain(|id| *id != label_id);
            note.touch();
            self.persist(&note).await?;
            self.invalidate_all(&audience).await;
        }
        Ok(note)
    }

    /// Shares an owned note with the user registered under `email` and
    /// publishes the invitation task.
    ///
    /// Persist, invalidate, then publish: a publish failure surfaces and
    /// fails the whole operation, but leaves the collaborator persisted.
    /// The operation is idempotent, so a retry re-publishes without
    /// re-sharing.
    #[instrument(skip(self, req))]
    pub async fn add_collaborator(
        &self,
        note_id: Uuid,
        user_id: Uuid,
        req: AddCollaboratorRequest,
    ) -> Result<Note> {
        let mut note = self.load_owned(note_id, user_id).await?;

        let inviter = self
            .users
            .get(user_id)
            .await
            .map_err(store_err)?
            .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))?;

        let email = req.email.trim();
        let target = self
            .users
            .find_by_email(email)
            .await
            .map_err(store_err)?
            .ok_or_else(|| AppError::UserNotFound(email.to_string()))?;

        if target.id == note.owner_id {
            return Err(AppError::InvalidRequest(
                "Cannot share a note with its owner".to_string(),
            ));
        }

        if !note.has_collaborator(target.id) {
            note.collaborators.push(target.id);
            note.touch();
            self.persist(&note).await?;
        }

        // The new collaborator is already in the note's audience here.
        self.invalidate_all(&note_audience(&note)).await;

        let task = NotificationTask::invitation(&target.email, &inviter, &note.title, note.id);
        self.publisher.publish(task).await?;

        Ok(note)
    }

    /// Unshares an owned note.
    #[instrument(skip(self))]
    pub async fn remove_collaborator(
        &self,
        note_id: Uuid,
        user_id: Uuid,
        collaborator_id: Uuid,
    ) -> Result<Note> {
        let mut note = self.load_owned(note_id, user_id).await?;
        // Audience captured before the removal so the departing
        // collaborator's shared view is invalidated too.
        let audience = note_audience(&note);

        if note.has_collaborator(collaborator_id) {
            note.collaborators.retain(|id| *id != collaborator_id);
            note.touch();
            self.persist(&note).await?;
            self.invalidate_all(&audience).await;
        }
        Ok(note)
    }

    /// Cache counters for the stats endpoint.
    pub fn cache_stats(&self) -> crate::cache::CacheStatsSnapshot {
        self.cache.stats()
    }

    // == Internals ==

    /// Loads a note the user owns, or NoteNotFound.
    async fn load_owned(&self, note_id: Uuid, user_id: Uuid) -> Result<Note> {
        let note = self.notes.get(note_id).await.map_err(store_err)?;
        match note {
            Some(note) if note.owner_id == user_id => Ok(note),
            _ => Err(AppError::NoteNotFound(note_id)),
        }
    }

    async fn persist(&self, note: &Note) -> Result<()> {
        let updated = self.notes.update(note.clone()).await.map_err(store_err)?;
        if !updated {
            return Err(AppError::NoteNotFound(note.id));
        }
        Ok(())
    }

    async fn invalidate_all(&self, user_ids: &[Uuid]) {
        for user_id in user_ids {
            self.cache.invalidate_user(*user_id).await;
        }
    }
}

/// Every user whose cached views can reflect this note: the owner plus
/// all current collaborators.
fn note_audience(note: &Note) -> Vec<Uuid> {
    let mut audience = Vec::with_capacity(1 + note.collaborators.len());
    audience.push(note.owner_id);
    audience.extend(note.collaborators.iter().copied());
    audience
}
