//! In-memory storage backends
//!
//! HashMap-based implementations of the store traits behind tokio
//! read/write locks. Queries sort the way the list views are served:
//! pinned first, then most recently updated.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{Label, Note, User};
use crate::store::{LabelStore, NoteQuery, NoteStore, StoreError, StoreResult, UserDirectory};

// == Memory Note Store ==
/// In-memory note storage.
#[derive(Debug, Default)]
pub struct MemoryNoteStore {
    notes: RwLock<HashMap<Uuid, Note>>,
}

impl MemoryNoteStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored notes.
    pub async fn len(&self) -> usize {
        self.notes.read().await.len()
    }

    /// Returns true if no notes are stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn matches_query(note: &Note, owner_id: Uuid, query: &NoteQuery) -> bool {
    if note.owner_id != owner_id || note.is_trashed != query.trashed {
        return false;
    }
    if let Some(archived) = query.archived {
        if note.is_archived != archived {
            return false;
        }
    }
    if let Some(pinned) = query.pinned {
        if note.is_pinned != pinned {
            return false;
        }
    }
    if let Some(label_id) = query.label_id {
        if !note.has_label(label_id) {
            return false;
        }
    }
    if let Some(text) = &query.text {
        let needle = text.to_lowercase();
        let in_title = note.title.to_lowercase().contains(&needle);
        let in_body = note.description.to_lowercase().contains(&needle);
        if !in_title && !in_body {
            return false;
        }
    }
    true
}

/// Pinned first, then most recently updated.
fn sort_notes(notes: &mut [Note]) {
    notes.sort_by(|a, b| {
        b.is_pinned
            .cmp(&a.is_pinned)
            .then(b.updated_at.cmp(&a.updated_at))
    });
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn insert(&self, note: Note) -> StoreResult<()> {
        let mut notes = self.notes.write().await;
        notes.insert(note.id, note);
        Ok(())
    }

    async fn get(&self, note_id: Uuid) -> StoreResult<Option<Note>> {
        let notes = self.notes.read().await;
        Ok(notes.get(&note_id).cloned())
    }

    async fn update(&self, note: Note) -> StoreResult<bool> {
        let mut notes = self.notes.write().await;
        match notes.get_mut(&note.id) {
            Some(slot) => {
                *slot = note;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, note_id: Uuid) -> StoreResult<bool> {
        let mut notes = self.notes.write().await;
        Ok(notes.remove(&note_id).is_some())
    }

    async fn find_owned(&self, owner_id: Uuid, query: &NoteQuery) -> StoreResult<Vec<Note>> {
        let notes = self.notes.read().await;
        let mut matched: Vec<Note> = notes
            .values()
            .filter(|note| matches_query(note, owner_id, query))
            .cloned()
            .collect();
        sort_notes(&mut matched);
        matched.truncate(query.limit);
        Ok(matched)
    }

    async fn find_shared(&self, user_id: Uuid, limit: usize) -> StoreResult<Vec<Note>> {
        let notes = self.notes.read().await;
        let mut matched: Vec<Note> = notes
            .values()
            .filter(|note| !note.is_trashed && note.has_collaborator(user_id))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        matched.truncate(limit);
        Ok(matched)
    }

    async fn detach_label(&self, owner_id: Uuid, label_id: Uuid) -> StoreResult<u64> {
        let mut notes = self.notes.write().await;
        let mut touched = 0;
        for note in notes.values_mut() {
            if note.owner_id == owner_id && note.has_label(label_id) {
                note.labels.retain(|id| *id != label_id);
                note.touch();
                touched += 1;
            }
        }
        Ok(touched)
    }
}

// == Memory Label Store ==
/// In-memory label storage.
#[derive(Debug, Default)]
pub struct MemoryLabelStore {
    labels: RwLock<HashMap<Uuid, Label>>,
}

impl MemoryLabelStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LabelStore for MemoryLabelStore {
    async fn insert(&self, label: Label) -> StoreResult<()> {
        let mut labels = self.labels.write().await;
        labels.insert(label.id, label);
        Ok(())
    }

    async fn get(&self, label_id: Uuid) -> StoreResult<Option<Label>> {
        let labels = self.labels.read().await;
        Ok(labels.get(&label_id).cloned())
    }

    async fn list_for_user(&self, owner_id: Uuid) -> StoreResult<Vec<Label>> {
        let labels = self.labels.read().await;
        let mut owned: Vec<Label> = labels
            .values()
            .filter(|label| label.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(owned)
    }

    async fn update(&self, label: Label) -> StoreResult<bool> {
        let mut labels = self.labels.write().await;
        match labels.get_mut(&label.id) {
            Some(slot) => {
                *slot = label;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, label_id: Uuid) -> StoreResult<bool> {
        let mut labels = self.labels.write().await;
        Ok(labels.remove(&label_id).is_some())
    }
}

// == Memory User Directory ==
/// In-memory user directory.
#[derive(Debug, Default)]
pub struct MemoryUserDirectory {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn insert(&self, user: User) -> StoreResult<()> {
        let mut users = self.users.write().await;
        let duplicate = users
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&user.email));
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "email already registered: {}",
                user.email
            )));
        }
        users.insert(user.id, user);
        Ok(())
    }

    async fn get(&self, user_id: Uuid) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&user_id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_find_owned() {
        let store = MemoryNoteStore::new();
        let owner = Uuid::new_v4();

        store.insert(Note::new(owner, "T1", "D1")).await.unwrap();
        store
            .insert(Note::new(Uuid::new_v4(), "other", "note"))
            .await
            .unwrap();

        let notes = store
            .find_owned(owner, &NoteQuery::live(100))
            .await
            .unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "T1");
    }

    #[tokio::test]
    async fn test_find_owned_excludes_trashed() {
        let store = MemoryNoteStore::new();
        let owner = Uuid::new_v4();

        let mut trashed = Note::new(owner, "gone", "d");
        trashed.is_trashed = true;
        store.insert(trashed).await.unwrap();
        store.insert(Note::new(owner, "live", "d")).await.unwrap();

        let live = store
            .find_owned(owner, &NoteQuery::live(100))
            .await
            .unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].title, "live");

        let trash = store
            .find_owned(owner, &NoteQuery::trashed(100))
            .await
            .unwrap();
        assert_eq!(trash.len(), 1);
        assert_eq!(trash[0].title, "gone");
    }

    #[tokio::test]
    async fn test_find_owned_pinned_sort_first() {
        let store = MemoryNoteStore::new();
        let owner = Uuid::new_v4();

        store.insert(Note::new(owner, "plain", "d")).await.unwrap();
        let mut pinned = Note::new(owner, "pinned", "d");
        pinned.is_pinned = true;
        store.insert(pinned).await.unwrap();

        let notes = store
            .find_owned(owner, &NoteQuery::live(100))
            .await
            .unwrap();
        assert_eq!(notes[0].title, "pinned");
    }

    #[tokio::test]
    async fn test_find_owned_filters_and_text() {
        let store = MemoryNoteStore::new();
        let owner = Uuid::new_v4();

        let mut archived = Note::new(owner, "Meeting notes", "quarterly plan");
        archived.is_archived = true;
        store.insert(archived).await.unwrap();
        store
            .insert(Note::new(owner, "Groceries", "milk and eggs"))
            .await
            .unwrap();

        let mut query = NoteQuery::live(100);
        query.archived = Some(true);
        let archived_only = store.find_owned(owner, &query).await.unwrap();
        assert_eq!(archived_only.len(), 1);
        assert_eq!(archived_only[0].title, "Meeting notes");

        let mut query = NoteQuery::live(100);
        query.text = Some("MILK".to_string());
        let by_text = store.find_owned(owner, &query).await.unwrap();
        assert_eq!(by_text.len(), 1);
        assert_eq!(by_text[0].title, "Groceries");
    }

    #[tokio::test]
    async fn test_find_owned_respects_limit() {
        let store = MemoryNoteStore::new();
        let owner = Uuid::new_v4();
        for i in 0..10 {
            store
                .insert(Note::new(owner, format!("n{}", i), "d"))
                .await
                .unwrap();
        }

        let notes = store.find_owned(owner, &NoteQuery::live(3)).await.unwrap();
        assert_eq!(notes.len(), 3);
    }

    #[tokio::test]
    async fn test_find_shared() {
        let store = MemoryNoteStore::new();
        let owner = Uuid::new_v4();
        let collaborator = Uuid::new_v4();

        let mut shared = Note::new(owner, "shared", "d");
        shared.collaborators.push(collaborator);
        store.insert(shared).await.unwrap();
        store.insert(Note::new(owner, "private", "d")).await.unwrap();

        let shared_with = store.find_shared(collaborator, 100).await.unwrap();
        assert_eq!(shared_with.len(), 1);
        assert_eq!(shared_with[0].title, "shared");

        assert!(store.find_shared(owner, 100).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_detach_label() {
        let store = MemoryNoteStore::new();
        let owner = Uuid::new_v4();
        let label = Uuid::new_v4();

        let mut tagged = Note::new(owner, "tagged", "d");
        tagged.labels.push(label);
        store.insert(tagged).await.unwrap();
        store.insert(Note::new(owner, "plain", "d")).await.unwrap();

        let touched = store.detach_label(owner, label).await.unwrap();
        assert_eq!(touched, 1);

        let mut query = NoteQuery::live(100);
        query.label_id = Some(label);
        assert!(store.find_owned(owner, &query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_note_returns_false() {
        let store = MemoryNoteStore::new();
        let phantom = Note::new(Uuid::new_v4(), "ghost", "d");
        assert!(!store.update(phantom).await.unwrap());
    }

    #[tokio::test]
    async fn test_label_store_crud() {
        let store = MemoryLabelStore::new();
        let owner = Uuid::new_v4();

        let label = Label::new(owner, "work");
        let label_id = label.id;
        store.insert(label).await.unwrap();
        store.insert(Label::new(owner, "home")).await.unwrap();

        let listed = store.list_for_user(owner).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "home"); // sorted by name

        assert!(store.remove(label_id).await.unwrap());
        assert!(store.get(label_id).await.unwrap().is_none());
        assert!(!store.remove(label_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_directory_duplicate_email_conflicts() {
        let directory = MemoryUserDirectory::new();

        directory
            .insert(User::new("Ada", "Lovelace", "ada@example.com"))
            .await
            .unwrap();
        let duplicate = directory
            .insert(User::new("Imposter", "User", "ADA@example.com"))
            .await;
        assert!(matches!(duplicate, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_directory_find_by_email_case_insensitive() {
        let directory = MemoryUserDirectory::new();
        let user = User::new("Ada", "Lovelace", "ada@example.com");
        let user_id = user.id;
        directory.insert(user).await.unwrap();

        let found = directory.find_by_email("Ada@Example.COM").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user_id));
    }
}
