//! Shared fixtures for integration tests

// Each integration test target compiles its own copy of this module and
// uses a different subset of it.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use notekeep::api::AppState;
use notekeep::cache::{CacheManager, MemoryCacheBackend};
use notekeep::mail::{Email, MailError, MailResult, MailTransport};
use notekeep::models::{CreateNoteRequest, Note, User};
use notekeep::notes::{LabelService, NoteService};
use notekeep::queue::{MemoryQueue, NotificationPublisher};
use notekeep::store::{
    MemoryLabelStore, MemoryNoteStore, MemoryUserDirectory, NoteQuery, NoteStore, StoreResult,
    UserDirectory,
};

// == Counting Note Store ==
/// Wraps the memory note store and counts list-query calls, so tests can
/// assert whether a read was served from the cache or from storage.
#[derive(Default)]
pub struct CountingNoteStore {
    inner: MemoryNoteStore,
    list_queries: AtomicUsize,
}

impl CountingNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of find_owned/find_shared calls issued so far.
    pub fn list_queries(&self) -> usize {
        self.list_queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NoteStore for CountingNoteStore {
    async fn insert(&self, note: Note) -> StoreResult<()> {
        self.inner.insert(note).await
    }

    async fn get(&self, note_id: Uuid) -> StoreResult<Option<Note>> {
        self.inner.get(note_id).await
    }

    async fn update(&self, note: Note) -> StoreResult<bool> {
        self.inner.update(note).await
    }

    async fn remove(&self, note_id: Uuid) -> StoreResult<bool> {
        self.inner.remove(note_id).await
    }

    async fn find_owned(&self, owner_id: Uuid, query: &NoteQuery) -> StoreResult<Vec<Note>> {
        self.list_queries.fetch_add(1, Ordering::SeqCst);
        self.inner.find_owned(owner_id, query).await
    }

    async fn find_shared(&self, user_id: Uuid, limit: usize) -> StoreResult<Vec<Note>> {
        self.list_queries.fetch_add(1, Ordering::SeqCst);
        self.inner.find_shared(user_id, limit).await
    }

    async fn detach_label(&self, owner_id: Uuid, label_id: Uuid) -> StoreResult<u64> {
        self.inner.detach_label(owner_id, label_id).await
    }
}

// == Recording Mailer ==
/// Records every accepted send; fails while `failing` is set.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<Email>>,
    failing: AtomicBool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn sent(&self) -> Vec<Email> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl MailTransport for RecordingMailer {
    async fn send(&self, email: &Email) -> MailResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MailError::Delivery("transport down".to_string()));
        }
        self.sent.lock().await.push(email.clone());
        Ok(())
    }
}

// == Test Environment ==
/// A notes service wired to in-memory backends with observable seams.
pub struct TestEnv {
    pub service: NoteService,
    pub labels: LabelService,
    pub store: Arc<CountingNoteStore>,
    pub users: Arc<MemoryUserDirectory>,
    pub cache_backend: Arc<MemoryCacheBackend>,
    pub queue: Arc<MemoryQueue>,
    pub mailer: Arc<RecordingMailer>,
}

impl TestEnv {
    pub fn new() -> Self {
        let store = Arc::new(CountingNoteStore::new());
        let label_store = Arc::new(MemoryLabelStore::new());
        let users = Arc::new(MemoryUserDirectory::new());
        let cache_backend = Arc::new(MemoryCacheBackend::new());
        let cache = CacheManager::new(cache_backend.clone(), 300);
        let queue = Arc::new(MemoryQueue::new());
        let publisher = NotificationPublisher::new(queue.clone());

        let service = NoteService::new(
            store.clone(),
            label_store.clone(),
            users.clone(),
            cache.clone(),
            publisher,
            100,
        );
        let labels = LabelService::new(label_store, store.clone(), cache);

        Self {
            service,
            labels,
            store,
            users,
            cache_backend,
            queue,
            mailer: Arc::new(RecordingMailer::new()),
        }
    }

    /// Registers a user in the directory.
    pub async fn register(&self, first: &str, last: &str, email: &str) -> User {
        let user = User::new(first, last, email);
        self.users.insert(user.clone()).await.unwrap();
        user
    }
}

/// Plain create request for tests.
pub fn create_req(title: &str, description: &str) -> CreateNoteRequest {
    CreateNoteRequest {
        title: title.to_string(),
        description: description.to_string(),
        color: None,
        is_pinned: false,
        reminder: None,
        checklist: Vec::new(),
    }
}

/// An [`AppState`] wired to in-memory backends, for HTTP-level tests.
pub fn build_state() -> AppState {
    let env = TestEnv::new();
    AppState::new(env.service, env.labels, env.users)
}
