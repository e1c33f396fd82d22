//! Cache key construction
//!
//! Typed, collision-free keys for per-user note views. Every key lives
//! under the owning user's namespace (`notes:<userId>:...`) so a single
//! pattern delete can drop every cached view for that user, regardless of
//! which filter combination produced each entry.

use std::fmt;

use uuid::Uuid;

use crate::models::NoteFilters;

/// Namespace prefix shared by every note cache key.
pub const KEY_PREFIX: &str = "notes";

// == Note View ==
/// The enumerated set of cacheable note views.
///
/// Views are distinct by construction: each variant renders a segment no
/// other variant can produce, so two semantically different queries can
/// never serialize to the same key string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteView {
    /// Main list view, with optional flag filters
    List(NoteFilters),
    /// Archived notes
    Archived,
    /// Pinned notes
    Pinned,
    /// Trashed notes
    Trashed,
    /// Notes shared with the user by other owners
    Shared,
    /// Notes carrying a specific label
    ByLabel(Uuid),
}

impl NoteView {
    /// Renders the view segment of the key.
    fn write_segment(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteView::List(filters) => {
                // Canonical filter serialization: fixed field order, absent
                // fields render as '-', so logically identical queries always
                // map to one key.
                write!(
                    f,
                    "list:archived={}:pinned={}",
                    render_flag(filters.archived),
                    render_flag(filters.pinned)
                )
            }
            NoteView::Archived => write!(f, "archived"),
            NoteView::Pinned => write!(f, "pinned"),
            NoteView::Trashed => write!(f, "trashed"),
            NoteView::Shared => write!(f, "shared"),
            NoteView::ByLabel(label_id) => write!(f, "label:{}", label_id),
        }
    }
}

fn render_flag(flag: Option<bool>) -> &'static str {
    match flag {
        Some(true) => "1",
        Some(false) => "0",
        None => "-",
    }
}

// == Cache Key ==
/// A fully-qualified cache key for one (user, view) tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheKey {
    user_id: Uuid,
    view: NoteView,
}

impl CacheKey {
    /// Creates a key for the given user and view.
    pub fn new(user_id: Uuid, view: NoteView) -> Self {
        Self { user_id, view }
    }

    /// The user this key belongs to.
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// Glob pattern matching every key in one user's namespace.
    ///
    /// Used by namespace invalidation; matches exactly the keys `Display`
    /// can produce for this user and nothing else.
    pub fn user_pattern(user_id: Uuid) -> String {
        format!("{}:{}:*", KEY_PREFIX, user_id)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:", KEY_PREFIX, self.user_id)?;
        self.view.write_segment(f)
    }
}
