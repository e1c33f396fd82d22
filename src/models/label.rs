//! Label domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default display color for new labels.
pub const DEFAULT_LABEL_COLOR: &str = "#E8EAED";

// == Label ==
/// A per-user label that can be attached to any number of notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    /// Unique label id
    pub id: Uuid,
    /// Owning user
    pub owner_id: Uuid,
    /// Label name, unique per user
    pub name: String,
    /// Display color (hex string)
    pub color: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Label {
    /// Creates a new label owned by the given user.
    pub fn new(owner_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name: name.into(),
            color: DEFAULT_LABEL_COLOR.to_string(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_label() {
        let owner = Uuid::new_v4();
        let label = Label::new(owner, "work");

        assert_eq!(label.owner_id, owner);
        assert_eq!(label.name, "work");
        assert_eq!(label.color, DEFAULT_LABEL_COLOR);
    }
}
