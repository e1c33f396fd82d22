//! Label service
//!
//! Per-user label management. Label writes follow the same ordering rule
//! as note writes: persist first, invalidate the owner's namespace after
//! (cached note payloads embed label id sets, and by-label views die with
//! their label).

use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::cache::CacheManager;
use crate::error::{AppError, Result};
use crate::models::{CreateLabelRequest, Label, UpdateLabelRequest};
use crate::store::{LabelStore, NoteStore, StoreError};

// == Label Service ==
/// Creates, renames, and deletes per-user labels.
#[derive(Clone)]
pub struct LabelService {
    labels: Arc<dyn LabelStore>,
    notes: Arc<dyn NoteStore>,
    cache: CacheManager,
}

fn store_err(err: StoreError) -> AppError {
    AppError::Internal(err.to_string())
}

impl LabelService {
    /// Wires the service to its stores.
    pub fn new(
        labels: Arc<dyn LabelStore>,
        notes: Arc<dyn NoteStore>,
        cache: CacheManager,
    ) -> Self {
        Self {
            labels,
            notes,
            cache,
        }
    }

    /// Creates a label; names are unique per user.
    #[instrument(skip(self, req))]
    pub async fn create_label(&self, user_id: Uuid, req: CreateLabelRequest) -> Result<Label> {
        let name = req.name.trim().to_string();
        if self.name_taken(user_id, &name, None).await? {
            return Err(AppError::InvalidRequest(format!(
                "Label already exists: {}",
                name
            )));
        }

        let mut label = Label::new(user_id, name);
        if let Some(color) = req.color {
            label.color = color;
        }

        self.labels.insert(label.clone()).await.map_err(store_err)?;
        Ok(label)
    }

    /// The user's labels, sorted by name.
    pub async fn list_labels(&self, user_id: Uuid) -> Result<Vec<Label>> {
        self.labels.list_for_user(user_id).await.map_err(store_err)
    }

    /// Renames or recolors a label.
    #[instrument(skip(self, req))]
    pub async fn update_label(
        &self,
        label_id: Uuid,
        user_id: Uuid,
        req: UpdateLabelRequest,
    ) -> Result<Label> {
        let mut label = self.load_owned(label_id, user_id).await?;

        if let Some(name) = req.name {
            let name = name.trim().to_string();
            if self.name_taken(user_id, &name, Some(label_id)).await? {
                return Err(AppError::InvalidRequest(format!(
                    "Label with this name already exists: {}",
                    name
                )));
            }
            label.name = name;
        }
        if let Some(color) = req.color {
            label.color = color;
        }

        let updated = self.labels.update(label.clone()).await.map_err(store_err)?;
        if !updated {
            return Err(AppError::LabelNotFound(label_id));
        }

        // Cached note payloads only carry label ids, but the rename still
        // changes what a by-label view means to the client; drop the
        // namespace so nothing stale lingers past the rename.
        self.cache.invalidate_user(user_id).await;
        Ok(label)
    }

    /// Deletes a label, detaching it from every note of the user.
    #[instrument(skip(self))]
    pub async fn delete_label(&self, label_id: Uuid, user_id: Uuid) -> Result<()> {
        self.load_owned(label_id, user_id).await?;

        // Persist both steps before touching the cache.
        self.notes
            .detach_label(user_id, label_id)
            .await
            .map_err(store_err)?;
        let removed = self.labels.remove(label_id).await.map_err(store_err)?;
        if !removed {
            return Err(AppError::LabelNotFound(label_id));
        }

        self.cache.invalidate_user(user_id).await;
        Ok(())
    }

    async fn load_owned(&self, label_id: Uuid, user_id: Uuid) -> Result<Label> {
        let label = self.labels.get(label_id).await.map_err(store_err)?;
        match label {
            Some(label) if label.owner_id == user_id => Ok(label),
            _ => Err(AppError::LabelNotFound(label_id)),
        }
    }

    async fn name_taken(
        &self,
        user_id: Uuid,
        name: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool> {
        let labels = self.labels.list_for_user(user_id).await.map_err(store_err)?;
        Ok(labels
            .iter()
            .any(|label| label.name == name && Some(label.id) != exclude))
    }
}
