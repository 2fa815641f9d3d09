use std::sync::Arc;

use tracing::info;

use crate::database::models::{CharacterSnapshot, NewSnapshot, SnapshotChanges, SnapshotFilter};
use crate::database::{DatabaseError, Store};
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::validate::{non_empty, Validator, NAME_MAX, TEXT_MAX};
use crate::types::{Page, Paged};

const ENTITY: &str = "character snapshot";

pub struct SnapshotService {
    store: Arc<dyn Store>,
}

impl SnapshotService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(
        &self,
        owner: i32,
        filter: SnapshotFilter,
        page: Page,
    ) -> ServiceResult<Paged<CharacterSnapshot>> {
        Ok(self.store.list_snapshots(owner, filter, page).await?)
    }

    pub async fn get(&self, owner: i32, id: i32) -> ServiceResult<CharacterSnapshot> {
        self.store
            .find_snapshot(owner, id)
            .await?
            .ok_or(ServiceError::NotFound(ENTITY))
    }

    /// The character must be the caller's and belong to the given world view
    pub async fn create(&self, owner: i32, new: NewSnapshot) -> ServiceResult<CharacterSnapshot> {
        Validator::new()
            .required("name", &new.name, NAME_MAX)
            .max_len("description", &new.description, TEXT_MAX)
            .max_len("note", &new.note, TEXT_MAX)
            .finish()?;

        if self.store.find_world_view(owner, new.world_view_id).await?.is_none() {
            return Err(ServiceError::InvalidParent("world view"));
        }
        let character = self.store.find_character(owner, new.character_id).await?;
        if !character.is_some_and(|c| c.world_view_id == new.world_view_id) {
            return Err(ServiceError::InvalidParent("character"));
        }

        let created = match self.store.insert_snapshot(owner, &new).await {
            Ok(created) => created,
            // the character went away between the check and the insert
            Err(DatabaseError::NotFound(_)) => return Err(ServiceError::InvalidParent("character")),
            Err(e) => return Err(e.into()),
        };
        info!(
            snapshot_id = created.id,
            character_id = created.character_id,
            owner,
            "character snapshot created"
        );
        Ok(created)
    }

    pub async fn update(
        &self,
        owner: i32,
        id: i32,
        changes: SnapshotChanges,
    ) -> ServiceResult<CharacterSnapshot> {
        let changes = SnapshotChanges {
            name: non_empty(changes.name),
            ..changes
        };
        Validator::new()
            .optional_max_len("name", changes.name.as_deref(), NAME_MAX)
            .optional_max_len("description", changes.description.as_deref(), TEXT_MAX)
            .optional_max_len("note", changes.note.as_deref(), TEXT_MAX)
            .finish()?;

        let updated = self
            .store
            .update_snapshot(owner, id, &changes)
            .await?
            .ok_or(ServiceError::NotFound(ENTITY))?;
        info!(snapshot_id = id, owner, "character snapshot updated");
        Ok(updated)
    }

    pub async fn delete(&self, owner: i32, id: i32) -> ServiceResult<()> {
        if !self.store.delete_snapshot(owner, id).await? {
            return Err(ServiceError::NotFound(ENTITY));
        }
        info!(snapshot_id = id, owner, "character snapshot deleted");
        Ok(())
    }
}
