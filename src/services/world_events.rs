use std::sync::Arc;

use tracing::info;

use crate::database::models::{NewWorldEvent, WorldEvent, WorldEventChanges};
use crate::database::Store;
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::validate::{non_empty, Validator, NAME_MAX, TEXT_MAX};
use crate::types::{Page, Paged};

const ENTITY: &str = "world event";

pub struct WorldEventService {
    store: Arc<dyn Store>,
}

impl WorldEventService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(
        &self,
        owner: i32,
        world_view_id: Option<i32>,
        page: Page,
    ) -> ServiceResult<Paged<WorldEvent>> {
        Ok(self.store.list_world_events(owner, world_view_id, page).await?)
    }

    /// Whole timeline of one world view; 404 when the world view isn't the caller's
    pub async fn timeline(&self, owner: i32, world_view_id: i32) -> ServiceResult<Vec<WorldEvent>> {
        if self.store.find_world_view(owner, world_view_id).await?.is_none() {
            return Err(ServiceError::NotFound("world view"));
        }
        Ok(self.store.world_view_events(owner, world_view_id).await?)
    }

    pub async fn get(&self, owner: i32, id: i32) -> ServiceResult<WorldEvent> {
        self.store
            .find_world_event(owner, id)
            .await?
            .ok_or(ServiceError::NotFound(ENTITY))
    }

    pub async fn create(&self, owner: i32, new: NewWorldEvent) -> ServiceResult<WorldEvent> {
        Validator::new()
            .required("name", &new.name, NAME_MAX)
            .max_len("description", &new.description, TEXT_MAX)
            .finish()?;

        if self.store.find_world_view(owner, new.world_view_id).await?.is_none() {
            return Err(ServiceError::InvalidParent("world view"));
        }

        let created = self.store.insert_world_event(owner, &new).await?;
        info!(world_event_id = created.id, owner, "world event created");
        Ok(created)
    }

    pub async fn update(
        &self,
        owner: i32,
        id: i32,
        changes: WorldEventChanges,
    ) -> ServiceResult<WorldEvent> {
        let changes = WorldEventChanges {
            name: non_empty(changes.name),
            ..changes
        };
        Validator::new()
            .optional_max_len("name", changes.name.as_deref(), NAME_MAX)
            .optional_max_len("description", changes.description.as_deref(), TEXT_MAX)
            .finish()?;

        let updated = self
            .store
            .update_world_event(owner, id, &changes)
            .await?
            .ok_or(ServiceError::NotFound(ENTITY))?;
        info!(world_event_id = id, owner, "world event updated");
        Ok(updated)
    }

    pub async fn delete(&self, owner: i32, id: i32) -> ServiceResult<()> {
        if !self.store.delete_world_event(owner, id).await? {
            return Err(ServiceError::NotFound(ENTITY));
        }
        info!(world_event_id = id, owner, "world event deleted");
        Ok(())
    }
}
