use std::sync::Arc;

use tracing::info;

use crate::database::models::{Misc, MiscChanges, NewMisc};
use crate::database::Store;
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::validate::{non_empty, Validator, MISC_TYPE_MAX, NAME_MAX, TEXT_MAX};
use crate::types::{Page, Paged};

const ENTITY: &str = "misc";

pub struct MiscService {
    store: Arc<dyn Store>,
}

impl MiscService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(
        &self,
        owner: i32,
        world_view_id: Option<i32>,
        page: Page,
    ) -> ServiceResult<Paged<Misc>> {
        Ok(self.store.list_miscs(owner, world_view_id, page).await?)
    }

    pub async fn get(&self, owner: i32, id: i32) -> ServiceResult<Misc> {
        self.store
            .find_misc(owner, id)
            .await?
            .ok_or(ServiceError::NotFound(ENTITY))
    }

    pub async fn create(&self, owner: i32, new: NewMisc) -> ServiceResult<Misc> {
        Validator::new()
            .required("name", &new.name, NAME_MAX)
            .max_len("description", &new.description, TEXT_MAX)
            .required("type", &new.kind, MISC_TYPE_MAX)
            .finish()?;

        if self.store.find_world_view(owner, new.world_view_id).await?.is_none() {
            return Err(ServiceError::InvalidParent("world view"));
        }

        let created = self.store.insert_misc(owner, &new).await?;
        info!(misc_id = created.id, owner, "misc created");
        Ok(created)
    }

    pub async fn update(&self, owner: i32, id: i32, changes: MiscChanges) -> ServiceResult<Misc> {
        let changes = MiscChanges {
            name: non_empty(changes.name),
            kind: non_empty(changes.kind),
            ..changes
        };
        Validator::new()
            .optional_max_len("name", changes.name.as_deref(), NAME_MAX)
            .optional_max_len("description", changes.description.as_deref(), TEXT_MAX)
            .optional_max_len("type", changes.kind.as_deref(), MISC_TYPE_MAX)
            .finish()?;

        let updated = self
            .store
            .update_misc(owner, id, &changes)
            .await?
            .ok_or(ServiceError::NotFound(ENTITY))?;
        info!(misc_id = id, owner, "misc updated");
        Ok(updated)
    }

    pub async fn delete(&self, owner: i32, id: i32) -> ServiceResult<()> {
        if !self.store.delete_misc(owner, id).await? {
            return Err(ServiceError::NotFound(ENTITY));
        }
        info!(misc_id = id, owner, "misc deleted");
        Ok(())
    }
}
