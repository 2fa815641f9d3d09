use std::sync::Arc;

use tracing::info;

use crate::database::models::{Character, CharacterChanges, NewCharacter};
use crate::database::Store;
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::validate::{non_empty, Validator, NAME_MAX, TEXT_MAX};
use crate::types::{Page, Paged};

const ENTITY: &str = "character";

pub struct CharacterService {
    store: Arc<dyn Store>,
}

impl CharacterService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list(
        &self,
        owner: i32,
        world_view_id: Option<i32>,
        page: Page,
    ) -> ServiceResult<Paged<Character>> {
        Ok(self.store.list_characters(owner, world_view_id, page).await?)
    }

    pub async fn get(&self, owner: i32, id: i32) -> ServiceResult<Character> {
        self.store
            .find_character(owner, id)
            .await?
            .ok_or(ServiceError::NotFound(ENTITY))
    }

    pub async fn create(&self, owner: i32, new: NewCharacter) -> ServiceResult<Character> {
        Validator::new()
            .required("name", &new.name, NAME_MAX)
            .max_len("description", &new.description, TEXT_MAX)
            .max_len("note", &new.note, TEXT_MAX)
            .finish()?;

        if self.store.find_world_view(owner, new.world_view_id).await?.is_none() {
            return Err(ServiceError::InvalidParent("world view"));
        }

        let created = self.store.insert_character(owner, &new).await?;
        info!(character_id = created.id, owner, "character created");
        Ok(created)
    }

    pub async fn update(
        &self,
        owner: i32,
        id: i32,
        changes: CharacterChanges,
    ) -> ServiceResult<Character> {
        let changes = CharacterChanges {
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
            .update_character(owner, id, &changes)
            .await?
            .ok_or(ServiceError::NotFound(ENTITY))?;
        info!(character_id = id, owner, "character updated");
        Ok(updated)
    }

    /// Snapshots of the character go with it
    pub async fn delete(&self, owner: i32, id: i32) -> ServiceResult<()> {
        if !self.store.delete_character(owner, id).await? {
            return Err(ServiceError::NotFound(ENTITY));
        }
        info!(character_id = id, owner, "character deleted");
        Ok(())
    }
}
