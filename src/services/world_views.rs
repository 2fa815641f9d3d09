use std::sync::Arc;

use tracing::info;

use crate::database::models::{NewWorldView, WorldView, WorldViewChanges};
use crate::database::Store;
use crate::services::cascade::delete_with_content;
use crate::services::chapter_content::ChapterContentStore;
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::validate::{non_empty, Validator, NAME_MAX, TEXT_MAX};
use crate::types::{Page, Paged};

const ENTITY: &str = "world view";

pub struct WorldViewService {
    store: Arc<dyn Store>,
    content: Arc<ChapterContentStore>,
}

impl WorldViewService {
    pub fn new(store: Arc<dyn Store>, content: Arc<ChapterContentStore>) -> Self {
        Self { store, content }
    }

    pub async fn list(&self, owner: i32, page: Page) -> ServiceResult<Paged<WorldView>> {
        Ok(self.store.list_world_views(owner, page).await?)
    }

    pub async fn get(&self, owner: i32, id: i32) -> ServiceResult<WorldView> {
        self.store
            .find_world_view(owner, id)
            .await?
            .ok_or(ServiceError::NotFound(ENTITY))
    }

    pub async fn create(&self, owner: i32, new: NewWorldView) -> ServiceResult<WorldView> {
        Validator::new()
            .required("name", &new.name, NAME_MAX)
            .max_len("description", &new.description, TEXT_MAX)
            .max_len("notes", &new.notes, TEXT_MAX)
            .finish()?;

        let created = self.store.insert_world_view(owner, &new).await?;
        info!(world_view_id = created.id, owner, "world view created");
        Ok(created)
    }

    pub async fn update(
        &self,
        owner: i32,
        id: i32,
        changes: WorldViewChanges,
    ) -> ServiceResult<WorldView> {
        let changes = WorldViewChanges {
            name: non_empty(changes.name),
            ..changes
        };
        Validator::new()
            .optional_max_len("name", changes.name.as_deref(), NAME_MAX)
            .optional_max_len("description", changes.description.as_deref(), TEXT_MAX)
            .optional_max_len("notes", changes.notes.as_deref(), TEXT_MAX)
            .finish()?;

        let updated = self
            .store
            .update_world_view(owner, id, &changes)
            .await?
            .ok_or(ServiceError::NotFound(ENTITY))?;
        info!(world_view_id = id, owner, "world view updated");
        Ok(updated)
    }

    /// Removes characters, snapshots, events, miscs, novels, chapters and
    /// chapter bodies together with the world view
    pub async fn delete(&self, owner: i32, id: i32) -> ServiceResult<()> {
        let planned = self.store.world_view_chapter_files(owner, id).await?;
        let deleted = delete_with_content(
            &self.content,
            owner,
            planned,
            self.store.delete_world_view(owner, id),
        )
        .await?;

        if !deleted {
            return Err(ServiceError::NotFound(ENTITY));
        }
        info!(world_view_id = id, owner, "world view deleted");
        Ok(())
    }
}
