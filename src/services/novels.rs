use std::sync::Arc;

use tracing::info;

use crate::database::models::{NewNovel, Novel, NovelChanges};
use crate::database::Store;
use crate::services::cascade::delete_with_content;
use crate::services::chapter_content::ChapterContentStore;
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::validate::{non_empty, Validator, LONG_TEXT_MAX, TITLE_MAX};
use crate::types::{Page, Paged};

const ENTITY: &str = "novel";

pub struct NovelService {
    store: Arc<dyn Store>,
    content: Arc<ChapterContentStore>,
}

impl NovelService {
    pub fn new(store: Arc<dyn Store>, content: Arc<ChapterContentStore>) -> Self {
        Self { store, content }
    }

    pub async fn list(
        &self,
        owner: i32,
        world_view_id: Option<i32>,
        page: Page,
    ) -> ServiceResult<Paged<Novel>> {
        Ok(self.store.list_novels(owner, world_view_id, page).await?)
    }

    pub async fn get(&self, owner: i32, id: i32) -> ServiceResult<Novel> {
        self.store
            .find_novel(owner, id)
            .await?
            .ok_or(ServiceError::NotFound(ENTITY))
    }

    pub async fn create(&self, owner: i32, new: NewNovel) -> ServiceResult<Novel> {
        Validator::new()
            .required("title", &new.title, TITLE_MAX)
            .max_len("description", &new.description, LONG_TEXT_MAX)
            .finish()?;

        if self.store.find_world_view(owner, new.world_view_id).await?.is_none() {
            return Err(ServiceError::InvalidParent("world view"));
        }

        let created = self.store.insert_novel(owner, &new).await?;
        info!(novel_id = created.id, owner, "novel created");
        Ok(created)
    }

    pub async fn update(&self, owner: i32, id: i32, changes: NovelChanges) -> ServiceResult<Novel> {
        let changes = NovelChanges {
            title: non_empty(changes.title),
            ..changes
        };
        Validator::new()
            .optional_max_len("title", changes.title.as_deref(), TITLE_MAX)
            .optional_max_len("description", changes.description.as_deref(), LONG_TEXT_MAX)
            .finish()?;

        let updated = self
            .store
            .update_novel(owner, id, &changes)
            .await?
            .ok_or(ServiceError::NotFound(ENTITY))?;
        info!(novel_id = id, owner, "novel updated");
        Ok(updated)
    }

    /// Chapters and their bodies go with the novel
    pub async fn delete(&self, owner: i32, id: i32) -> ServiceResult<()> {
        let planned = self.store.novel_chapter_files(owner, id).await?;
        let deleted = delete_with_content(
            &self.content,
            owner,
            planned,
            self.store.delete_novel(owner, id),
        )
        .await?;

        if !deleted {
            return Err(ServiceError::NotFound(ENTITY));
        }
        info!(novel_id = id, owner, "novel deleted");
        Ok(())
    }
}
