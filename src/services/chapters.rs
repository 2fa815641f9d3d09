use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::models::{Chapter, ChapterChanges, NewChapter, Novel};
use crate::database::Store;
use crate::services::chapter_content::{ChapterContentStore, ChapterLocation};
use crate::services::error::{ServiceError, ServiceResult};
use crate::services::validate::{non_empty, Validator, LONG_TEXT_MAX, TITLE_MAX};

const ENTITY: &str = "chapter";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewChapterRequest {
    pub title: String,
    pub summary: String,
    pub order: i32,
    pub content: String,
    pub referenced_snapshot_ids: Vec<i32>,
    pub referenced_event_ids: Vec<i32>,
    pub referenced_misc_ids: Vec<i32>,
}

/// Absent fields stay as they are; `content` present replaces the body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChapterPatch {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub order: Option<i32>,
    pub content: Option<String>,
    pub referenced_snapshot_ids: Option<Vec<i32>>,
    pub referenced_event_ids: Option<Vec<i32>>,
    pub referenced_misc_ids: Option<Vec<i32>>,
}

/// A chapter row together with its prose body
#[derive(Debug, Clone, Serialize)]
pub struct ChapterDetail {
    #[serde(flatten)]
    pub chapter: Chapter,
    pub content: String,
}

pub struct ChapterService {
    store: Arc<dyn Store>,
    content: Arc<ChapterContentStore>,
}

impl ChapterService {
    pub fn new(store: Arc<dyn Store>, content: Arc<ChapterContentStore>) -> Self {
        Self { store, content }
    }

    /// Chapters hang off the path's novel, so a foreign novel is a plain 404
    async fn novel(&self, owner: i32, novel_id: i32) -> ServiceResult<Novel> {
        self.store
            .find_novel(owner, novel_id)
            .await?
            .ok_or(ServiceError::NotFound("novel"))
    }

    async fn chapter(&self, novel_id: i32, id: i32) -> ServiceResult<Chapter> {
        self.store
            .find_chapter(novel_id, id)
            .await?
            .ok_or(ServiceError::NotFound(ENTITY))
    }

    fn location(novel: &Novel, uuid: Uuid) -> ChapterLocation {
        ChapterLocation::new(novel.user_id, novel.world_view_id, novel.id, uuid)
    }

    /// Table of contents without bodies
    pub async fn list(&self, owner: i32, novel_id: i32) -> ServiceResult<Vec<Chapter>> {
        self.novel(owner, novel_id).await?;
        Ok(self.store.list_chapters(novel_id).await?)
    }

    pub async fn get(&self, owner: i32, novel_id: i32, id: i32) -> ServiceResult<ChapterDetail> {
        let novel = self.novel(owner, novel_id).await?;
        let chapter = self.chapter(novel_id, id).await?;
        let content = self.content.read(&Self::location(&novel, chapter.uuid)).await?;
        Ok(ChapterDetail { chapter, content })
    }

    /// The body is written before the row; a failed insert removes it again
    pub async fn create(
        &self,
        owner: i32,
        novel_id: i32,
        request: NewChapterRequest,
    ) -> ServiceResult<ChapterDetail> {
        Validator::new()
            .required("title", &request.title, TITLE_MAX)
            .max_len("summary", &request.summary, LONG_TEXT_MAX)
            .finish()?;

        let novel = self.novel(owner, novel_id).await?;
        let uuid = Uuid::new_v4();
        let location = Self::location(&novel, uuid);
        self.content.write(&location, &request.content).await?;

        let new = NewChapter {
            uuid,
            novel_id,
            title: request.title,
            summary: request.summary,
            order: request.order,
            referenced_snapshot_ids: request.referenced_snapshot_ids,
            referenced_event_ids: request.referenced_event_ids,
            referenced_misc_ids: request.referenced_misc_ids,
        };
        let chapter = match self.store.insert_chapter(&new).await {
            Ok(chapter) => chapter,
            Err(e) => {
                if let Err(cleanup) = self.content.delete(&location).await {
                    warn!(chapter = %uuid, error = %cleanup, "could not remove body of failed chapter");
                }
                return Err(e.into());
            }
        };

        info!(chapter_id = chapter.id, novel_id, owner, "chapter created");
        Ok(ChapterDetail {
            chapter,
            content: request.content,
        })
    }

    pub async fn update(
        &self,
        owner: i32,
        novel_id: i32,
        id: i32,
        patch: ChapterPatch,
    ) -> ServiceResult<ChapterDetail> {
        let title = non_empty(patch.title);
        Validator::new()
            .optional_max_len("title", title.as_deref(), TITLE_MAX)
            .optional_max_len("summary", patch.summary.as_deref(), LONG_TEXT_MAX)
            .finish()?;

        let novel = self.novel(owner, novel_id).await?;
        let existing = self.chapter(novel_id, id).await?;
        let location = Self::location(&novel, existing.uuid);

        // The new body replaces the live file only once the row update has landed
        let staged = match &patch.content {
            Some(text) => Some(self.content.stage_write(&location, text).await?),
            None => None,
        };

        let changes = ChapterChanges {
            title,
            summary: patch.summary,
            order: patch.order,
            referenced_snapshot_ids: patch.referenced_snapshot_ids,
            referenced_event_ids: patch.referenced_event_ids,
            referenced_misc_ids: patch.referenced_misc_ids,
        };
        let chapter = match self.store.update_chapter(novel_id, id, &changes).await {
            Ok(Some(chapter)) => chapter,
            Ok(None) => {
                if let Some(staged) = staged {
                    staged.discard().await;
                }
                return Err(ServiceError::NotFound(ENTITY));
            }
            Err(e) => {
                if let Some(staged) = staged {
                    staged.discard().await;
                }
                return Err(e.into());
            }
        };

        let content = match (staged, patch.content) {
            (Some(staged), Some(text)) => {
                staged.commit().await?;
                text
            }
            _ => self.content.read(&location).await?,
        };

        info!(chapter_id = id, novel_id, owner, "chapter updated");
        Ok(ChapterDetail { chapter, content })
    }

    /// Row and body go together; the body is restored if the row survives
    pub async fn delete(&self, owner: i32, novel_id: i32, id: i32) -> ServiceResult<()> {
        let novel = self.novel(owner, novel_id).await?;
        let chapter = self.chapter(novel_id, id).await?;
        let location = Self::location(&novel, chapter.uuid);

        let staged = self.content.stage_removal(&[location]).await?;
        match self.store.delete_chapter(novel_id, id).await {
            Ok(true) => staged.commit().await,
            Ok(false) => {
                staged.rollback().await;
                return Err(ServiceError::NotFound(ENTITY));
            }
            Err(e) => {
                staged.rollback().await;
                return Err(e.into());
            }
        }

        info!(chapter_id = id, novel_id, owner, "chapter deleted");
        Ok(())
    }
}
