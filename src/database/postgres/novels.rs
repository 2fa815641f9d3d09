use async_trait::async_trait;

use super::PgStore;
use crate::database::models::{
    Chapter, ChapterChanges, ChapterFile, NewChapter, NewNovel, Novel, NovelChanges,
};
use crate::database::repository::{ChapterRepository, DbResult, NovelRepository};
use crate::types::{Page, Paged};

const NOVEL_COLUMNS: &str = "id, user_id, world_view_id, title, description, created_at, updated_at";

const CHAPTER_COLUMNS: &str = "id, uuid, novel_id, title, summary, \"order\", \
    referenced_snapshot_ids, referenced_event_ids, referenced_misc_ids, created_at, updated_at";

#[async_trait]
impl NovelRepository for PgStore {
    async fn list_novels(
        &self,
        owner: i32,
        world_view_id: Option<i32>,
        page: Page,
    ) -> DbResult<Paged<Novel>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM novels \
             WHERE user_id = $1 AND ($2::int4 IS NULL OR world_view_id = $2)",
        )
        .bind(owner)
        .bind(world_view_id)
        .fetch_one(&self.pool)
        .await?;

        let sql = format!(
            "SELECT {} FROM novels \
             WHERE user_id = $1 AND ($2::int4 IS NULL OR world_view_id = $2) \
             ORDER BY updated_at DESC, id DESC LIMIT $3 OFFSET $4",
            NOVEL_COLUMNS
        );
        let list = sqlx::query_as::<_, Novel>(&sql)
            .bind(owner)
            .bind(world_view_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Paged::new(list, total))
    }

    async fn find_novel(&self, owner: i32, id: i32) -> DbResult<Option<Novel>> {
        let sql = format!("SELECT {} FROM novels WHERE id = $1 AND user_id = $2", NOVEL_COLUMNS);
        let found = sqlx::query_as::<_, Novel>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found)
    }

    async fn insert_novel(&self, owner: i32, new: &NewNovel) -> DbResult<Novel> {
        let sql = format!(
            "INSERT INTO novels (user_id, world_view_id, title, description, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, now(), now()) RETURNING {}",
            NOVEL_COLUMNS
        );
        let created = sqlx::query_as::<_, Novel>(&sql)
            .bind(owner)
            .bind(new.world_view_id)
            .bind(&new.title)
            .bind(&new.description)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn update_novel(
        &self,
        owner: i32,
        id: i32,
        changes: &NovelChanges,
    ) -> DbResult<Option<Novel>> {
        let sql = format!(
            "UPDATE novels SET \
                title = COALESCE($3, title), \
                description = COALESCE($4, description), \
                updated_at = now() \
             WHERE id = $1 AND user_id = $2 RETURNING {}",
            NOVEL_COLUMNS
        );
        let updated = sqlx::query_as::<_, Novel>(&sql)
            .bind(id)
            .bind(owner)
            .bind(changes.title.as_deref())
            .bind(changes.description.as_deref())
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn novel_chapter_files(&self, owner: i32, id: i32) -> DbResult<Vec<ChapterFile>> {
        let files = sqlx::query_as::<_, ChapterFile>(
            "SELECT n.world_view_id, c.novel_id, c.uuid FROM chapters c \
             JOIN novels n ON n.id = c.novel_id \
             WHERE n.id = $1 AND n.user_id = $2",
        )
        .bind(id)
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(files)
    }

    async fn delete_novel(&self, owner: i32, id: i32) -> DbResult<Option<Vec<ChapterFile>>> {
        let mut tx = self.pool.begin().await?;

        let world_view_id: Option<i32> = sqlx::query_scalar(
            "SELECT world_view_id FROM novels WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(world_view_id) = world_view_id else {
            return Ok(None);
        };

        let uuids: Vec<uuid::Uuid> =
            sqlx::query_scalar("DELETE FROM chapters WHERE novel_id = $1 RETURNING uuid")
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;

        sqlx::query("DELETE FROM novels WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let files = uuids
            .into_iter()
            .map(|uuid| ChapterFile {
                world_view_id,
                novel_id: id,
                uuid,
            })
            .collect();
        Ok(Some(files))
    }
}

#[async_trait]
impl ChapterRepository for PgStore {
    async fn list_chapters(&self, novel_id: i32) -> DbResult<Vec<Chapter>> {
        let sql = format!(
            "SELECT {} FROM chapters WHERE novel_id = $1 ORDER BY \"order\" ASC, id ASC",
            CHAPTER_COLUMNS
        );
        let chapters = sqlx::query_as::<_, Chapter>(&sql)
            .bind(novel_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(chapters)
    }

    async fn find_chapter(&self, novel_id: i32, id: i32) -> DbResult<Option<Chapter>> {
        let sql = format!(
            "SELECT {} FROM chapters WHERE id = $1 AND novel_id = $2",
            CHAPTER_COLUMNS
        );
        let found = sqlx::query_as::<_, Chapter>(&sql)
            .bind(id)
            .bind(novel_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found)
    }

    async fn insert_chapter(&self, new: &NewChapter) -> DbResult<Chapter> {
        let sql = format!(
            "INSERT INTO chapters \
                (uuid, novel_id, title, summary, \"order\", referenced_snapshot_ids, \
                 referenced_event_ids, referenced_misc_ids, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now(), now()) RETURNING {}",
            CHAPTER_COLUMNS
        );
        let created = sqlx::query_as::<_, Chapter>(&sql)
            .bind(new.uuid)
            .bind(new.novel_id)
            .bind(&new.title)
            .bind(&new.summary)
            .bind(new.order)
            .bind(&new.referenced_snapshot_ids)
            .bind(&new.referenced_event_ids)
            .bind(&new.referenced_misc_ids)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn update_chapter(
        &self,
        novel_id: i32,
        id: i32,
        changes: &ChapterChanges,
    ) -> DbResult<Option<Chapter>> {
        let sql = format!(
            "UPDATE chapters SET \
                title = COALESCE($3, title), \
                summary = COALESCE($4, summary), \
                \"order\" = COALESCE($5, \"order\"), \
                referenced_snapshot_ids = COALESCE($6, referenced_snapshot_ids), \
                referenced_event_ids = COALESCE($7, referenced_event_ids), \
                referenced_misc_ids = COALESCE($8, referenced_misc_ids), \
                updated_at = now() \
             WHERE id = $1 AND novel_id = $2 RETURNING {}",
            CHAPTER_COLUMNS
        );
        let updated = sqlx::query_as::<_, Chapter>(&sql)
            .bind(id)
            .bind(novel_id)
            .bind(changes.title.as_deref())
            .bind(changes.summary.as_deref())
            .bind(changes.order)
            .bind(changes.referenced_snapshot_ids.as_ref())
            .bind(changes.referenced_event_ids.as_ref())
            .bind(changes.referenced_misc_ids.as_ref())
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn delete_chapter(&self, novel_id: i32, id: i32) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM chapters WHERE id = $1 AND novel_id = $2")
            .bind(id)
            .bind(novel_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
