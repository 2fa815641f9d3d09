use async_trait::async_trait;

use super::PgStore;
use crate::database::manager::DatabaseError;
use crate::database::models::{
    ChapterFile, Character, CharacterChanges, CharacterSnapshot, Misc, MiscChanges, NewCharacter,
    NewMisc, NewSnapshot, NewWorldEvent, NewWorldView, SnapshotChanges, SnapshotFilter,
    WorldEvent, WorldEventChanges, WorldView, WorldViewChanges,
};
use crate::database::repository::{
    CharacterRepository, DbResult, MiscRepository, SnapshotRepository, WorldEventRepository,
    WorldViewRepository,
};
use crate::types::{Page, Paged};

/// World view columns with the child id lists derived from the foreign keys
const WORLD_VIEW_COLUMNS: &str = "w.id, w.user_id, w.name, w.description, w.notes, \
    ARRAY(SELECT c.id FROM characters c WHERE c.world_view_id = w.id ORDER BY c.id) AS character_ids, \
    ARRAY(SELECT m.id FROM miscs m WHERE m.world_view_id = w.id ORDER BY m.id) AS misc_ids, \
    ARRAY(SELECT e.id FROM world_events e WHERE e.world_view_id = w.id ORDER BY e.id) AS world_event_ids, \
    ARRAY(SELECT n.id FROM novels n WHERE n.world_view_id = w.id ORDER BY n.id) AS novel_ids, \
    w.created_at, w.updated_at";

const CHARACTER_COLUMNS: &str =
    "id, user_id, world_view_id, snapshot_ids, name, description, note, created_at, updated_at";

const SNAPSHOT_COLUMNS: &str =
    "id, user_id, world_view_id, character_id, name, description, note, created_at, updated_at";

const MISC_COLUMNS: &str =
    "id, user_id, world_view_id, name, description, type, created_at, updated_at";

const WORLD_EVENT_COLUMNS: &str = "id, user_id, world_view_id, name, description, happened_at, \
    end_at, related_character_snapshot_ids, created_at, updated_at";

#[async_trait]
impl WorldViewRepository for PgStore {
    async fn list_world_views(&self, owner: i32, page: Page) -> DbResult<Paged<WorldView>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM world_views WHERE user_id = $1")
            .bind(owner)
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            "SELECT {} FROM world_views w WHERE w.user_id = $1 \
             ORDER BY w.updated_at DESC, w.id DESC LIMIT $2 OFFSET $3",
            WORLD_VIEW_COLUMNS
        );
        let list = sqlx::query_as::<_, WorldView>(&sql)
            .bind(owner)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Paged::new(list, total))
    }

    async fn find_world_view(&self, owner: i32, id: i32) -> DbResult<Option<WorldView>> {
        let sql = format!(
            "SELECT {} FROM world_views w WHERE w.id = $1 AND w.user_id = $2",
            WORLD_VIEW_COLUMNS
        );
        let found = sqlx::query_as::<_, WorldView>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found)
    }

    async fn insert_world_view(&self, owner: i32, new: &NewWorldView) -> DbResult<WorldView> {
        let sql = format!(
            "WITH w AS ( \
                INSERT INTO world_views (user_id, name, description, notes, created_at, updated_at) \
                VALUES ($1, $2, $3, $4, now(), now()) RETURNING * \
             ) SELECT {} FROM w",
            WORLD_VIEW_COLUMNS
        );
        let created = sqlx::query_as::<_, WorldView>(&sql)
            .bind(owner)
            .bind(&new.name)
            .bind(&new.description)
            .bind(&new.notes)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn update_world_view(
        &self,
        owner: i32,
        id: i32,
        changes: &WorldViewChanges,
    ) -> DbResult<Option<WorldView>> {
        let sql = format!(
            "WITH w AS ( \
                UPDATE world_views SET \
                    name = COALESCE($3, name), \
                    description = COALESCE($4, description), \
                    notes = COALESCE($5, notes), \
                    updated_at = now() \
                WHERE id = $1 AND user_id = $2 RETURNING * \
             ) SELECT {} FROM w",
            WORLD_VIEW_COLUMNS
        );
        let updated = sqlx::query_as::<_, WorldView>(&sql)
            .bind(id)
            .bind(owner)
            .bind(changes.name.as_deref())
            .bind(changes.description.as_deref())
            .bind(changes.notes.as_deref())
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn world_view_chapter_files(&self, owner: i32, id: i32) -> DbResult<Vec<ChapterFile>> {
        let files = sqlx::query_as::<_, ChapterFile>(
            "SELECT n.world_view_id, c.novel_id, c.uuid FROM chapters c \
             JOIN novels n ON n.id = c.novel_id \
             WHERE n.world_view_id = $1 AND n.user_id = $2",
        )
        .bind(id)
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;
        Ok(files)
    }

    async fn delete_world_view(&self, owner: i32, id: i32) -> DbResult<Option<Vec<ChapterFile>>> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<i32> = sqlx::query_scalar(
            "SELECT id FROM world_views WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&mut *tx)
        .await?;
        if locked.is_none() {
            return Ok(None);
        }

        let files = sqlx::query_as::<_, ChapterFile>(
            "DELETE FROM chapters c USING novels n \
             WHERE c.novel_id = n.id AND n.world_view_id = $1 \
             RETURNING n.world_view_id, c.novel_id, c.uuid",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM novels WHERE world_view_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "DELETE FROM character_snapshots WHERE world_view_id = $1 \
             OR character_id IN (SELECT id FROM characters WHERE world_view_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM characters WHERE world_view_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM world_events WHERE world_view_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM miscs WHERE world_view_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM world_views WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(files))
    }
}

#[async_trait]
impl CharacterRepository for PgStore {
    async fn list_characters(
        &self,
        owner: i32,
        world_view_id: Option<i32>,
        page: Page,
    ) -> DbResult<Paged<Character>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM characters \
             WHERE user_id = $1 AND ($2::int4 IS NULL OR world_view_id = $2)",
        )
        .bind(owner)
        .bind(world_view_id)
        .fetch_one(&self.pool)
        .await?;

        let sql = format!(
            "SELECT {} FROM characters \
             WHERE user_id = $1 AND ($2::int4 IS NULL OR world_view_id = $2) \
             ORDER BY updated_at DESC, id DESC LIMIT $3 OFFSET $4",
            CHARACTER_COLUMNS
        );
        let list = sqlx::query_as::<_, Character>(&sql)
            .bind(owner)
            .bind(world_view_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Paged::new(list, total))
    }

    async fn find_character(&self, owner: i32, id: i32) -> DbResult<Option<Character>> {
        let sql = format!(
            "SELECT {} FROM characters WHERE id = $1 AND user_id = $2",
            CHARACTER_COLUMNS
        );
        let found = sqlx::query_as::<_, Character>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found)
    }

    async fn insert_character(&self, owner: i32, new: &NewCharacter) -> DbResult<Character> {
        let sql = format!(
            "INSERT INTO characters \
                (user_id, world_view_id, snapshot_ids, name, description, note, created_at, updated_at) \
             VALUES ($1, $2, '{{}}', $3, $4, $5, now(), now()) RETURNING {}",
            CHARACTER_COLUMNS
        );
        let created = sqlx::query_as::<_, Character>(&sql)
            .bind(owner)
            .bind(new.world_view_id)
            .bind(&new.name)
            .bind(&new.description)
            .bind(&new.note)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn update_character(
        &self,
        owner: i32,
        id: i32,
        changes: &CharacterChanges,
    ) -> DbResult<Option<Character>> {
        let sql = format!(
            "UPDATE characters SET \
                name = COALESCE($3, name), \
                description = COALESCE($4, description), \
                note = COALESCE($5, note), \
                updated_at = now() \
             WHERE id = $1 AND user_id = $2 RETURNING {}",
            CHARACTER_COLUMNS
        );
        let updated = sqlx::query_as::<_, Character>(&sql)
            .bind(id)
            .bind(owner)
            .bind(changes.name.as_deref())
            .bind(changes.description.as_deref())
            .bind(changes.note.as_deref())
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn delete_character(&self, owner: i32, id: i32) -> DbResult<bool> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<i32> = sqlx::query_scalar(
            "SELECT id FROM characters WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&mut *tx)
        .await?;
        if locked.is_none() {
            return Ok(false);
        }

        sqlx::query("DELETE FROM character_snapshots WHERE character_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM characters WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }
}

#[async_trait]
impl SnapshotRepository for PgStore {
    async fn list_snapshots(
        &self,
        owner: i32,
        filter: SnapshotFilter,
        page: Page,
    ) -> DbResult<Paged<CharacterSnapshot>> {
        let predicate = "user_id = $1 \
            AND ($2::int4 IS NULL OR world_view_id = $2) \
            AND ($3::int4 IS NULL OR character_id = $3)";

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM character_snapshots WHERE {}",
            predicate
        ))
        .bind(owner)
        .bind(filter.world_view_id)
        .bind(filter.character_id)
        .fetch_one(&self.pool)
        .await?;

        let sql = format!(
            "SELECT {} FROM character_snapshots WHERE {} \
             ORDER BY updated_at DESC, id DESC LIMIT $4 OFFSET $5",
            SNAPSHOT_COLUMNS, predicate
        );
        let list = sqlx::query_as::<_, CharacterSnapshot>(&sql)
            .bind(owner)
            .bind(filter.world_view_id)
            .bind(filter.character_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Paged::new(list, total))
    }

    async fn find_snapshot(&self, owner: i32, id: i32) -> DbResult<Option<CharacterSnapshot>> {
        let sql = format!(
            "SELECT {} FROM character_snapshots WHERE id = $1 AND user_id = $2",
            SNAPSHOT_COLUMNS
        );
        let found = sqlx::query_as::<_, CharacterSnapshot>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found)
    }

    async fn insert_snapshot(&self, owner: i32, new: &NewSnapshot) -> DbResult<CharacterSnapshot> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<i32> = sqlx::query_scalar(
            "SELECT id FROM characters \
             WHERE id = $1 AND user_id = $2 AND world_view_id = $3 FOR UPDATE",
        )
        .bind(new.character_id)
        .bind(owner)
        .bind(new.world_view_id)
        .fetch_optional(&mut *tx)
        .await?;
        if locked.is_none() {
            return Err(DatabaseError::NotFound("character".to_string()));
        }

        let sql = format!(
            "INSERT INTO character_snapshots \
                (user_id, world_view_id, character_id, name, description, note, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, now(), now()) RETURNING {}",
            SNAPSHOT_COLUMNS
        );
        let created = sqlx::query_as::<_, CharacterSnapshot>(&sql)
            .bind(owner)
            .bind(new.world_view_id)
            .bind(new.character_id)
            .bind(&new.name)
            .bind(&new.description)
            .bind(&new.note)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE characters SET snapshot_ids = array_append(snapshot_ids, $1), updated_at = now() \
             WHERE id = $2",
        )
        .bind(created.id)
        .bind(new.character_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn update_snapshot(
        &self,
        owner: i32,
        id: i32,
        changes: &SnapshotChanges,
    ) -> DbResult<Option<CharacterSnapshot>> {
        let sql = format!(
            "UPDATE character_snapshots SET \
                name = COALESCE($3, name), \
                description = COALESCE($4, description), \
                note = COALESCE($5, note), \
                updated_at = now() \
             WHERE id = $1 AND user_id = $2 RETURNING {}",
            SNAPSHOT_COLUMNS
        );
        let updated = sqlx::query_as::<_, CharacterSnapshot>(&sql)
            .bind(id)
            .bind(owner)
            .bind(changes.name.as_deref())
            .bind(changes.description.as_deref())
            .bind(changes.note.as_deref())
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn delete_snapshot(&self, owner: i32, id: i32) -> DbResult<bool> {
        let mut tx = self.pool.begin().await?;

        let character_id: Option<i32> = sqlx::query_scalar(
            "DELETE FROM character_snapshots WHERE id = $1 AND user_id = $2 RETURNING character_id",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(character_id) = character_id else {
            return Ok(false);
        };

        sqlx::query(
            "UPDATE characters SET snapshot_ids = array_remove(snapshot_ids, $1), updated_at = now() \
             WHERE id = $2",
        )
        .bind(id)
        .bind(character_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }
}

#[async_trait]
impl MiscRepository for PgStore {
    async fn list_miscs(
        &self,
        owner: i32,
        world_view_id: Option<i32>,
        page: Page,
    ) -> DbResult<Paged<Misc>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM miscs \
             WHERE user_id = $1 AND ($2::int4 IS NULL OR world_view_id = $2)",
        )
        .bind(owner)
        .bind(world_view_id)
        .fetch_one(&self.pool)
        .await?;

        let sql = format!(
            "SELECT {} FROM miscs \
             WHERE user_id = $1 AND ($2::int4 IS NULL OR world_view_id = $2) \
             ORDER BY updated_at DESC, id DESC LIMIT $3 OFFSET $4",
            MISC_COLUMNS
        );
        let list = sqlx::query_as::<_, Misc>(&sql)
            .bind(owner)
            .bind(world_view_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Paged::new(list, total))
    }

    async fn find_misc(&self, owner: i32, id: i32) -> DbResult<Option<Misc>> {
        let sql = format!("SELECT {} FROM miscs WHERE id = $1 AND user_id = $2", MISC_COLUMNS);
        let found = sqlx::query_as::<_, Misc>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found)
    }

    async fn insert_misc(&self, owner: i32, new: &NewMisc) -> DbResult<Misc> {
        let sql = format!(
            "INSERT INTO miscs \
                (user_id, world_view_id, name, description, type, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, now(), now()) RETURNING {}",
            MISC_COLUMNS
        );
        let created = sqlx::query_as::<_, Misc>(&sql)
            .bind(owner)
            .bind(new.world_view_id)
            .bind(&new.name)
            .bind(&new.description)
            .bind(&new.kind)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn update_misc(
        &self,
        owner: i32,
        id: i32,
        changes: &MiscChanges,
    ) -> DbResult<Option<Misc>> {
        let sql = format!(
            "UPDATE miscs SET \
                name = COALESCE($3, name), \
                description = COALESCE($4, description), \
                type = COALESCE($5, type), \
                updated_at = now() \
             WHERE id = $1 AND user_id = $2 RETURNING {}",
            MISC_COLUMNS
        );
        let updated = sqlx::query_as::<_, Misc>(&sql)
            .bind(id)
            .bind(owner)
            .bind(changes.name.as_deref())
            .bind(changes.description.as_deref())
            .bind(changes.kind.as_deref())
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn delete_misc(&self, owner: i32, id: i32) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM miscs WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl WorldEventRepository for PgStore {
    async fn list_world_events(
        &self,
        owner: i32,
        world_view_id: Option<i32>,
        page: Page,
    ) -> DbResult<Paged<WorldEvent>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM world_events \
             WHERE user_id = $1 AND ($2::int4 IS NULL OR world_view_id = $2)",
        )
        .bind(owner)
        .bind(world_view_id)
        .fetch_one(&self.pool)
        .await?;

        let sql = format!(
            "SELECT {} FROM world_events \
             WHERE user_id = $1 AND ($2::int4 IS NULL OR world_view_id = $2) \
             ORDER BY happened_at DESC, id DESC LIMIT $3 OFFSET $4",
            WORLD_EVENT_COLUMNS
        );
        let list = sqlx::query_as::<_, WorldEvent>(&sql)
            .bind(owner)
            .bind(world_view_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(Paged::new(list, total))
    }

    async fn world_view_events(&self, owner: i32, world_view_id: i32) -> DbResult<Vec<WorldEvent>> {
        let sql = format!(
            "SELECT {} FROM world_events WHERE user_id = $1 AND world_view_id = $2 \
             ORDER BY happened_at DESC, id DESC",
            WORLD_EVENT_COLUMNS
        );
        let events = sqlx::query_as::<_, WorldEvent>(&sql)
            .bind(owner)
            .bind(world_view_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }

    async fn find_world_event(&self, owner: i32, id: i32) -> DbResult<Option<WorldEvent>> {
        let sql = format!(
            "SELECT {} FROM world_events WHERE id = $1 AND user_id = $2",
            WORLD_EVENT_COLUMNS
        );
        let found = sqlx::query_as::<_, WorldEvent>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found)
    }

    async fn insert_world_event(&self, owner: i32, new: &NewWorldEvent) -> DbResult<WorldEvent> {
        let sql = format!(
            "INSERT INTO world_events \
                (user_id, world_view_id, name, description, happened_at, end_at, \
                 related_character_snapshot_ids, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, now(), now()) RETURNING {}",
            WORLD_EVENT_COLUMNS
        );
        let created = sqlx::query_as::<_, WorldEvent>(&sql)
            .bind(owner)
            .bind(new.world_view_id)
            .bind(&new.name)
            .bind(&new.description)
            .bind(new.happened_at)
            .bind(new.end_at)
            .bind(&new.related_character_snapshot_ids)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    async fn update_world_event(
        &self,
        owner: i32,
        id: i32,
        changes: &WorldEventChanges,
    ) -> DbResult<Option<WorldEvent>> {
        let sql = format!(
            "UPDATE world_events SET \
                name = COALESCE($3, name), \
                description = COALESCE($4, description), \
                happened_at = COALESCE($5, happened_at), \
                end_at = COALESCE($6, end_at), \
                related_character_snapshot_ids = COALESCE($7, related_character_snapshot_ids), \
                updated_at = now() \
             WHERE id = $1 AND user_id = $2 RETURNING {}",
            WORLD_EVENT_COLUMNS
        );
        let updated = sqlx::query_as::<_, WorldEvent>(&sql)
            .bind(id)
            .bind(owner)
            .bind(changes.name.as_deref())
            .bind(changes.description.as_deref())
            .bind(changes.happened_at)
            .bind(changes.end_at)
            .bind(changes.related_character_snapshot_ids.as_ref())
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn delete_world_event(&self, owner: i32, id: i32) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM world_events WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}
