//! Storage ports. Every owned-entity method takes the caller's user id and
//! treats rows owned by someone else exactly like missing rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Chapter, ChapterChanges, ChapterFile, Character, CharacterChanges, CharacterSnapshot,
    Misc, MiscChanges, NewChapter, NewCharacter, NewMisc, NewNovel, NewSnapshot, NewWorldEvent,
    NewWorldView, Novel, NovelChanges, RegistrationKey, SnapshotChanges, SnapshotFilter, User,
    WorldEvent, WorldEventChanges, WorldView, WorldViewChanges,
};
use crate::types::{Page, Paged};

pub type DbResult<T> = Result<T, DatabaseError>;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_id(&self, id: i32) -> DbResult<Option<User>>;
    async fn find_user_by_name(&self, name: &str) -> DbResult<Option<User>>;
    /// `UniqueViolation` when the name is taken
    async fn insert_user(&self, name: &str, password_digest: &str) -> DbResult<User>;
}

#[async_trait]
pub trait RegistrationKeyRepository: Send + Sync {
    async fn find_registration_key(&self, key: &str) -> DbResult<Option<RegistrationKey>>;
    /// Sets the redeemer if the key exists and is unredeemed; false otherwise
    async fn redeem_registration_key(&self, key: &str, user_id: i32) -> DbResult<bool>;
    /// False when the key already exists
    async fn insert_registration_key(&self, key: &str) -> DbResult<bool>;
    async fn list_registration_keys(&self) -> DbResult<Vec<RegistrationKey>>;
}

#[async_trait]
pub trait TokenBlacklistRepository: Send + Sync {
    async fn blacklist_token(&self, token: &str, expires_at: DateTime<Utc>) -> DbResult<()>;
    /// True when an entry for `token` expires after `now`
    async fn is_token_blacklisted(&self, token: &str, now: DateTime<Utc>) -> DbResult<bool>;
    /// Deletes entries whose expiry has passed; returns the number removed
    async fn purge_expired_tokens(&self, now: DateTime<Utc>) -> DbResult<u64>;
}

#[async_trait]
pub trait WorldViewRepository: Send + Sync {
    async fn list_world_views(&self, owner: i32, page: Page) -> DbResult<Paged<WorldView>>;
    async fn find_world_view(&self, owner: i32, id: i32) -> DbResult<Option<WorldView>>;
    async fn insert_world_view(&self, owner: i32, new: &NewWorldView) -> DbResult<WorldView>;
    async fn update_world_view(
        &self,
        owner: i32,
        id: i32,
        changes: &WorldViewChanges,
    ) -> DbResult<Option<WorldView>>;
    /// Content files of every chapter under the world view
    async fn world_view_chapter_files(&self, owner: i32, id: i32) -> DbResult<Vec<ChapterFile>>;
    /// Removes the world view and every row beneath it in one transaction.
    /// Returns the content files of the deleted chapters, `None` if not found.
    async fn delete_world_view(&self, owner: i32, id: i32) -> DbResult<Option<Vec<ChapterFile>>>;
}

#[async_trait]
pub trait CharacterRepository: Send + Sync {
    async fn list_characters(
        &self,
        owner: i32,
        world_view_id: Option<i32>,
        page: Page,
    ) -> DbResult<Paged<Character>>;
    async fn find_character(&self, owner: i32, id: i32) -> DbResult<Option<Character>>;
    async fn insert_character(&self, owner: i32, new: &NewCharacter) -> DbResult<Character>;
    async fn update_character(
        &self,
        owner: i32,
        id: i32,
        changes: &CharacterChanges,
    ) -> DbResult<Option<Character>>;
    /// Removes the character and its snapshots in one transaction
    async fn delete_character(&self, owner: i32, id: i32) -> DbResult<bool>;
}

#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    async fn list_snapshots(
        &self,
        owner: i32,
        filter: SnapshotFilter,
        page: Page,
    ) -> DbResult<Paged<CharacterSnapshot>>;
    async fn find_snapshot(&self, owner: i32, id: i32) -> DbResult<Option<CharacterSnapshot>>;
    /// Also appends the id to the character's `snapshot_ids`, same transaction
    async fn insert_snapshot(&self, owner: i32, new: &NewSnapshot) -> DbResult<CharacterSnapshot>;
    async fn update_snapshot(
        &self,
        owner: i32,
        id: i32,
        changes: &SnapshotChanges,
    ) -> DbResult<Option<CharacterSnapshot>>;
    /// Also removes the id from the character's `snapshot_ids`, same transaction
    async fn delete_snapshot(&self, owner: i32, id: i32) -> DbResult<bool>;
}

#[async_trait]
pub trait MiscRepository: Send + Sync {
    async fn list_miscs(
        &self,
        owner: i32,
        world_view_id: Option<i32>,
        page: Page,
    ) -> DbResult<Paged<Misc>>;
    async fn find_misc(&self, owner: i32, id: i32) -> DbResult<Option<Misc>>;
    async fn insert_misc(&self, owner: i32, new: &NewMisc) -> DbResult<Misc>;
    async fn update_misc(&self, owner: i32, id: i32, changes: &MiscChanges)
        -> DbResult<Option<Misc>>;
    async fn delete_misc(&self, owner: i32, id: i32) -> DbResult<bool>;
}

#[async_trait]
pub trait WorldEventRepository: Send + Sync {
    async fn list_world_events(
        &self,
        owner: i32,
        world_view_id: Option<i32>,
        page: Page,
    ) -> DbResult<Paged<WorldEvent>>;
    /// Every event of one world view, latest `happened_at` first
    async fn world_view_events(&self, owner: i32, world_view_id: i32) -> DbResult<Vec<WorldEvent>>;
    async fn find_world_event(&self, owner: i32, id: i32) -> DbResult<Option<WorldEvent>>;
    async fn insert_world_event(&self, owner: i32, new: &NewWorldEvent) -> DbResult<WorldEvent>;
    async fn update_world_event(
        &self,
        owner: i32,
        id: i32,
        changes: &WorldEventChanges,
    ) -> DbResult<Option<WorldEvent>>;
    async fn delete_world_event(&self, owner: i32, id: i32) -> DbResult<bool>;
}

#[async_trait]
pub trait NovelRepository: Send + Sync {
    async fn list_novels(
        &self,
        owner: i32,
        world_view_id: Option<i32>,
        page: Page,
    ) -> DbResult<Paged<Novel>>;
    async fn find_novel(&self, owner: i32, id: i32) -> DbResult<Option<Novel>>;
    async fn insert_novel(&self, owner: i32, new: &NewNovel) -> DbResult<Novel>;
    async fn update_novel(&self, owner: i32, id: i32, changes: &NovelChanges)
        -> DbResult<Option<Novel>>;
    async fn novel_chapter_files(&self, owner: i32, id: i32) -> DbResult<Vec<ChapterFile>>;
    /// Removes the novel and its chapters in one transaction.
    /// Returns the content files of the deleted chapters, `None` if not found.
    async fn delete_novel(&self, owner: i32, id: i32) -> DbResult<Option<Vec<ChapterFile>>>;
}

/// Chapter rows are addressed through their novel; callers check novel
/// ownership first.
#[async_trait]
pub trait ChapterRepository: Send + Sync {
    /// Table of contents, ascending `order`
    async fn list_chapters(&self, novel_id: i32) -> DbResult<Vec<Chapter>>;
    async fn find_chapter(&self, novel_id: i32, id: i32) -> DbResult<Option<Chapter>>;
    async fn insert_chapter(&self, new: &NewChapter) -> DbResult<Chapter>;
    async fn update_chapter(
        &self,
        novel_id: i32,
        id: i32,
        changes: &ChapterChanges,
    ) -> DbResult<Option<Chapter>>;
    async fn delete_chapter(&self, novel_id: i32, id: i32) -> DbResult<bool>;
}

#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn ping(&self) -> DbResult<()>;
}

/// Everything the HTTP layer needs from persistence
pub trait Store:
    UserRepository
    + RegistrationKeyRepository
    + TokenBlacklistRepository
    + WorldViewRepository
    + CharacterRepository
    + SnapshotRepository
    + MiscRepository
    + WorldEventRepository
    + NovelRepository
    + ChapterRepository
    + HealthCheck
{
}

impl<T> Store for T where
    T: UserRepository
        + RegistrationKeyRepository
        + TokenBlacklistRepository
        + WorldViewRepository
        + CharacterRepository
        + SnapshotRepository
        + MiscRepository
        + WorldEventRepository
        + NovelRepository
        + ChapterRepository
        + HealthCheck
{
}
