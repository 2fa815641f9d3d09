//! In-memory [`Store`](crate::database::Store) for tests.
//!
//! Mirrors the Postgres store: same owner scoping, ordering, pagination,
//! cascades and unique constraints. Timestamps come from a clock that never
//! repeats, so "most recent first" orderings are deterministic.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::database::models::{
    BlacklistedToken, Chapter, ChapterChanges, ChapterFile, Character, CharacterChanges,
    CharacterSnapshot, Misc, MiscChanges, NewChapter, NewCharacter, NewMisc, NewNovel,
    NewSnapshot, NewWorldEvent, NewWorldView, Novel, NovelChanges, RegistrationKey,
    SnapshotChanges, SnapshotFilter, User, WorldEvent, WorldEventChanges, WorldView,
    WorldViewChanges,
};
use crate::database::repository::{
    ChapterRepository, CharacterRepository, DbResult, HealthCheck, MiscRepository,
    NovelRepository, RegistrationKeyRepository, SnapshotRepository, TokenBlacklistRepository,
    UserRepository, WorldEventRepository, WorldViewRepository,
};
use crate::database::DatabaseError;
use crate::types::{Page, Paged};

#[derive(Default)]
struct Sequences {
    users: i32,
    blacklist: i32,
    world_views: i32,
    characters: i32,
    snapshots: i32,
    miscs: i32,
    events: i32,
    novels: i32,
    chapters: i32,
}

fn next(seq: &mut i32) -> i32 {
    *seq += 1;
    *seq
}

#[derive(Default)]
struct Tables {
    seq: Sequences,
    clock: Option<DateTime<Utc>>,
    users: BTreeMap<i32, User>,
    keys: BTreeMap<String, RegistrationKey>,
    blacklist: Vec<BlacklistedToken>,
    world_views: BTreeMap<i32, WorldView>,
    characters: BTreeMap<i32, Character>,
    snapshots: BTreeMap<i32, CharacterSnapshot>,
    miscs: BTreeMap<i32, Misc>,
    events: BTreeMap<i32, WorldEvent>,
    novels: BTreeMap<i32, Novel>,
    chapters: BTreeMap<i32, Chapter>,
}

impl Tables {
    fn now(&mut self) -> DateTime<Utc> {
        let wall = Utc::now();
        let now = match self.clock {
            Some(last) if wall <= last => last + Duration::microseconds(1),
            _ => wall,
        };
        self.clock = Some(now);
        now
    }

    /// World view row with its child id lists filled in
    fn world_view(&self, row: &WorldView) -> WorldView {
        let id = row.id;
        WorldView {
            character_ids: self
                .characters
                .values()
                .filter(|c| c.world_view_id == id)
                .map(|c| c.id)
                .collect(),
            misc_ids: self
                .miscs
                .values()
                .filter(|m| m.world_view_id == id)
                .map(|m| m.id)
                .collect(),
            world_event_ids: self
                .events
                .values()
                .filter(|e| e.world_view_id == id)
                .map(|e| e.id)
                .collect(),
            novel_ids: self
                .novels
                .values()
                .filter(|n| n.world_view_id == id)
                .map(|n| n.id)
                .collect(),
            ..row.clone()
        }
    }

    fn owned_world_view(&self, owner: i32, id: i32) -> Option<&WorldView> {
        self.world_views.get(&id).filter(|w| w.user_id == owner)
    }

    fn chapter_files(&self, novels: &[&Novel]) -> Vec<ChapterFile> {
        self.chapters
            .values()
            .filter_map(|c| {
                novels.iter().find(|n| n.id == c.novel_id).map(|n| ChapterFile {
                    world_view_id: n.world_view_id,
                    novel_id: n.id,
                    uuid: c.uuid,
                })
            })
            .collect()
    }
}

fn paged<T: Clone>(rows: Vec<T>, page: Page) -> Paged<T> {
    let total = rows.len() as i64;
    Paged::new(page.slice(&rows), total)
}

/// Most recently updated first, ties by id
fn by_recency<T>(rows: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, i32)) {
    rows.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    unavailable: RwLock<bool>,
    chapter_writes_fail: RwLock<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with unredeemed registration keys
    pub fn with_registration_keys(keys: &[&str]) -> Self {
        let store = Self::new();
        {
            let mut tables = store.write();
            for key in keys {
                tables.keys.insert(
                    key.to_string(),
                    RegistrationKey {
                        key: key.to_string(),
                        user_id: None,
                        used_at: None,
                    },
                );
            }
        }
        store
    }

    /// Makes `ping` fail, as if the database went away
    pub fn set_unavailable(&self, unavailable: bool) {
        *self
            .unavailable
            .write()
            .unwrap_or_else(PoisonError::into_inner) = unavailable;
    }

    /// Makes chapter insert, update and delete fail as if the connection dropped
    pub fn set_chapter_writes_failing(&self, failing: bool) {
        *self
            .chapter_writes_fail
            .write()
            .unwrap_or_else(PoisonError::into_inner) = failing;
    }

    fn chapter_write_allowed(&self) -> DbResult<()> {
        if *self.chapter_writes_fail.read().unwrap_or_else(PoisonError::into_inner) {
            return Err(DatabaseError::Unavailable("chapter writes marked failing".to_string()));
        }
        Ok(())
    }

    /// Rows of any kind still pointing at the world view
    pub fn rows_referencing_world_view(&self, world_view_id: i32) -> usize {
        let tables = self.read();
        let novels: Vec<i32> = tables
            .novels
            .values()
            .filter(|n| n.world_view_id == world_view_id)
            .map(|n| n.id)
            .collect();

        usize::from(tables.world_views.contains_key(&world_view_id))
            + tables.characters.values().filter(|c| c.world_view_id == world_view_id).count()
            + tables.snapshots.values().filter(|s| s.world_view_id == world_view_id).count()
            + tables.miscs.values().filter(|m| m.world_view_id == world_view_id).count()
            + tables.events.values().filter(|e| e.world_view_id == world_view_id).count()
            + novels.len()
            + tables.chapters.values().filter(|c| novels.contains(&c.novel_id)).count()
    }

    pub fn blacklist_len(&self) -> usize {
        self.read().blacklist.len()
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_user_by_id(&self, id: i32) -> DbResult<Option<User>> {
        Ok(self.read().users.get(&id).cloned())
    }

    async fn find_user_by_name(&self, name: &str) -> DbResult<Option<User>> {
        Ok(self.read().users.values().find(|u| u.name == name).cloned())
    }

    async fn insert_user(&self, name: &str, password_digest: &str) -> DbResult<User> {
        let mut tables = self.write();
        if tables.users.values().any(|u| u.name == name) {
            return Err(DatabaseError::UniqueViolation("users_name_key".to_string()));
        }
        let user = User {
            id: next(&mut tables.seq.users),
            name: name.to_string(),
            password: password_digest.to_string(),
            create_at: tables.now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl RegistrationKeyRepository for MemoryStore {
    async fn find_registration_key(&self, key: &str) -> DbResult<Option<RegistrationKey>> {
        Ok(self.read().keys.get(key).cloned())
    }

    async fn redeem_registration_key(&self, key: &str, user_id: i32) -> DbResult<bool> {
        let mut tables = self.write();
        let now = tables.now();
        match tables.keys.get_mut(key) {
            Some(entry) if entry.user_id.is_none() => {
                entry.user_id = Some(user_id);
                entry.used_at = Some(now);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn insert_registration_key(&self, key: &str) -> DbResult<bool> {
        let mut tables = self.write();
        if tables.keys.contains_key(key) {
            return Ok(false);
        }
        tables.keys.insert(
            key.to_string(),
            RegistrationKey {
                key: key.to_string(),
                user_id: None,
                used_at: None,
            },
        );
        Ok(true)
    }

    async fn list_registration_keys(&self) -> DbResult<Vec<RegistrationKey>> {
        Ok(self.read().keys.values().cloned().collect())
    }
}

#[async_trait]
impl TokenBlacklistRepository for MemoryStore {
    async fn blacklist_token(&self, token: &str, expires_at: DateTime<Utc>) -> DbResult<()> {
        let mut tables = self.write();
        let entry = BlacklistedToken {
            id: next(&mut tables.seq.blacklist),
            token: token.to_string(),
            expires_at,
            created_at: tables.now(),
        };
        tables.blacklist.push(entry);
        Ok(())
    }

    async fn is_token_blacklisted(&self, token: &str, now: DateTime<Utc>) -> DbResult<bool> {
        Ok(self
            .read()
            .blacklist
            .iter()
            .any(|t| t.token == token && t.expires_at > now))
    }

    async fn purge_expired_tokens(&self, now: DateTime<Utc>) -> DbResult<u64> {
        let mut tables = self.write();
        let before = tables.blacklist.len();
        tables.blacklist.retain(|t| t.expires_at > now);
        Ok((before - tables.blacklist.len()) as u64)
    }
}

#[async_trait]
impl WorldViewRepository for MemoryStore {
    async fn list_world_views(&self, owner: i32, page: Page) -> DbResult<Paged<WorldView>> {
        let tables = self.read();
        let mut rows: Vec<WorldView> = tables
            .world_views
            .values()
            .filter(|w| w.user_id == owner)
            .map(|w| tables.world_view(w))
            .collect();
        by_recency(&mut rows, |w| (w.updated_at, w.id));
        Ok(paged(rows, page))
    }

    async fn find_world_view(&self, owner: i32, id: i32) -> DbResult<Option<WorldView>> {
        let tables = self.read();
        Ok(tables.owned_world_view(owner, id).map(|w| tables.world_view(w)))
    }

    async fn insert_world_view(&self, owner: i32, new: &NewWorldView) -> DbResult<WorldView> {
        let mut tables = self.write();
        let now = tables.now();
        let row = WorldView {
            id: next(&mut tables.seq.world_views),
            user_id: owner,
            name: new.name.clone(),
            description: new.description.clone(),
            notes: new.notes.clone(),
            character_ids: Vec::new(),
            misc_ids: Vec::new(),
            world_event_ids: Vec::new(),
            novel_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        tables.world_views.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_world_view(
        &self,
        owner: i32,
        id: i32,
        changes: &WorldViewChanges,
    ) -> DbResult<Option<WorldView>> {
        let mut tables = self.write();
        let now = tables.now();
        let Some(row) = tables.world_views.get_mut(&id).filter(|w| w.user_id == owner) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            row.name = name.clone();
        }
        if let Some(description) = &changes.description {
            row.description = description.clone();
        }
        if let Some(notes) = &changes.notes {
            row.notes = notes.clone();
        }
        row.updated_at = now;
        let row = row.clone();
        Ok(Some(tables.world_view(&row)))
    }

    async fn world_view_chapter_files(&self, owner: i32, id: i32) -> DbResult<Vec<ChapterFile>> {
        let tables = self.read();
        let novels: Vec<&Novel> = tables
            .novels
            .values()
            .filter(|n| n.world_view_id == id && n.user_id == owner)
            .collect();
        Ok(tables.chapter_files(&novels))
    }

    async fn delete_world_view(&self, owner: i32, id: i32) -> DbResult<Option<Vec<ChapterFile>>> {
        let mut tables = self.write();
        if tables.owned_world_view(owner, id).is_none() {
            return Ok(None);
        }

        let novels: Vec<&Novel> = tables
            .novels
            .values()
            .filter(|n| n.world_view_id == id)
            .collect();
        let files = tables.chapter_files(&novels);
        let novel_ids: Vec<i32> = novels.iter().map(|n| n.id).collect();
        let character_ids: Vec<i32> = tables
            .characters
            .values()
            .filter(|c| c.world_view_id == id)
            .map(|c| c.id)
            .collect();

        tables.chapters.retain(|_, c| !novel_ids.contains(&c.novel_id));
        tables.novels.retain(|_, n| n.world_view_id != id);
        tables
            .snapshots
            .retain(|_, s| s.world_view_id != id && !character_ids.contains(&s.character_id));
        tables.characters.retain(|_, c| c.world_view_id != id);
        tables.events.retain(|_, e| e.world_view_id != id);
        tables.miscs.retain(|_, m| m.world_view_id != id);
        tables.world_views.remove(&id);

        Ok(Some(files))
    }
}

#[async_trait]
impl CharacterRepository for MemoryStore {
    async fn list_characters(
        &self,
        owner: i32,
        world_view_id: Option<i32>,
        page: Page,
    ) -> DbResult<Paged<Character>> {
        let mut rows: Vec<Character> = self
            .read()
            .characters
            .values()
            .filter(|c| c.user_id == owner && world_view_id.map_or(true, |w| c.world_view_id == w))
            .cloned()
            .collect();
        by_recency(&mut rows, |c| (c.updated_at, c.id));
        Ok(paged(rows, page))
    }

    async fn find_character(&self, owner: i32, id: i32) -> DbResult<Option<Character>> {
        Ok(self
            .read()
            .characters
            .get(&id)
            .filter(|c| c.user_id == owner)
            .cloned())
    }

    async fn insert_character(&self, owner: i32, new: &NewCharacter) -> DbResult<Character> {
        let mut tables = self.write();
        let now = tables.now();
        let row = Character {
            id: next(&mut tables.seq.characters),
            user_id: owner,
            world_view_id: new.world_view_id,
            snapshot_ids: Vec::new(),
            name: new.name.clone(),
            description: new.description.clone(),
            note: new.note.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.characters.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_character(
        &self,
        owner: i32,
        id: i32,
        changes: &CharacterChanges,
    ) -> DbResult<Option<Character>> {
        let mut tables = self.write();
        let now = tables.now();
        let Some(row) = tables.characters.get_mut(&id).filter(|c| c.user_id == owner) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            row.name = name.clone();
        }
        if let Some(description) = &changes.description {
            row.description = description.clone();
        }
        if let Some(note) = &changes.note {
            row.note = note.clone();
        }
        row.updated_at = now;
        Ok(Some(row.clone()))
    }

    async fn delete_character(&self, owner: i32, id: i32) -> DbResult<bool> {
        let mut tables = self.write();
        if !tables.characters.get(&id).is_some_and(|c| c.user_id == owner) {
            return Ok(false);
        }
        tables.snapshots.retain(|_, s| s.character_id != id);
        tables.characters.remove(&id);
        Ok(true)
    }
}

#[async_trait]
impl SnapshotRepository for MemoryStore {
    async fn list_snapshots(
        &self,
        owner: i32,
        filter: SnapshotFilter,
        page: Page,
    ) -> DbResult<Paged<CharacterSnapshot>> {
        let mut rows: Vec<CharacterSnapshot> = self
            .read()
            .snapshots
            .values()
            .filter(|s| {
                s.user_id == owner
                    && filter.world_view_id.map_or(true, |w| s.world_view_id == w)
                    && filter.character_id.map_or(true, |c| s.character_id == c)
            })
            .cloned()
            .collect();
        by_recency(&mut rows, |s| (s.updated_at, s.id));
        Ok(paged(rows, page))
    }

    async fn find_snapshot(&self, owner: i32, id: i32) -> DbResult<Option<CharacterSnapshot>> {
        Ok(self
            .read()
            .snapshots
            .get(&id)
            .filter(|s| s.user_id == owner)
            .cloned())
    }

    async fn insert_snapshot(&self, owner: i32, new: &NewSnapshot) -> DbResult<CharacterSnapshot> {
        let mut tables = self.write();
        let parent_ok = tables.characters.get(&new.character_id).is_some_and(|c| {
            c.user_id == owner && c.world_view_id == new.world_view_id
        });
        if !parent_ok {
            return Err(DatabaseError::NotFound("character".to_string()));
        }

        let now = tables.now();
        let row = CharacterSnapshot {
            id: next(&mut tables.seq.snapshots),
            user_id: owner,
            world_view_id: new.world_view_id,
            character_id: new.character_id,
            name: new.name.clone(),
            description: new.description.clone(),
            note: new.note.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.snapshots.insert(row.id, row.clone());
        if let Some(character) = tables.characters.get_mut(&new.character_id) {
            character.snapshot_ids.push(row.id);
            character.updated_at = now;
        }
        Ok(row)
    }

    async fn update_snapshot(
        &self,
        owner: i32,
        id: i32,
        changes: &SnapshotChanges,
    ) -> DbResult<Option<CharacterSnapshot>> {
        let mut tables = self.write();
        let now = tables.now();
        let Some(row) = tables.snapshots.get_mut(&id).filter(|s| s.user_id == owner) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            row.name = name.clone();
        }
        if let Some(description) = &changes.description {
            row.description = description.clone();
        }
        if let Some(note) = &changes.note {
            row.note = note.clone();
        }
        row.updated_at = now;
        Ok(Some(row.clone()))
    }

    async fn delete_snapshot(&self, owner: i32, id: i32) -> DbResult<bool> {
        let mut tables = self.write();
        let Some(character_id) = tables
            .snapshots
            .get(&id)
            .filter(|s| s.user_id == owner)
            .map(|s| s.character_id)
        else {
            return Ok(false);
        };

        tables.snapshots.remove(&id);
        let now = tables.now();
        if let Some(character) = tables.characters.get_mut(&character_id) {
            character.snapshot_ids.retain(|sid| *sid != id);
            character.updated_at = now;
        }
        Ok(true)
    }
}

#[async_trait]
impl MiscRepository for MemoryStore {
    async fn list_miscs(
        &self,
        owner: i32,
        world_view_id: Option<i32>,
        page: Page,
    ) -> DbResult<Paged<Misc>> {
        let mut rows: Vec<Misc> = self
            .read()
            .miscs
            .values()
            .filter(|m| m.user_id == owner && world_view_id.map_or(true, |w| m.world_view_id == w))
            .cloned()
            .collect();
        by_recency(&mut rows, |m| (m.updated_at, m.id));
        Ok(paged(rows, page))
    }

    async fn find_misc(&self, owner: i32, id: i32) -> DbResult<Option<Misc>> {
        Ok(self.read().miscs.get(&id).filter(|m| m.user_id == owner).cloned())
    }

    async fn insert_misc(&self, owner: i32, new: &NewMisc) -> DbResult<Misc> {
        let mut tables = self.write();
        let now = tables.now();
        let row = Misc {
            id: next(&mut tables.seq.miscs),
            user_id: owner,
            world_view_id: new.world_view_id,
            name: new.name.clone(),
            description: new.description.clone(),
            kind: new.kind.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.miscs.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_misc(
        &self,
        owner: i32,
        id: i32,
        changes: &MiscChanges,
    ) -> DbResult<Option<Misc>> {
        let mut tables = self.write();
        let now = tables.now();
        let Some(row) = tables.miscs.get_mut(&id).filter(|m| m.user_id == owner) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            row.name = name.clone();
        }
        if let Some(description) = &changes.description {
            row.description = description.clone();
        }
        if let Some(kind) = &changes.kind {
            row.kind = kind.clone();
        }
        row.updated_at = now;
        Ok(Some(row.clone()))
    }

    async fn delete_misc(&self, owner: i32, id: i32) -> DbResult<bool> {
        let mut tables = self.write();
        if !tables.miscs.get(&id).is_some_and(|m| m.user_id == owner) {
            return Ok(false);
        }
        tables.miscs.remove(&id);
        Ok(true)
    }
}

fn by_happened_at(rows: &mut [WorldEvent]) {
    rows.sort_by(|a, b| (b.happened_at, b.id).cmp(&(a.happened_at, a.id)));
}

#[async_trait]
impl WorldEventRepository for MemoryStore {
    async fn list_world_events(
        &self,
        owner: i32,
        world_view_id: Option<i32>,
        page: Page,
    ) -> DbResult<Paged<WorldEvent>> {
        let mut rows: Vec<WorldEvent> = self
            .read()
            .events
            .values()
            .filter(|e| e.user_id == owner && world_view_id.map_or(true, |w| e.world_view_id == w))
            .cloned()
            .collect();
        by_happened_at(&mut rows);
        Ok(paged(rows, page))
    }

    async fn world_view_events(&self, owner: i32, world_view_id: i32) -> DbResult<Vec<WorldEvent>> {
        let mut rows: Vec<WorldEvent> = self
            .read()
            .events
            .values()
            .filter(|e| e.user_id == owner && e.world_view_id == world_view_id)
            .cloned()
            .collect();
        by_happened_at(&mut rows);
        Ok(rows)
    }

    async fn find_world_event(&self, owner: i32, id: i32) -> DbResult<Option<WorldEvent>> {
        Ok(self.read().events.get(&id).filter(|e| e.user_id == owner).cloned())
    }

    async fn insert_world_event(&self, owner: i32, new: &NewWorldEvent) -> DbResult<WorldEvent> {
        let mut tables = self.write();
        let now = tables.now();
        let row = WorldEvent {
            id: next(&mut tables.seq.events),
            user_id: owner,
            world_view_id: new.world_view_id,
            name: new.name.clone(),
            description: new.description.clone(),
            happened_at: new.happened_at,
            end_at: new.end_at,
            related_character_snapshot_ids: new.related_character_snapshot_ids.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.events.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_world_event(
        &self,
        owner: i32,
        id: i32,
        changes: &WorldEventChanges,
    ) -> DbResult<Option<WorldEvent>> {
        let mut tables = self.write();
        let now = tables.now();
        let Some(row) = tables.events.get_mut(&id).filter(|e| e.user_id == owner) else {
            return Ok(None);
        };
        if let Some(name) = &changes.name {
            row.name = name.clone();
        }
        if let Some(description) = &changes.description {
            row.description = description.clone();
        }
        if let Some(happened_at) = changes.happened_at {
            row.happened_at = happened_at;
        }
        if let Some(end_at) = changes.end_at {
            row.end_at = end_at;
        }
        if let Some(ids) = &changes.related_character_snapshot_ids {
            row.related_character_snapshot_ids = ids.clone();
        }
        row.updated_at = now;
        Ok(Some(row.clone()))
    }

    async fn delete_world_event(&self, owner: i32, id: i32) -> DbResult<bool> {
        let mut tables = self.write();
        if !tables.events.get(&id).is_some_and(|e| e.user_id == owner) {
            return Ok(false);
        }
        tables.events.remove(&id);
        Ok(true)
    }
}

#[async_trait]
impl NovelRepository for MemoryStore {
    async fn list_novels(
        &self,
        owner: i32,
        world_view_id: Option<i32>,
        page: Page,
    ) -> DbResult<Paged<Novel>> {
        let mut rows: Vec<Novel> = self
            .read()
            .novels
            .values()
            .filter(|n| n.user_id == owner && world_view_id.map_or(true, |w| n.world_view_id == w))
            .cloned()
            .collect();
        by_recency(&mut rows, |n| (n.updated_at, n.id));
        Ok(paged(rows, page))
    }

    async fn find_novel(&self, owner: i32, id: i32) -> DbResult<Option<Novel>> {
        Ok(self.read().novels.get(&id).filter(|n| n.user_id == owner).cloned())
    }

    async fn insert_novel(&self, owner: i32, new: &NewNovel) -> DbResult<Novel> {
        let mut tables = self.write();
        let now = tables.now();
        let row = Novel {
            id: next(&mut tables.seq.novels),
            user_id: owner,
            world_view_id: new.world_view_id,
            title: new.title.clone(),
            description: new.description.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.novels.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_novel(
        &self,
        owner: i32,
        id: i32,
        changes: &NovelChanges,
    ) -> DbResult<Option<Novel>> {
        let mut tables = self.write();
        let now = tables.now();
        let Some(row) = tables.novels.get_mut(&id).filter(|n| n.user_id == owner) else {
            return Ok(None);
        };
        if let Some(title) = &changes.title {
            row.title = title.clone();
        }
        if let Some(description) = &changes.description {
            row.description = description.clone();
        }
        row.updated_at = now;
        Ok(Some(row.clone()))
    }

    async fn novel_chapter_files(&self, owner: i32, id: i32) -> DbResult<Vec<ChapterFile>> {
        let tables = self.read();
        let novels: Vec<&Novel> = tables
            .novels
            .get(&id)
            .filter(|n| n.user_id == owner)
            .into_iter()
            .collect();
        Ok(tables.chapter_files(&novels))
    }

    async fn delete_novel(&self, owner: i32, id: i32) -> DbResult<Option<Vec<ChapterFile>>> {
        let mut tables = self.write();
        let Some(novel) = tables.novels.get(&id).filter(|n| n.user_id == owner) else {
            return Ok(None);
        };
        let files = tables.chapter_files(&[novel]);

        tables.chapters.retain(|_, c| c.novel_id != id);
        tables.novels.remove(&id);
        Ok(Some(files))
    }
}

#[async_trait]
impl ChapterRepository for MemoryStore {
    async fn list_chapters(&self, novel_id: i32) -> DbResult<Vec<Chapter>> {
        let mut rows: Vec<Chapter> = self
            .read()
            .chapters
            .values()
            .filter(|c| c.novel_id == novel_id)
            .cloned()
            .collect();
        rows.sort_by_key(|c| (c.order, c.id));
        Ok(rows)
    }

    async fn find_chapter(&self, novel_id: i32, id: i32) -> DbResult<Option<Chapter>> {
        Ok(self
            .read()
            .chapters
            .get(&id)
            .filter(|c| c.novel_id == novel_id)
            .cloned())
    }

    async fn insert_chapter(&self, new: &NewChapter) -> DbResult<Chapter> {
        self.chapter_write_allowed()?;
        let mut tables = self.write();
        if tables.chapters.values().any(|c| c.uuid == new.uuid) {
            return Err(DatabaseError::UniqueViolation("chapters_uuid_key".to_string()));
        }
        let now = tables.now();
        let row = Chapter {
            id: next(&mut tables.seq.chapters),
            uuid: new.uuid,
            novel_id: new.novel_id,
            title: new.title.clone(),
            summary: new.summary.clone(),
            order: new.order,
            referenced_snapshot_ids: new.referenced_snapshot_ids.clone(),
            referenced_event_ids: new.referenced_event_ids.clone(),
            referenced_misc_ids: new.referenced_misc_ids.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.chapters.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update_chapter(
        &self,
        novel_id: i32,
        id: i32,
        changes: &ChapterChanges,
    ) -> DbResult<Option<Chapter>> {
        self.chapter_write_allowed()?;
        let mut tables = self.write();
        let now = tables.now();
        let Some(row) = tables.chapters.get_mut(&id).filter(|c| c.novel_id == novel_id) else {
            return Ok(None);
        };
        if let Some(title) = &changes.title {
            row.title = title.clone();
        }
        if let Some(summary) = &changes.summary {
            row.summary = summary.clone();
        }
        if let Some(order) = changes.order {
            row.order = order;
        }
        if let Some(ids) = &changes.referenced_snapshot_ids {
            row.referenced_snapshot_ids = ids.clone();
        }
        if let Some(ids) = &changes.referenced_event_ids {
            row.referenced_event_ids = ids.clone();
        }
        if let Some(ids) = &changes.referenced_misc_ids {
            row.referenced_misc_ids = ids.clone();
        }
        row.updated_at = now;
        Ok(Some(row.clone()))
    }

    async fn delete_chapter(&self, novel_id: i32, id: i32) -> DbResult<bool> {
        self.chapter_write_allowed()?;
        let mut tables = self.write();
        if !tables.chapters.get(&id).is_some_and(|c| c.novel_id == novel_id) {
            return Ok(false);
        }
        tables.chapters.remove(&id);
        Ok(true)
    }
}

#[async_trait]
impl HealthCheck for MemoryStore {
    async fn ping(&self) -> DbResult<()> {
        if *self.unavailable.read().unwrap_or_else(PoisonError::into_inner) {
            return Err(DatabaseError::Unavailable("memory store marked unavailable".to_string()));
        }
        Ok(())
    }
}
