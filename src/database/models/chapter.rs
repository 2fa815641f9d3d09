use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: i32,
    /// Stable handle into the content store, fixed at creation
    pub uuid: Uuid,
    pub novel_id: i32,
    pub title: String,
    pub summary: String,
    pub order: i32,
    pub referenced_snapshot_ids: Vec<i32>,
    pub referenced_event_ids: Vec<i32>,
    pub referenced_misc_ids: Vec<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row values for a new chapter; the prose body goes to the content store
#[derive(Debug, Clone)]
pub struct NewChapter {
    pub uuid: Uuid,
    pub novel_id: i32,
    pub title: String,
    pub summary: String,
    pub order: i32,
    pub referenced_snapshot_ids: Vec<i32>,
    pub referenced_event_ids: Vec<i32>,
    pub referenced_misc_ids: Vec<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct ChapterChanges {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub order: Option<i32>,
    pub referenced_snapshot_ids: Option<Vec<i32>>,
    pub referenced_event_ids: Option<Vec<i32>>,
    pub referenced_misc_ids: Option<Vec<i32>>,
}

/// Everything needed to address one chapter's content file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRow)]
pub struct ChapterFile {
    pub world_view_id: i32,
    pub novel_id: i32,
    pub uuid: Uuid,
}
