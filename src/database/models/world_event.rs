use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WorldEvent {
    pub id: i32,
    pub user_id: i32,
    pub world_view_id: i32,
    pub name: String,
    pub description: String,
    pub happened_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    /// Loose references; ids are not checked against the snapshot table
    pub related_character_snapshot_ids: Vec<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorldEvent {
    pub world_view_id: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub happened_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    #[serde(default)]
    pub related_character_snapshot_ids: Vec<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorldEventChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub happened_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub related_character_snapshot_ids: Option<Vec<i32>>,
}
