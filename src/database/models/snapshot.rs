use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Point-in-time copy of a character's attributes
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSnapshot {
    pub id: i32,
    pub user_id: i32,
    pub world_view_id: i32,
    pub character_id: i32,
    pub name: String,
    pub description: String,
    pub note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewSnapshot {
    pub world_view_id: i32,
    pub character_id: i32,
    pub name: String,
    pub description: String,
    pub note: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapshotChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub note: Option<String>,
}

/// Optional parent filters for snapshot listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotFilter {
    pub world_view_id: Option<i32>,
    pub character_id: Option<i32>,
}
