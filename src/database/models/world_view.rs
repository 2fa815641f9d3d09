use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Top-level lore container. The id lists are derived from the child tables
/// on every read and are never stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WorldView {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub description: String,
    pub notes: String,
    pub character_ids: Vec<i32>,
    pub misc_ids: Vec<i32>,
    pub world_event_ids: Vec<i32>,
    pub novel_ids: Vec<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewWorldView {
    pub name: String,
    pub description: String,
    pub notes: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorldViewChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
}
