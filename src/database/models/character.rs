use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: i32,
    pub user_id: i32,
    pub world_view_id: i32,
    /// Maintained alongside snapshot inserts and deletes; not used for lookups
    pub snapshot_ids: Vec<i32>,
    pub name: String,
    pub description: String,
    pub note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewCharacter {
    pub world_view_id: i32,
    pub name: String,
    pub description: String,
    pub note: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CharacterChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub note: Option<String>,
}
