use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Novel {
    pub id: i32,
    pub user_id: i32,
    pub world_view_id: i32,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewNovel {
    pub world_view_id: i32,
    pub title: String,
    pub description: String,
}

/// The world view is fixed at creation: chapter content paths embed it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NovelChanges {
    pub title: Option<String>,
    pub description: Option<String>,
}
