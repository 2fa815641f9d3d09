use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Single-use key gating account creation
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationKey {
    pub key: String,
    pub user_id: Option<i32>,
    pub used_at: Option<DateTime<Utc>>,
}

impl RegistrationKey {
    pub fn is_redeemed(&self) -> bool {
        self.user_id.is_some()
    }
}
