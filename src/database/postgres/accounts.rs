use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::PgStore;
use crate::database::models::{RegistrationKey, User};
use crate::database::repository::{
    DbResult, RegistrationKeyRepository, TokenBlacklistRepository, UserRepository,
};

const USER_COLUMNS: &str = "id, name, password, create_at";

#[async_trait]
impl UserRepository for PgStore {
    async fn find_user_by_id(&self, id: i32) -> DbResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_name(&self, name: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE name = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn insert_user(&self, name: &str, password_digest: &str) -> DbResult<User> {
        let sql = format!(
            "INSERT INTO users (name, password, create_at) VALUES ($1, $2, now()) RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(name)
            .bind(password_digest)
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl RegistrationKeyRepository for PgStore {
    async fn find_registration_key(&self, key: &str) -> DbResult<Option<RegistrationKey>> {
        let found = sqlx::query_as::<_, RegistrationKey>(
            "SELECT key, user_id, used_at FROM registration_keys WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(found)
    }

    async fn redeem_registration_key(&self, key: &str, user_id: i32) -> DbResult<bool> {
        let result = sqlx::query(
            "UPDATE registration_keys SET user_id = $2, used_at = now() \
             WHERE key = $1 AND user_id IS NULL",
        )
        .bind(key)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn insert_registration_key(&self, key: &str) -> DbResult<bool> {
        let result = sqlx::query(
            "INSERT INTO registration_keys (key) VALUES ($1) ON CONFLICT (key) DO NOTHING",
        )
        .bind(key)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn list_registration_keys(&self) -> DbResult<Vec<RegistrationKey>> {
        let keys = sqlx::query_as::<_, RegistrationKey>(
            "SELECT key, user_id, used_at FROM registration_keys ORDER BY key",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(keys)
    }
}

#[async_trait]
impl TokenBlacklistRepository for PgStore {
    async fn blacklist_token(&self, token: &str, expires_at: DateTime<Utc>) -> DbResult<()> {
        sqlx::query("INSERT INTO token_blacklist (token, expires_at, created_at) VALUES ($1, $2, now())")
            .bind(token)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn is_token_blacklisted(&self, token: &str, now: DateTime<Utc>) -> DbResult<bool> {
        let listed: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM token_blacklist WHERE token = $1 AND expires_at > $2)",
        )
        .bind(token)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(listed)
    }

    async fn purge_expired_tokens(&self, now: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM token_blacklist WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
