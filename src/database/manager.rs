use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, Executor, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Postgres SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// Table definitions, applied by `talearc db init`
pub const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        let unique = err
            .as_database_error()
            .filter(|db| db.code().as_deref() == Some(UNIQUE_VIOLATION))
            .map(|db| db.constraint().unwrap_or("unknown").to_string());

        match unique {
            Some(constraint) => DatabaseError::UniqueViolation(constraint),
            None => DatabaseError::Sqlx(err),
        }
    }
}

/// Pool construction and schema maintenance
pub struct DatabaseManager;

impl DatabaseManager {
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(&config.url)
            .await?;

        info!(
            max_connections = config.max_connections,
            "Created database pool"
        );
        Ok(pool)
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    /// Idempotent: every statement is `IF NOT EXISTS`
    pub async fn init_schema(pool: &PgPool) -> Result<(), DatabaseError> {
        pool.execute(SCHEMA_SQL).await?;
        info!("Database schema applied");
        Ok(())
    }
}
