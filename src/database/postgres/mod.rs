//! sqlx-backed implementation of the storage ports.
//!
//! Queries are built at runtime (`query_as` + `bind`) so the crate compiles
//! without a live database. Multi-statement writes (cascading deletes,
//! snapshot id maintenance) run inside one transaction.

mod accounts;
mod novels;
mod world;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseManager;
use crate::database::repository::{DbResult, HealthCheck};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthCheck for PgStore {
    async fn ping(&self) -> DbResult<()> {
        DatabaseManager::health_check(&self.pool).await
    }
}
